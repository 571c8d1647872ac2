mod repository;
mod store;

pub use repository::{RecordRepository, SqlRecordRepository};
pub use store::RecordStore;
