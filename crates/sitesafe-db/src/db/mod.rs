//! Database access for safety records
//!
//! Filters are lowered into a small predicate algebra (`query`), which a
//! `Dialect` renders into SQL for the configured backend. One repository
//! implementation serves both PostgreSQL and SQLite through `sqlx::Any`.
//
// Predicate algebra and filter lowering
pub mod query;
//
// Backend-specific SQL rendering
pub mod dialect;
//
// Table creation
pub mod schema;
//
// Pool construction
pub mod pool;
//
// Repositories and the authorized facade
pub mod records;

pub use dialect::{Dialect, SqlStatement};
pub use pool::connect;
pub use query::{Field, Predicate, RecordQuery};
pub use records::{RecordRepository, RecordStore, SqlRecordRepository};
pub use schema::ensure_schema;
