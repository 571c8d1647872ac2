//! Record store for personnel violations and site issues.

pub mod db;

pub use db::{
    connect, ensure_schema, Dialect, Field, Predicate, RecordQuery, RecordRepository,
    RecordStore, SqlRecordRepository, SqlStatement,
};
