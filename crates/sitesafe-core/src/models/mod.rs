//! Data models for the application
//!
//! Two append-only record kinds exist: personnel violations (hard-hat infractions)
//! and site issues (site-level hazards). Each kind has a domain model, a raw row
//! as stored in the relational backend, a creation DTO and a filter set.

mod category;
mod personnel;
mod record;
mod site;

// Re-export all models for convenient imports
pub use category::*;
pub use personnel::*;
pub use record::*;
pub use site::*;
