//! Validation modules

pub mod text;

pub use text::{normalize_hard_hat, optional_text, required_text};
