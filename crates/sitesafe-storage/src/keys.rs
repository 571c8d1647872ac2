//! Shared pointer generation for storage backends.
//!
//! Pointer format: `{folder}/{YYYYMMDDTHHMMSS}_{uuid}.{ext}`. Personnel evidence
//! lives under `people/{hard_hat}`, site photos under
//! `site/{building}/floor_{floor}` with spaces in the building name replaced by `_`.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

const DEFAULT_EXTENSION: &str = "bin";
const TIME_MARKER_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Folder for evidence attached to a personnel violation.
pub fn personnel_folder(hard_hat_number: &str) -> String {
    format!("people/{}", segment(hard_hat_number))
}

/// Folder for a site issue photo.
pub fn site_folder(building: &str, floor: &str) -> String {
    format!(
        "site/{}/floor_{}",
        segment(&building.trim().replace(' ', "_")),
        segment(floor.trim())
    )
}

/// Keep a user-supplied value from introducing extra path levels.
fn segment(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let cleaned = cleaned.replace("..", "_");
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Extension of the original file name, lowercased, or `bin` when there is none.
pub fn extension_of(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Generate a fresh pointer for an upload. Two calls never return the same value.
pub fn generate_pointer(folder: &str, filename: &str, now: NaiveDateTime) -> String {
    format!(
        "{}/{}_{}.{}",
        folder.trim_end_matches('/'),
        now.format(TIME_MARKER_FORMAT),
        Uuid::new_v4(),
        extension_of(filename)
    )
}

/// Keys must be relative and must not climb out of the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.split('/').any(|part| part == ".." || part.is_empty()) {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid segments: {}",
            key
        )));
    }
    Ok(())
}
