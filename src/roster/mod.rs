// src/roster/mod.rs

pub mod classify;
pub mod dedup;
pub mod layout;
pub mod normalize;
pub mod types;

use std::path::Path;
use tracing::{info, warn};

use crate::sheet::{self, FormatError, Row};

pub use classify::{classify, Classifier};
pub use dedup::dedup_members;
pub use normalize::{clean_phone, normalize_category, split_name_phone};
pub use types::{Category, Links, MemberRecord};

/// Classify `rows` and collapse case-insensitive duplicates.
pub fn build_members(rows: &[Row]) -> Vec<MemberRecord> {
    let raw = classify(rows);
    let built = raw.len();
    let members = dedup_members(raw);
    info!(built, unique = members.len(), "built roster");
    members
}

/// Read the first sheet of `path` and turn it into roster records.
pub fn extract_roster(path: impl AsRef<Path>) -> Result<Vec<MemberRecord>, FormatError> {
    let rows = sheet::read_sheet_rows(path.as_ref())?;
    let members = build_members(&rows);
    if members.is_empty() {
        warn!(xlsx = %path.as_ref().display(), "no members found in workbook");
    }
    Ok(members)
}
