use crate::error::{FetchError, Result};

const GUID_LEN: usize = 36;

/// Validate a deck or card identifier and return its lowercase form.
///
/// Identifiers come straight from the remote API and end up inside URLs and
/// file names, so only exactly 36 hex digits or hyphens are accepted.
pub fn safe_guid(candidate: &str) -> Result<String> {
    let well_formed = candidate.len() == GUID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '-');

    if !well_formed {
        return Err(FetchError::InvalidIdentifier(candidate.to_string()));
    }

    Ok(candidate.to_ascii_lowercase())
}

/// Like [`safe_guid`] for values that may be missing from an API record.
pub fn safe_optional_guid(candidate: Option<&str>) -> Result<String> {
    safe_guid(candidate.unwrap_or_default())
}
