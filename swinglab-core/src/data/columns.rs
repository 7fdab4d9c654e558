//! Canonical column schema and header matching.
//!
//! Source tables name their columns freely; the engine only understands the
//! canonical {date, open, high, low, close, volume} schema. Matching is
//! case-insensitive and each canonical column accepts a fixed synonym list.

/// Accepted header spellings for the date column.
pub const DATE_NAMES: &[&str] = &["date", "datetime", "time"];

/// Accepted header spellings for the volume column.
pub const VOLUME_NAMES: &[&str] = &["volume", "vol"];

/// Find the first header matching any of `names`, ignoring ASCII case and
/// surrounding whitespace. Returns the column index.
pub fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim();
        names.iter().any(|name| header.eq_ignore_ascii_case(name))
    })
}
