//! Shared argument parsing helpers

use chrono::NaiveDate;

use crate::portfolio::types::DATE_FORMAT;

/// Parse a calendar date argument in `YYYY-MM-DD` form
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", input))
}
