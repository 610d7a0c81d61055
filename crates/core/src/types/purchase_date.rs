//! Date-only purchase timestamps.
//!
//! The authoring form supplies purchase dates as `YYYY-MM-DD`. They are stored
//! as full UTC timestamps at a fixed hour so that a date typed in by hand never
//! rolls over to the previous day when rendered back.

use chrono::{DateTime, NaiveDate, Utc};

/// Hour of day (UTC) at which hand-entered purchase dates are stored.
pub const PURCHASE_HOUR: u32 = 4;

/// Expected input format for purchase dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur when parsing a purchase date.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseDateError {
    /// The input is empty.
    #[error("purchase date cannot be empty")]
    Empty,
    /// The input is not a `YYYY-MM-DD` calendar date.
    #[error("purchase date must be formatted YYYY-MM-DD (got {0:?})")]
    InvalidFormat(String),
}

/// Parse a `YYYY-MM-DD` date into the stored purchase timestamp.
///
/// ```
/// use restock_core::parse_purchase_date;
///
/// let ts = parse_purchase_date("2024-02-29").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-02-29T04:00:00+00:00");
/// ```
///
/// # Errors
///
/// Returns an error if the input is empty or not a valid calendar date in
/// `YYYY-MM-DD` form.
pub fn parse_purchase_date(s: &str) -> Result<DateTime<Utc>, PurchaseDateError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(PurchaseDateError::Empty);
    }

    if s.len() != 10 {
        return Err(PurchaseDateError::InvalidFormat(s.to_owned()));
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(PURCHASE_HOUR, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| PurchaseDateError::InvalidFormat(s.to_owned()))
}

/// Render a purchase timestamp as the `YYYY-MM-DD` date shown in forms.
#[must_use]
pub fn purchase_date_string(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_parse_sets_fixed_hour() {
        let ts = parse_purchase_date("2023-11-05").unwrap();
        assert_eq!(ts.year(), 2023);
        assert_eq!(ts.month(), 11);
        assert_eq!(ts.day(), 5);
        assert_eq!(ts.hour(), PURCHASE_HOUR);
        assert_eq!(ts.minute(), 0);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_purchase_date(" 2023-11-05 ").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_purchase_date(""), Err(PurchaseDateError::Empty));
    }

    #[test]
    fn test_parse_rejects_bad_dates() {
        assert!(parse_purchase_date("2023-02-30").is_err());
        assert!(parse_purchase_date("2023-1-5").is_err());
        assert!(parse_purchase_date("05/11/2023").is_err());
        assert!(parse_purchase_date("2023-11-05T10:00").is_err());
    }

    #[test]
    fn test_date_string_roundtrip() {
        let ts = parse_purchase_date("2021-07-14").unwrap();
        assert_eq!(purchase_date_string(&ts), "2021-07-14");
    }
}
