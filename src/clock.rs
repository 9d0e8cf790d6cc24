//! Site-wide date policy.
//!
//! Every date decision the service makes (registration expiry, subscription
//! comparison, extension anchoring, post timestamps) goes through one clock
//! with one fixed UTC offset, so "today" means the same thing everywhere.

use crate::error::ConfigError;
use chrono::{FixedOffset, NaiveDate, Utc};

/// Format used for the stored account expiry column.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";

/// Format used for the stored post date column.
pub const POST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Clone, Copy)]
pub struct Clock {
    offset: FixedOffset,
}

impl Clock {
    /// Build a clock from a whole-hour UTC offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is outside the valid range.
    pub fn from_offset_hours(hours: i32) -> Result<Self, ConfigError> {
        let offset = FixedOffset::east_opt(hours * 3600)
            .ok_or_else(|| ConfigError::Invalid(format!("utc_offset_hours = {hours}")))?;
        Ok(Self { offset })
    }

    /// The current calendar date under the configured offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Timestamp string stored with a published post.
    #[must_use]
    pub fn post_stamp(&self) -> String {
        Utc::now()
            .with_timezone(&self.offset)
            .format(POST_DATE_FORMAT)
            .to_string()
    }

    /// Compact timestamp for the DATE command.
    #[must_use]
    pub fn wire_stamp(&self) -> String {
        Utc::now()
            .with_timezone(&self.offset)
            .format("%Y%m%d%H%M%S")
            .to_string()
    }
}

/// Render a date in the stored expiry format.
#[must_use]
pub fn format_expiry(date: NaiveDate) -> String {
    date.format(EXPIRY_FORMAT).to_string()
}

/// Parse a stored expiry string.
pub fn parse_expiry(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, EXPIRY_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(format_expiry(date), "2025-12-31");
        assert_eq!(parse_expiry("2025-12-31").unwrap(), date);
    }

    #[test]
    fn garbage_expiry_rejected() {
        assert!(parse_expiry("permanent").is_err());
        assert!(parse_expiry("2025/12/31").is_err());
        assert!(parse_expiry("").is_err());
    }

    #[test]
    fn offset_bounds() {
        assert!(Clock::from_offset_hours(8).is_ok());
        assert!(Clock::from_offset_hours(-11).is_ok());
        assert!(Clock::from_offset_hours(99).is_err());
    }
}
