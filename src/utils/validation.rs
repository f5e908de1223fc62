use crate::utils::error::{Result, RosterError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Parse a date literal from the boundary into a UTC instant.
///
/// Accepted shapes: RFC 3339 ("2012-01-01T00:00:00+00:00"), a naive
/// date-time ("2012-01-01T00:00:00"), or a calendar date ("2012-01-01",
/// taken as midnight UTC). Anything else is an `InvalidDate` carrying
/// the offending literal.
pub fn parse_period_date(literal: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(literal) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(literal, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(RosterError::InvalidDate {
        literal: literal.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RosterError::ConfigError {
            message: format!("{field_name} cannot be empty or whitespace-only"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_calendar_date() {
        let parsed = parse_period_date("2012-01-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime() {
        let parsed = parse_period_date("2012-01-01T08:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2012, 1, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_normalizes_to_utc() {
        let parsed = parse_period_date("2012-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_bad_literals() {
        for literal in ["2011-13-01", "AAAAAA", "", "2012-02-30", "01/01/2012"] {
            let err = parse_period_date(literal).unwrap_err();
            match err {
                RosterError::InvalidDate { literal: l } => assert_eq!(l, literal),
                other => panic!("expected InvalidDate, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("mk", "abc").is_ok());
        assert!(validate_non_empty_string("mk", "   ").is_err());
        assert!(validate_non_empty_string("mk", "").is_err());
    }
}
