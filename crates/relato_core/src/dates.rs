//! Date parsing and formatting.
//!
//! Users type dates as `DD/MM/YYYY`; the portal form expects `YYYY-MM-DD`.
//! Parsing is strict: chrono rejects calendar-impossible dates (e.g. 31/04)
//! rather than normalizing them.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};

/// Format users type dates in.
pub const USER_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format the portal form expects.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a user-supplied `DD/MM/YYYY` string into a calendar date.
///
/// Fails on anything that is not a valid calendar date in exactly that
/// format; the caller re-prompts on failure.
pub fn parse_user_date(input: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), USER_DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(input.to_string()))
}

/// Render a date in the portal wire format.
pub fn to_wire(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_date() {
        let date = parse_user_date("01/03/2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let date = parse_user_date("  29/02/2024 ").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_rejects_malformed_input() {
        for input in [
            "",
            "hello",
            "2024-03-01",
            "1/3/24x",
            "01-03-2024",
            "32/01/2024",
            "00/01/2024",
            "15/13/2024",
        ] {
            assert!(parse_user_date(input).is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_rejects_calendar_invalid_dates() {
        // Day 31 in a 30-day month, and Feb 29 outside a leap year.
        assert!(parse_user_date("31/04/2024").is_err());
        assert!(parse_user_date("29/02/2023").is_err());
        assert!(parse_user_date("31/06/2025").is_err());
    }

    #[test]
    fn test_round_trip_to_wire() {
        for (user, wire) in [
            ("01/03/2024", "2024-03-01"),
            ("31/03/2024", "2024-03-31"),
            ("29/02/2024", "2024-02-29"),
            ("31/12/1999", "1999-12-31"),
        ] {
            let date = parse_user_date(user).unwrap();
            assert_eq!(to_wire(date), wire);
        }
    }
}
