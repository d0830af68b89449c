//! Calendar month helpers shared by forms, tables and charts.
//!
//! Transactions and budgets record a bare (month, year) pair rather than a
//! full date, so the usual date types do not fit. These helpers cover the
//! arithmetic and formatting that pair needs.

use time::OffsetDateTime;

use crate::Error;

/// Full month names indexed by month number - 1.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Three-letter month abbreviations indexed by month number - 1.
const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The full name of a month (1-12), e.g. "January".
///
/// Out-of-range months render as "Unknown" rather than panicking since month
/// values can come straight from stored rows.
pub fn month_name(month: u8) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// The three-letter abbreviation of a month (1-12), e.g. "Jan".
pub fn short_month_name(month: u8) -> &'static str {
    SHORT_MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???")
}

/// Check that `month` is a calendar month.
///
/// # Errors
/// Returns [Error::InvalidMonth] if `month` is not in 1-12.
pub fn validate_month(month: u8) -> Result<u8, Error> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(Error::InvalidMonth(month))
    }
}

/// The current (month, year) in UTC.
pub fn current_month_year() -> (u8, i32) {
    let now = OffsetDateTime::now_utc();
    (now.month() as u8, now.year())
}

/// The (month, year) immediately before the given one, wrapping January back
/// to December of the previous year.
pub fn previous_month(month: u8, year: i32) -> (u8, i32) {
    if month <= 1 {
        (12, year - 1)
    } else {
        (month - 1, year)
    }
}

/// The most recent `count` (month, year) pairs ending at the given one,
/// oldest first.
///
/// Used by the budget page's month selector, which offers the current month
/// and the months leading up to it.
pub fn recent_months(month: u8, year: i32, count: usize) -> Vec<(u8, i32)> {
    let mut months = Vec::with_capacity(count);
    let mut current = (month, year);

    for _ in 0..count {
        months.push(current);
        current = previous_month(current.0, current.1);
    }

    months.reverse();
    months
}

/// Parse a `YYYY-MM` string from an `<input type="month">` into (month, year).
///
/// # Errors
/// Returns [Error::InvalidMonthInput] if the string is not `YYYY-MM`, or
/// [Error::InvalidMonth] if the month part is out of range.
pub fn parse_month_input(value: &str) -> Result<(u8, i32), Error> {
    let (year, month) = sscanf::sscanf!(value, "{i32}-{u8}")
        .map_err(|_| Error::InvalidMonthInput(value.to_owned()))?;

    validate_month(month)?;

    Ok((month, year))
}

/// Format (month, year) as the `YYYY-MM` value expected by
/// `<input type="month">`.
pub fn format_month_input(month: u8, year: i32) -> String {
    format!("{year}-{month:02}")
}

#[cfg(test)]
mod month_tests {
    use crate::Error;

    use super::{
        format_month_input, month_name, parse_month_input, previous_month, recent_months,
        short_month_name, validate_month,
    };

    #[test]
    fn month_names_cover_the_calendar() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(short_month_name(1), "Jan");
        assert_eq!(short_month_name(12), "Dec");
    }

    #[test]
    fn month_names_do_not_panic_out_of_range() {
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
        assert_eq!(short_month_name(0), "???");
    }

    #[test]
    fn validate_month_accepts_calendar_months() {
        for month in 1..=12 {
            assert_eq!(validate_month(month), Ok(month));
        }
    }

    #[test]
    fn validate_month_rejects_out_of_range() {
        assert_eq!(validate_month(0), Err(Error::InvalidMonth(0)));
        assert_eq!(validate_month(13), Err(Error::InvalidMonth(13)));
    }

    #[test]
    fn previous_month_wraps_january_to_december() {
        assert_eq!(previous_month(6, 2025), (5, 2025));
        assert_eq!(previous_month(1, 2025), (12, 2024));
    }

    #[test]
    fn recent_months_crosses_year_boundaries() {
        let months = recent_months(2, 2025, 6);

        assert_eq!(
            months,
            vec![
                (9, 2024),
                (10, 2024),
                (11, 2024),
                (12, 2024),
                (1, 2025),
                (2, 2025),
            ]
        );
    }

    #[test]
    fn parse_month_input_accepts_html_month_values() {
        assert_eq!(parse_month_input("2025-06"), Ok((6, 2025)));
        assert_eq!(parse_month_input("2024-12"), Ok((12, 2024)));
    }

    #[test]
    fn parse_month_input_rejects_malformed_strings() {
        for input in ["", "2025", "June 2025", "2025-6-1", "20a5-06"] {
            assert_eq!(
                parse_month_input(input),
                Err(Error::InvalidMonthInput(input.to_owned())),
                "want {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn parse_month_input_rejects_out_of_range_months() {
        assert_eq!(parse_month_input("2025-13"), Err(Error::InvalidMonth(13)));
        assert_eq!(parse_month_input("2025-00"), Err(Error::InvalidMonth(0)));
    }

    #[test]
    fn format_month_input_zero_pads() {
        assert_eq!(format_month_input(6, 2025), "2025-06");
        assert_eq!(format_month_input(12, 2024), "2024-12");
    }
}
