//! Safe field coercion
//!
//! The feed is dirty: numeric cells may be empty, "N/A", or otherwise
//! unparseable, and date cells may be blank. A single bad cell must never
//! abort the run, so every coercion here degrades to a documented default
//! (zero for numerics, `None` for dates) instead of returning an error.

use chrono::NaiveDate;
use sqlx::types::BigDecimal;

/// Coerce a cell to `i64`, defaulting to 0 on blank or malformed input.
pub fn int64_or_zero(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Coerce a cell to `i32`, defaulting to 0 on blank or malformed input.
pub fn int_or_zero(value: &str) -> i32 {
    value.trim().parse().unwrap_or(0)
}

/// Coerce a cell to a decimal, defaulting to 0 on blank or malformed input.
pub fn decimal_or_zero(value: &str) -> BigDecimal {
    value.trim().parse().unwrap_or_else(|_| BigDecimal::from(0))
}

/// Coerce a cell to an ISO calendar date; blank or malformed input is absent.
pub fn date_or_none(value: &str) -> Option<NaiveDate> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn int_coercion_accepts_valid_numbers() {
        assert_eq!(int64_or_zero("123456789012"), 123456789012);
        assert_eq!(int_or_zero("352"), 352);
        assert_eq!(int_or_zero(" 42 "), 42);
    }

    #[test]
    fn int_coercion_defaults_to_zero() {
        assert_eq!(int64_or_zero(""), 0);
        assert_eq!(int64_or_zero("N/A"), 0);
        assert_eq!(int_or_zero("12.5"), 0);
        assert_eq!(int_or_zero("null"), 0);
    }

    #[test]
    fn decimal_coercion_parses_fractions() {
        assert_eq!(decimal_or_zero("4.57"), BigDecimal::from_str("4.57").unwrap());
        assert_eq!(decimal_or_zero("0"), BigDecimal::from(0));
    }

    #[test]
    fn decimal_coercion_defaults_to_zero() {
        assert_eq!(decimal_or_zero(""), BigDecimal::from(0));
        assert_eq!(decimal_or_zero("N/A"), BigDecimal::from(0));
        assert_eq!(decimal_or_zero("4,57"), BigDecimal::from(0));
    }

    #[test]
    fn date_coercion_parses_iso_dates() {
        assert_eq!(
            date_or_none("2008-09-14"),
            NaiveDate::from_ymd_opt(2008, 9, 14)
        );
    }

    #[test]
    fn date_coercion_absorbs_garbage() {
        assert_eq!(date_or_none(""), None);
        assert_eq!(date_or_none("09/14/2008"), None);
        assert_eq!(date_or_none("unknown"), None);
    }
}
