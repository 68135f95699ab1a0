use chrono::NaiveDate;
use thiserror::Error;

/// Canonical on-disk date format, `DD-MM-YYYY`.
pub const CANONICAL_FORMAT: &str = "%d-%m-%Y";

/// Field-order and separator permutations accepted by ingestion. The first
/// permutation that parses wins, so the slash day-month-year reading takes
/// precedence for ambiguous inputs.
const FIELD_ORDERS: [&str; 12] = [
    "%d/%m/%Y", "%d/%Y/%m", "%Y/%d/%m", "%m/%d/%Y", "%m/%Y/%d", "%Y/%m/%d",
    "%m-%d-%Y", "%d-%Y-%m", "%Y-%d-%m", "%d-%m-%Y", "%m-%Y-%d", "%Y-%m-%d",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Date-like text that matches none of the supported permutations.
    #[error("date format for '{0}' is not recognized")]
    Unrecognized(String),
    /// Input that is not date-like at all (no digits to interpret).
    #[error("'{0}' is not a date")]
    NotDateLike(String),
}

/// Normalizes a raw date cell to the canonical `DD-MM-YYYY` form.
///
/// Tries each supported permutation in order and keeps the first successful
/// interpretation.
pub fn canonicalize(raw: &str) -> Result<String, DateError> {
    let trimmed = raw.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return Err(DateError::NotDateLike(raw.to_string()));
    }
    for format in FIELD_ORDERS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(canonicalize_date(date));
        }
    }
    Err(DateError::Unrecognized(raw.to_string()))
}

/// Canonical rendering for an already-parsed calendar day.
pub fn canonicalize_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Today's date in the canonical form, as stamped on issued and closed
/// rental periods.
pub fn today_canonical() -> String {
    canonicalize_date(chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_permutations_agree() {
        // 25 March 2021 written in each of the twelve supported permutations.
        let spellings = [
            "25/03/2021", "25/2021/03", "2021/25/03", "03/25/2021",
            "03/2021/25", "2021/03/25", "03-25-2021", "25-2021-03",
            "2021-25-03", "25-03-2021", "03-2021-25", "2021-03-25",
        ];
        for spelling in spellings {
            assert_eq!(
                canonicalize(spelling).unwrap(),
                "25-03-2021",
                "spelling {spelling} did not canonicalize"
            );
        }
    }

    #[test]
    fn test_first_interpretation_wins() {
        // Both day-first and month-first readings are valid; the slash list
        // starts day-first, the dash list month-first.
        assert_eq!(canonicalize("01/02/2020").unwrap(), "01-02-2020");
        assert_eq!(canonicalize("01-02-2020").unwrap(), "02-01-2020");
    }

    #[test]
    fn test_unpadded_fields() {
        assert_eq!(canonicalize("3/4/2020").unwrap(), "03-04-2020");
    }

    #[test]
    fn test_unrecognized_format() {
        assert_eq!(
            canonicalize("31/13/2020"),
            Err(DateError::Unrecognized("31/13/2020".to_string()))
        );
        assert!(matches!(
            canonicalize("25.03.2021"),
            Err(DateError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_not_date_like() {
        assert_eq!(
            canonicalize("unknown"),
            Err(DateError::NotDateLike("unknown".to_string()))
        );
    }

    #[test]
    fn test_calendar_value_passthrough() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 25).unwrap();
        assert_eq!(canonicalize_date(date), "25-03-2021");
    }
}
