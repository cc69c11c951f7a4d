use crate::utils::error::{ReportError, Result};
use chrono::{Days, NaiveDate};

/// `today` minus `lookback_days`. Fails when that falls before the earliest
/// representable date.
pub fn anchor_date(today: NaiveDate, lookback_days: u32) -> Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .ok_or_else(|| ReportError::InvalidConfigValueError {
            field: "lookback_days".to_string(),
            value: lookback_days.to_string(),
            reason: format!("reaches past the earliest supported date from {}", today),
        })
}

/// Whether an assignment due on `due_date` (`MM/DD/YYYY`) falls inside the
/// window. The anchor day itself is outside it.
pub fn includes(due_date: &str, anchor: NaiveDate) -> Result<bool> {
    Ok(parse_due_date(due_date)? > anchor)
}

pub fn parse_due_date(due_date: &str) -> Result<NaiveDate> {
    let parts: Vec<&str> = due_date.split('/').collect();
    let &[month, day, year] = parts.as_slice() else {
        return Err(ReportError::date_parse(
            due_date,
            format!("expected MM/DD/YYYY, found {} component(s)", parts.len()),
        ));
    };

    let component = |text: &str, name: &str| -> Result<u32> {
        text.trim()
            .parse::<u32>()
            .map_err(|_| ReportError::date_parse(due_date, format!("{name} '{text}' is not a number")))
    };
    let month = component(month, "month")?;
    let day = component(day, "day")?;
    let year = component(year, "year")?;

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| ReportError::date_parse(due_date, "not a calendar date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_anchor_is_today_minus_lookback() {
        assert_eq!(anchor_date(date(2024, 3, 15), 14).unwrap(), date(2024, 3, 1));
        assert_eq!(anchor_date(date(2024, 3, 1), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(anchor_date(date(2024, 3, 15), 0).unwrap(), date(2024, 3, 15));
    }

    #[test]
    fn test_lookback_past_earliest_date_is_an_error() {
        assert!(matches!(
            anchor_date(date(2024, 3, 15), u32::MAX),
            Err(ReportError::InvalidConfigValueError { .. })
        ));
        assert!(anchor_date(NaiveDate::MIN, 1).is_err());
    }

    #[test]
    fn test_window_boundary_is_strict() {
        let anchor = anchor_date(date(2024, 3, 15), 14).unwrap();
        assert!(!includes("03/01/2024", anchor).unwrap());
        assert!(includes("03/02/2024", anchor).unwrap());
        assert!(!includes("02/28/2024", anchor).unwrap());
        assert!(includes("12/31/2024", anchor).unwrap());
    }

    #[test]
    fn test_single_digit_components() {
        assert_eq!(parse_due_date("3/2/2024").unwrap(), date(2024, 3, 2));
    }

    #[test]
    fn test_malformed_dates_are_errors() {
        for bad in ["2024-03-02", "03/02", "03/02/2024/1", "MM/DD/YYYY", "", "02/30/2024", "13/01/2024"] {
            assert!(
                matches!(parse_due_date(bad), Err(ReportError::DateParse { .. })),
                "{bad} should not parse"
            );
        }
    }
}
