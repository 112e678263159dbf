use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Session date from `YYYY-MM-DD`, today when absent.
pub fn parse_session_date(s: Option<&str>) -> AppResult<NaiveDate> {
    match s {
        None => Ok(today()),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD.", raw))
        }),
    }
}

/// Timestamp in the short form used by listings.
pub fn short_stamp(t: &DateTime<Local>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}
