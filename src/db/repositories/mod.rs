use chrono::{DateTime, NaiveDate, Utc};

use crate::core::errors::{AppError, AppResult};

pub mod calculations;
pub mod deductions;
pub mod events;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_timestamp(value: String) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|v| v.with_timezone(&Utc))
        .map_err(|err| AppError::Database(format!("invalid timestamp {value}: {err}")))
}

fn parse_date(value: String) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|err| AppError::Database(format!("invalid date {value}: {err}")))
}
