use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Fixed-width UTC timestamp used for every `created_at`/`updated_at`
/// column, so that ordering the text column orders by time.
pub fn to_db_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

pub fn parse_plan_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        Error::BadRequest(format!("date must be formatted as YYYY-MM-DD, got '{}'", raw))
    })
}
