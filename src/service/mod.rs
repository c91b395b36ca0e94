use chrono::{NaiveDate, Utc};

pub mod identity;
pub mod leave;
pub mod org;
pub mod reporting;

#[cfg(test)]
pub mod testing;

/// The calendar day leave dates are checked against.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
