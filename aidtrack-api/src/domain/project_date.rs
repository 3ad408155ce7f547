//! Dates as they appear in the project export, e.g. `1-Jan-12` or `31-Dec-2013`.

use thiserror::Error;
use time::{Date, Month};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("could not parse date format: {0}")]
    MalformedFormat(String),
    #[error("unknown month: {month} in date: {input}")]
    UnknownMonth { month: String, input: String },
    #[error("invalid day or year in date: {0}")]
    InvalidNumber(String),
    #[error("not a calendar date: {0}")]
    InvalidCalendarDate(String),
}

const MONTHS: [(&str, Month); 12] = [
    ("Jan", Month::January),
    ("Feb", Month::February),
    ("Mar", Month::March),
    ("Apr", Month::April),
    ("May", Month::May),
    ("Jun", Month::June),
    ("Jul", Month::July),
    ("Aug", Month::August),
    ("Sep", Month::September),
    ("Oct", Month::October),
    ("Nov", Month::November),
    ("Dec", Month::December),
];

/// Parse a `D-MMM-YY` / `D-MMM-YYYY` date.
///
/// Blank input is not an error and yields `Ok(None)`. Month abbreviations are matched
/// case-sensitively. A two-digit year is read as `20YY`; any other year is taken as written.
pub fn try_parse_project_date(text: &str) -> Result<Option<Date>, DateParseError> {
    let input = text.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = input.split('-').collect();
    let [day, month_name, year] = parts.as_slice() else {
        return Err(DateParseError::MalformedFormat(input.to_string()));
    };

    let month = MONTHS
        .iter()
        .find(|(abbrev, _)| abbrev == month_name)
        .map(|(_, month)| *month)
        .ok_or_else(|| DateParseError::UnknownMonth {
            month: month_name.to_string(),
            input: input.to_string(),
        })?;

    let year = year.trim();
    let year = if year.len() == 2 {
        format!("20{year}")
    } else {
        year.to_string()
    };
    let year: i32 = year
        .parse()
        .map_err(|_| DateParseError::InvalidNumber(input.to_string()))?;
    let day: u8 = day
        .trim()
        .parse()
        .map_err(|_| DateParseError::InvalidNumber(input.to_string()))?;

    Date::from_calendar_date(year, month, day)
        .map(Some)
        .map_err(|_| DateParseError::InvalidCalendarDate(input.to_string()))
}

/// Lenient variant of [`try_parse_project_date`] used by the importer.
///
/// Anything unparseable becomes `None` and is reported as a warning.
pub fn parse_project_date(text: &str) -> Option<Date> {
    match try_parse_project_date(text) {
        Ok(date) => date,
        Err(e) => {
            tracing::warn!(input = text, error = %e, "Discarding unparseable date");
            None
        }
    }
}
