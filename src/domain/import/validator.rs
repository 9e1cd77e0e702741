//! Per-row field checks.
//!
//! Every check runs on every row, so one pass reports all of a row's defects.
//! An invalid row is an ordinary verdict, not a failure.

use super::{Column, ErrorKind, ImportError, ImportFormat, RawRow};
use crate::domain::talk::YearMonth;

/// A row whose fields all passed, with typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRow {
    pub title: String,
    pub author: String,
    pub date: YearMonth,
    pub views: i64,
    pub likes: i64,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub row: Option<ValidRow>,
    pub errors: Vec<ImportError>,
}

impl Verdict {
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn validate(raw: &RawRow, line: i64, format: &ImportFormat) -> Verdict {
    let mut errors = Vec::new();

    let views = check_counter(Column::Views, &raw.views, line, &mut errors);
    let likes = check_counter(Column::Likes, &raw.likes, line, &mut errors);
    let date = check_month(&raw.date, line, format, &mut errors);
    check_present(Column::Author, &raw.author, line, &mut errors);
    check_present(Column::Title, &raw.title, line, &mut errors);

    let row = match (views, likes, date) {
        (Some(views), Some(likes), Some(date)) if errors.is_empty() => Some(ValidRow {
            title: raw.title.clone(),
            author: raw.author.clone(),
            date,
            views,
            likes,
            link: Some(raw.link.clone()).filter(|l| !l.trim().is_empty()),
        }),
        _ => None,
    };

    Verdict { row, errors }
}

fn missing(column: Column, raw: &str, line: i64) -> ImportError {
    ImportError::for_field(
        line,
        ErrorKind::MissingField,
        column,
        raw,
        format!("Field '{}' cannot be empty.", column.name()),
    )
}

fn check_present(column: Column, raw: &str, line: i64, errors: &mut Vec<ImportError>) {
    if raw.trim().is_empty() {
        errors.push(missing(column, raw, line));
    }
}

/// Non-negative counter: ASCII digits only, within `i64`.
fn check_counter(
    column: Column,
    raw: &str,
    line: i64,
    errors: &mut Vec<ImportError>,
) -> Option<i64> {
    let name = column.name();
    if raw.trim().is_empty() {
        errors.push(missing(column, raw, line));
        return None;
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(ImportError::for_field(
            line,
            ErrorKind::NumberParseError,
            column,
            raw,
            format!("Invalid format for '{name}': '{raw}'. Only digits are allowed."),
        ));
        return None;
    }
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(ImportError::for_field(
                line,
                ErrorKind::NumberParseError,
                column,
                raw,
                format!("Value '{raw}' for '{name}' is too large for an integer or cannot be parsed."),
            ));
            None
        }
    }
}

fn check_month(
    raw: &str,
    line: i64,
    format: &ImportFormat,
    errors: &mut Vec<ImportError>,
) -> Option<YearMonth> {
    if raw.trim().is_empty() {
        errors.push(missing(Column::Date, raw, line));
        return None;
    }
    let parsed = YearMonth::parse_month_year(raw);
    if parsed.is_none() {
        errors.push(ImportError::for_field(
            line,
            ErrorKind::DateParseError,
            Column::Date,
            raw,
            format!("Cannot parse '{}' as '{}'.", raw, format.month_pattern),
        ));
    }
    parsed
}
