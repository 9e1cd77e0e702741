//! Batch import of talk records from delimited text.
//!
//! Decoding ([`decoder`]) and per-row validation ([`validator`]) are pure; the
//! persistence half of the pipeline lives in `app::import_service`.

use serde::Serialize;
use utoipa::ToSchema;

pub mod decoder;
pub mod validator;

pub use decoder::{decode, DecodedBatch, DecodedRow};
pub use validator::{validate, ValidRow, Verdict};

/// Line number used for errors that concern the whole batch.
pub const BATCH_LINE: i64 = -1;

/// Classification of an import defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ColumnMismatch,
    MissingField,
    TypeMismatch,
    NumberParseError,
    DateParseError,
    GenericError,
}

/// One defect found while importing. Errors are reported in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportError {
    /// 1-based source line, or `-1` for whole-batch failures.
    pub line: i64,
    pub kind: ErrorKind,
    pub field: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl ImportError {
    pub fn new(line: i64, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            field: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn for_field(
        line: i64,
        kind: ErrorKind,
        column: Column,
        value: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            kind,
            field: Some(column.name().to_string()),
            value: Some(value.to_string()),
            message: message.into(),
        }
    }

    /// The single error reported when the source cannot be decoded at all.
    pub fn batch_fatal(cause: impl std::fmt::Display) -> Self {
        Self::new(
            BATCH_LINE,
            ErrorKind::GenericError,
            format!("Critical error during CSV parsing: {}", cause),
        )
    }
}

/// Terminal result of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Rows that went through persistence without failing, duplicates included.
    pub imported_count: u64,
    /// How many of `imported_count` matched a talk that already existed.
    pub duplicate_count: u64,
    pub errors: Vec<ImportError>,
}

impl ImportOutcome {
    pub fn failed(error: ImportError) -> Self {
        Self {
            errors: vec![error],
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// The columns every source header must declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    Author,
    Date,
    Views,
    Likes,
    Link,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Title,
        Column::Author,
        Column::Date,
        Column::Views,
        Column::Likes,
        Column::Link,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::Author => "author",
            Column::Date => "date",
            Column::Views => "views",
            Column::Likes => "likes",
            Column::Link => "link",
        }
    }
}

/// A decoded, not yet validated record. Values keep their raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub title: String,
    pub author: String,
    pub date: String,
    pub views: String,
    pub likes: String,
    pub link: String,
}

impl RawRow {
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Title => &self.title,
            Column::Author => &self.author,
            Column::Date => &self.date,
            Column::Views => &self.views,
            Column::Likes => &self.likes,
            Column::Link => &self.link,
        }
    }

    fn slot(&mut self, column: Column) -> &mut String {
        match column {
            Column::Title => &mut self.title,
            Column::Author => &mut self.author,
            Column::Date => &mut self.date,
            Column::Views => &mut self.views,
            Column::Likes => &mut self.likes,
            Column::Link => &mut self.link,
        }
    }
}

/// Fixed shape of an import source. Built once and handed to the components
/// that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFormat {
    pub delimiter: u8,
    /// Columns whose cell must be non-empty for a row to be decoded at all.
    /// Empty by default, so blank values reach the validator and are reported
    /// with their field name.
    pub required_cells: Vec<Column>,
    /// Pattern quoted in date errors. Parsing itself is [`crate::domain::talk::YearMonth::parse_month_year`].
    pub month_pattern: &'static str,
}

impl Default for ImportFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            required_cells: Vec::new(),
            month_pattern: "MMMM yyyy",
        }
    }
}
