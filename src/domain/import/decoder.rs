//! Turns delimited text into raw rows.
//!
//! Row-shaped problems are reported and the row is skipped; a source that
//! cannot be read at all yields a single batch-fatal error instead.

use super::{Column, ErrorKind, ImportError, ImportFormat, RawRow};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRow {
    /// Row number for validation: 2 for the first decoded row, then one more
    /// per decoded row. Skipped records do not advance it.
    pub line: i64,
    pub row: RawRow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBatch {
    pub rows: Vec<DecodedRow>,
    /// Decode-level defects, in file order.
    pub errors: Vec<ImportError>,
}

/// Header position of each required column.
struct ColumnPositions {
    width: usize,
    positions: Vec<(Column, usize)>,
}

impl ColumnPositions {
    fn locate(headers: &StringRecord) -> Result<Self, ImportError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();

        let mut positions = Vec::with_capacity(Column::ALL.len());
        let mut missing = Vec::new();
        for column in Column::ALL {
            match names.iter().position(|n| n.eq_ignore_ascii_case(column.name())) {
                Some(idx) => positions.push((column, idx)),
                None => missing.push(column.name()),
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::batch_fatal(format!(
                "Header is missing required column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            width: names.len(),
            positions,
        })
    }

    fn extract(&self, record: &StringRecord) -> RawRow {
        let mut row = RawRow::default();
        for (column, idx) in &self.positions {
            let value = record.get(*idx).unwrap_or_default().trim_start();
            *row.slot(*column) = value.to_string();
        }
        row
    }
}

/// Decodes the whole source up front; the batch is bounded.
pub fn decode<R: Read>(source: R, format: &ImportFormat) -> Result<DecodedBatch, ImportError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers().map_err(ImportError::batch_fatal)?.clone();
    let columns = ColumnPositions::locate(&headers)?;

    let mut batch = DecodedBatch::default();
    let mut record = StringRecord::new();
    let mut next_row_line: i64 = 2;
    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                // Decode errors point at the physical source line.
                let line = record.position().map_or(0, |p| p.line()) as i64;
                if record.len() != columns.width {
                    batch.errors.push(ImportError::new(
                        line,
                        ErrorKind::ColumnMismatch,
                        format!(
                            "Number of data fields ({}) does not match number of headers ({}).",
                            record.len(),
                            columns.width
                        ),
                    ));
                    continue;
                }

                let row = columns.extract(&record);
                if let Some(column) = format
                    .required_cells
                    .iter()
                    .copied()
                    .find(|c| row.get(*c).trim().is_empty())
                {
                    batch.errors.push(ImportError::for_field(
                        line,
                        ErrorKind::MissingField,
                        column,
                        row.get(column),
                        format!("Field '{}' is mandatory but no value was provided.", column.name()),
                    ));
                    continue;
                }

                batch.rows.push(DecodedRow {
                    line: next_row_line,
                    row,
                });
                next_row_line += 1;
            }
            Err(err) => match err.kind() {
                csv::ErrorKind::Utf8 { pos, err: utf8 } => {
                    let line = pos.as_ref().map_or(0, |p| p.line()) as i64;
                    batch.errors.push(ImportError::new(
                        line,
                        ErrorKind::TypeMismatch,
                        format!("Field {} is not valid UTF-8 text.", utf8.field() + 1),
                    ));
                }
                _ => return Err(ImportError::batch_fatal(err)),
            },
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::BATCH_LINE;

    fn decode_str(csv: &str) -> Result<DecodedBatch, ImportError> {
        decode(csv.as_bytes(), &ImportFormat::default())
    }

    #[test]
    fn maps_columns_by_header_name_in_any_order() {
        let batch = decode_str(
            "author,title,views,likes,date,link\n\
             John Doe,Talk 1,100,50,January 2023,http://example.com/1\n",
        )
        .unwrap();

        assert!(batch.errors.is_empty());
        assert_eq!(batch.rows.len(), 1);
        let DecodedRow { line, row } = &batch.rows[0];
        assert_eq!(*line, 2);
        assert_eq!(row.author, "John Doe");
        assert_eq!(row.title, "Talk 1");
        assert_eq!(row.views, "100");
        assert_eq!(row.likes, "50");
        assert_eq!(row.date, "January 2023");
        assert_eq!(row.link, "http://example.com/1");
    }

    #[test]
    fn header_names_are_case_insensitive_and_trimmed() {
        let batch = decode_str("\u{feff}Title, Author ,DATE,views,likes,link\nT,A,May 2020,1,2,\n")
            .unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].row.author, "A");
        assert_eq!(batch.rows[0].row.link, "");
    }

    #[test]
    fn leading_whitespace_is_dropped_from_values() {
        let batch = decode_str("title,author,date,views,likes,link\n  Talk,  Ann,March 2021, 10,5,x\n")
            .unwrap();
        let row = &batch.rows[0].row;
        assert_eq!(row.title, "Talk");
        assert_eq!(row.author, "Ann");
        assert_eq!(row.views, "10");
    }

    #[test]
    fn short_row_is_reported_and_skipped() {
        let batch = decode_str(
            "title,author,date,views,likes,link\n\
             Only,Three,Fields\n\
             T,A,May 2020,1,2,l\n",
        )
        .unwrap();

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].line, 2);
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].kind, ErrorKind::ColumnMismatch);
        assert_eq!(batch.errors[0].line, 2);
    }

    #[test]
    fn row_numbers_count_decoded_rows_only() {
        let batch = decode_str(
            "title,author,date,views,likes,link\n\
             Short,Row\n\
             \"Multi\nline\",A,May 2020,1,2,l\n\
             T,A,May 2020,bad,1,\n",
        )
        .unwrap();

        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].line, 2);
        let lines: Vec<i64> = batch.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(batch.rows[1].row.views, "bad");
    }

    #[test]
    fn required_cell_missing_is_reported_when_configured() {
        let format = ImportFormat {
            required_cells: vec![Column::Link],
            ..ImportFormat::default()
        };
        let batch = decode(
            "title,author,date,views,likes,link\nT,A,May 2020,1,2,\nU,B,May 2020,1,2,x\n".as_bytes(),
            &format,
        )
        .unwrap();

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].row.title, "U");
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].kind, ErrorKind::MissingField);
        assert_eq!(batch.errors[0].field.as_deref(), Some("link"));
        assert_eq!(batch.errors[0].line, 2);
    }

    #[test]
    fn header_without_required_column_is_fatal() {
        let err = decode_str("title,author,date,views,likes\nT,A,May 2020,1,2\n").unwrap_err();
        assert_eq!(err.line, BATCH_LINE);
        assert_eq!(err.kind, ErrorKind::GenericError);
        assert!(err.message.contains("link"), "{}", err.message);
    }

    #[test]
    fn empty_source_is_fatal() {
        let err = decode_str("").unwrap_err();
        assert_eq!(err.kind, ErrorKind::GenericError);
        assert_eq!(err.line, BATCH_LINE);
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let mut bytes = b"title,author,date,views,likes,link\nT,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",May 2020,1,2,l\nU,B,May 2020,1,2,l\n");

        let batch = decode(&bytes[..], &ImportFormat::default()).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].row.title, "U");
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(batch.errors[0].line, 2);
    }

    #[test]
    fn honours_configured_delimiter() {
        let format = ImportFormat {
            delimiter: b';',
            ..ImportFormat::default()
        };
        let batch = decode(
            "title;author;date;views;likes;link\nT, with comma;A;May 2020;1;2;l\n".as_bytes(),
            &format,
        )
        .unwrap();
        assert_eq!(batch.rows[0].row.title, "T, with comma");
    }
}
