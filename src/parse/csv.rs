//! Parser for comma-separated survey files.

use std::mem;

use thiserror::Error;

use crate::table::{Table, TableError};

/// Result type for parsing CSV text.
pub type ParseResult<T> = Result<T, ParseError>;

/// Describes failures while reading CSV text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input held no header row.
    #[error("CSV input is empty: expected a header row")]
    Empty,
    /// A quoted field was still open at the end of the input.
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
    /// A closing quote was followed by something other than a separator.
    #[error("unexpected character after closing quote on line {line}")]
    TrailingAfterQuote { line: usize },
    /// A data row does not have one cell per header.
    #[error("line {line}: {source}")]
    Shape { line: usize, source: TableError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

#[derive(Debug)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

impl Record {
    fn is_blank(&self) -> bool {
        matches!(self.fields.as_slice(), [only] if only.trim().is_empty())
    }
}

/// Reads CSV text into a [`Table`]. The first non-blank record is the header.
pub fn parse_str(input: &str) -> ParseResult<Table> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = split_records(input)?
        .into_iter()
        .filter(|record| !record.is_blank());

    let header = records.next().ok_or(ParseError::Empty)?;
    log::debug!("CSV header on line {}: {:?}", header.line, header.fields);

    let mut table = Table::new(header.fields);
    for record in records {
        table
            .push_row(record.fields)
            .map_err(|source| ParseError::Shape {
                line: record.line,
                source,
            })?;
    }
    log::debug!("parsed {} CSV data rows", table.row_count());
    Ok(table)
}

fn split_records(input: &str) -> ParseResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut state = State::FieldStart;
    let mut line = 1;
    let mut record_line = 1;
    let mut quote_line = 1;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match (state, c) {
            (State::Quoted, '"') => state = State::QuoteInQuoted,
            (State::Quoted, other) => {
                if other == '\n' {
                    line += 1;
                }
                field.push(other);
            }
            (State::QuoteInQuoted, '"') => {
                field.push('"');
                state = State::Quoted;
            }
            (State::FieldStart, '"') => {
                state = State::Quoted;
                quote_line = line;
            }
            (_, ',') => {
                fields.push(mem::take(&mut field));
                state = State::FieldStart;
            }
            (_, '\r') if chars.peek() == Some(&'\n') => {}
            (_, '\n' | '\r') => {
                fields.push(mem::take(&mut field));
                records.push(Record {
                    line: record_line,
                    fields: mem::take(&mut fields),
                });
                line += 1;
                record_line = line;
                state = State::FieldStart;
            }
            (State::QuoteInQuoted, _) => return Err(ParseError::TrailingAfterQuote { line }),
            (_, other) => {
                field.push(other);
                state = State::Unquoted;
            }
        }
    }

    match state {
        State::Quoted => return Err(ParseError::UnterminatedQuote { line: quote_line }),
        State::FieldStart if field.is_empty() && fields.is_empty() => {}
        _ => {
            fields.push(field);
            records.push(Record {
                line: record_line,
                fields,
            });
        }
    }
    Ok(records)
}
