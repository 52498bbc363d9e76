//! Crate-wide error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::geom::DeflectionError;
use crate::parse::csv::ParseError;
use crate::table::TableError;
use crate::table::coerce::DataFormatError;
use crate::table::columns::MissingColumnError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that stops a table from being processed.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    MissingColumn(#[from] MissingColumnError),
    #[error(transparent)]
    DataFormat(#[from] DataFormatError),
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(#[from] DeflectionError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
