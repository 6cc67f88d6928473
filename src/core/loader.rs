//! Registry loading
//!
//! Reads the three fixed registry columns from CSV into [`RawRow`]s. No
//! cleanup happens here beyond treating empty cells as absent; trimming,
//! dropping and splitting belong to the normalizer.

use csv::{ByteRecord, ReaderBuilder};
use miette::Diagnostic;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::entity::{RawRow, NAME_COLUMN, TYPE_COLUMN, URL_COLUMN};
use crate::core::normalize::{MalformedInput, MalformedPolicy};

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("cannot read {}", .path.display())]
    #[diagnostic(code(drd::input::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV{}: {message}", .line.map(|l| format!(" on line {l}")).unwrap_or_default())]
    #[diagnostic(code(drd::input::csv))]
    Csv { line: Option<u64>, message: String },

    #[error("input is missing the required column {column:?}")]
    #[diagnostic(
        code(drd::input::missing_column),
        help("the registry needs a header row with \"Entity Full Name\", \"Type\" and \"URL\" columns")
    )]
    MissingColumn { column: &'static str },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Malformed(#[from] MalformedInput),
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        LoadError::Csv {
            line: err.position().map(|p| p.line()),
            message: err.to_string(),
        }
    }
}

/// Column indices of the registry fields
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    types: usize,
    url: usize,
}

impl Columns {
    fn locate(headers: &ByteRecord) -> Result<Self, LoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim() == column)
                .ok_or(LoadError::MissingColumn { column })
        };

        Ok(Self {
            name: find(NAME_COLUMN)?,
            types: find(TYPE_COLUMN)?,
            url: find(URL_COLUMN)?,
        })
    }
}

/// Load registry rows from a CSV file
pub fn load_rows(path: &Path, on_malformed: MalformedPolicy) -> Result<Vec<RawRow>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "reading registry");
    read_rows(BufReader::new(file), on_malformed)
}

/// Read registry rows from any CSV source with a header row
pub fn read_rows<R: Read>(
    reader: R,
    on_malformed: MalformedPolicy,
) -> Result<Vec<RawRow>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::locate(rdr.byte_headers()?)?;
    let mut rows = Vec::new();

    for result in rdr.byte_records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        let types = match record.get(columns.types).map(std::str::from_utf8).transpose() {
            Ok(types) => types.filter(|t| !t.is_empty()).map(str::to_string),
            Err(_) => {
                let err = MalformedInput::new(line, "Type cell is not valid UTF-8 text");
                match on_malformed {
                    MalformedPolicy::Abort => return Err(err.into()),
                    MalformedPolicy::Skip => {
                        warn!(line, "{}; skipping row", err.reason);
                        continue;
                    }
                }
            }
        };

        rows.push(RawRow {
            line,
            name: text_cell(&record, columns.name),
            types,
            url: text_cell(&record, columns.url),
        });
    }

    debug!(rows = rows.len(), "read registry rows");
    Ok(rows)
}

fn text_cell(record: &ByteRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|cell| !cell.is_empty())
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
}
