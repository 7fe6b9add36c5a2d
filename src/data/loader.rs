// CSV loader
// Reads the data file into an untyped table; no column is interpreted here

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{ClimateError, Result};

/// Header plus raw rows, exactly as read from disk
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl CsvTable {
    /// Position of a named column in the header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read the CSV at `path`
///
/// Fails with `FileNotFound` when the path does not exist and with
/// `EmptyData` when the file has no header or no data rows.
pub fn load_table(path: &Path) -> Result<CsvTable> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ClimateError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ClimateError::Io(e),
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(ClimateError::EmptyData);
    }

    let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    if rows.is_empty() {
        return Err(ClimateError::EmptyData);
    }

    Ok(CsvTable { headers, rows })
}
