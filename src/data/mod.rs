//! Climate data module
//!
//! Loading is split in two steps:
//! - [`loader`] reads the CSV into an untyped [`CsvTable`]
//! - [`validator`] checks the schema and converts it into a typed [`ClimateTable`]
//!
//! A `ClimateTable` can only be obtained through the validator, so every
//! table that reaches a renderer has a Year and a Temperature on each row.

pub mod loader;
pub mod validator;

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::logger;

pub use loader::CsvTable;

pub const YEAR_COLUMN: &str = "Year";
pub const TEMPERATURE_COLUMN: &str = "Temperature";

/// One Year/Temperature observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateRecord {
    pub year: i64,
    pub temperature: f64,
}

/// A single CSV cell, typed by the column it belongs to
///
/// Serializes as a bare JSON value; `Missing` and non-finite floats
/// become `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

/// A named column with one value per data row
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// The full dataset for one request, in file order
///
/// `columns` holds every CSV column. `records` holds only the rows whose
/// Year and Temperature are both numeric; the file lines of the others
/// are kept in `skipped_lines`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateTable {
    columns: Vec<Column>,
    records: Vec<ClimateRecord>,
    skipped_lines: Vec<u64>,
}

impl ClimateTable {
    pub(crate) const fn new(
        columns: Vec<Column>,
        records: Vec<ClimateRecord>,
        skipped_lines: Vec<u64>,
    ) -> Self {
        Self {
            columns,
            records,
            skipped_lines,
        }
    }

    /// Two-column table built straight from observations
    #[cfg(test)]
    pub(crate) fn from_records(records: Vec<ClimateRecord>) -> Self {
        let columns = vec![
            Column {
                name: YEAR_COLUMN.to_string(),
                values: records.iter().map(|r| CellValue::Integer(r.year)).collect(),
            },
            Column {
                name: TEMPERATURE_COLUMN.to_string(),
                values: records
                    .iter()
                    .map(|r| CellValue::Float(r.temperature))
                    .collect(),
            },
        ];
        Self::new(columns, records, Vec::new())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows that can be plotted
    pub fn records(&self) -> &[ClimateRecord] {
        &self.records
    }

    /// File line numbers (1-based, header is line 1) of rows left out of `records`
    pub fn skipped_lines(&self) -> &[u64] {
        &self.skipped_lines
    }

    /// Number of data rows, plottable or not
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Smallest and largest plottable year, `None` when nothing is plottable
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        let mut years = self.records.iter().map(|r| r.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Smallest and largest plottable temperature, `None` when nothing is plottable
    pub fn temperature_bounds(&self) -> Option<(f64, f64)> {
        let mut temps = self.records.iter().map(|r| r.temperature);
        let first = temps.next()?;
        Some(temps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

/// Load and validate the climate CSV at `path`
pub fn load_climate_table(path: &Path) -> Result<ClimateTable> {
    let raw = loader::load_table(path)?;
    let table = validator::validate(&raw)?;
    logger::log_debug(&format!(
        "Loaded {} rows from {}",
        table.row_count(),
        path.display()
    ));
    if !table.skipped_lines().is_empty() {
        logger::log_debug(&format!(
            "{}: lines without a numeric Year and Temperature: {:?}",
            path.display(),
            table.skipped_lines()
        ));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClimateError;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_climate_table() {
        let file = write_csv("Year,Temperature\n2020,14.2\n2021,14.5\n");
        let table = load_climate_table(file.path()).unwrap();
        assert_eq!(
            table.records(),
            &[
                ClimateRecord {
                    year: 2020,
                    temperature: 14.2
                },
                ClimateRecord {
                    year: 2021,
                    temperature: 14.5
                },
            ]
        );
        assert_eq!(table.year_bounds(), Some((2020, 2021)));
        assert_eq!(table.temperature_bounds(), Some((14.2, 14.5)));
    }

    #[test]
    fn test_rows_keep_file_order() {
        let file = write_csv("Year,Temperature\n2022,15.0\n1990,13.1\n2005,14.0\n");
        let table = load_climate_table(file.path()).unwrap();
        let years: Vec<i64> = table.records().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2022, 1990, 2005]);
        assert_eq!(table.year_bounds(), Some((1990, 2022)));
    }

    #[test]
    fn test_load_errors_propagate() {
        let missing = load_climate_table(Path::new("no/such/climate.csv"));
        assert!(matches!(missing, Err(ClimateError::FileNotFound { .. })));

        let schema = write_csv("Year,Rainfall\n2020,800\n");
        assert!(matches!(
            load_climate_table(schema.path()),
            Err(ClimateError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_empty_table_bounds() {
        let table = ClimateTable::from_records(Vec::new());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.year_bounds(), None);
        assert_eq!(table.temperature_bounds(), None);
    }

    #[test]
    fn test_unplottable_rows_are_kept() {
        let file = write_csv("Year,Temperature\n2020,14.2\n2021,warm\n\n2022,\n2023,14.9\n");
        let table = load_climate_table(file.path()).unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.records().len(), 2);
        // Line 4 is blank, so the empty Temperature sits on line 5
        assert_eq!(table.skipped_lines(), &[3, 5]);
        assert_eq!(table.year_bounds(), Some((2020, 2023)));
    }
}
