// Schema validation and typed conversion of a loaded CSV table

use std::collections::HashSet;

use super::{
    CellValue, ClimateRecord, ClimateTable, Column, CsvTable, TEMPERATURE_COLUMN, YEAR_COLUMN,
};
use crate::error::{ClimateError, Result};

/// Line of the first data row; line 1 is the header
const FIRST_DATA_LINE: u64 = 2;

/// Check that `Year` and `Temperature` exist and build the typed table
///
/// Only the header is checked. Cell contents are never rejected: every
/// column is kept with the narrowest type all of its cells fit, and rows
/// without a numeric Year and Temperature are left out of the plot.
pub fn validate(table: &CsvTable) -> Result<ClimateTable> {
    let year_idx = table.column_index(YEAR_COLUMN);
    let temp_idx = table.column_index(TEMPERATURE_COLUMN);

    let (Some(year_idx), Some(temp_idx)) = (year_idx, temp_idx) else {
        let missing = [(YEAR_COLUMN, year_idx), (TEMPERATURE_COLUMN, temp_idx)]
            .into_iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(ClimateError::SchemaError { missing });
    };

    let columns = column_names(table)
        .into_iter()
        .enumerate()
        .map(|(idx, name)| Column {
            name,
            values: typed_column(table, idx),
        })
        .collect();

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped_lines = Vec::new();
    for (row, record) in (0_u64..).zip(&table.rows) {
        let year = record.get(year_idx).and_then(parse_year);
        let temperature = record.get(temp_idx).and_then(parse_temperature);
        match (year, temperature) {
            (Some(year), Some(temperature)) => records.push(ClimateRecord { year, temperature }),
            _ => skipped_lines.push(
                record
                    .position()
                    .map_or(FIRST_DATA_LINE + row, csv::Position::line),
            ),
        }
    }

    Ok(ClimateTable::new(columns, records, skipped_lines))
}

/// Header names made unique: blanks become `Unnamed: <idx>`, repeats get `.1`, `.2`, ...
fn column_names(table: &CsvTable) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = if header.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                header.to_string()
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{n}");
                n += 1;
            }
            name
        })
        .collect()
}

/// Integer when every cell is an integer, float when every non-empty cell
/// is a number, text otherwise. Empty cells are `Missing` in float and
/// text columns.
fn typed_column(table: &CsvTable, idx: usize) -> Vec<CellValue> {
    let cells: Vec<&str> = table
        .rows
        .iter()
        .map(|r| r.get(idx).unwrap_or_default())
        .collect();

    if cells.iter().all(|c| c.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .filter_map(|c| c.parse().ok())
            .map(CellValue::Integer)
            .collect();
    }

    if cells
        .iter()
        .all(|c| c.is_empty() || c.parse::<f64>().is_ok())
    {
        return cells
            .iter()
            .map(|c| c.parse().map_or(CellValue::Missing, CellValue::Float))
            .collect();
    }

    cells
        .iter()
        .map(|c| {
            if c.is_empty() {
                CellValue::Missing
            } else {
                CellValue::Text((*c).to_string())
            }
        })
        .collect()
}

fn parse_year(cell: &str) -> Option<i64> {
    cell.parse().ok()
}

fn parse_temperature(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|t| t.is_finite())
}
