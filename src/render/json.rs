// JSON view of a climate table
// Column-oriented: {"Year": {"0": 2020, ...}, "Temperature": {"0": 14.2, ...}, ...}

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::data::{CellValue, ClimateTable};
use crate::error::Result;

/// Serializable column -> (row index -> value) view, in file order
pub struct TableJson<'a>(pub &'a ClimateTable);

struct ColumnJson<'a>(&'a [CellValue]);

impl Serialize for TableJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns = self.0.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(&column.name, &ColumnJson(&column.values))?;
        }
        map.end()
    }
}

impl Serialize for ColumnJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        // serde_json writes integer map keys as strings: {"0": ...}
        for (idx, value) in self.0.iter().enumerate() {
            map.serialize_entry(&idx, value)?;
        }
        map.end()
    }
}

/// Serialize the whole table as a JSON string
pub fn render_json(table: &ClimateTable) -> Result<String> {
    Ok(serde_json::to_string(&TableJson(table))?)
}
