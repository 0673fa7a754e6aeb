// Row/record mapping - header zipping, filtering, pagination

mod de;

use crate::error::{Result, SheetOrmError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Row-major cell values of a sheet. Rows may be ragged.
pub type Grid = Vec<Vec<Value>>;

/// One data row keyed by column name, in header order.
///
/// Cells read from a sheet are strings, or `Null` where the cell is empty or
/// beyond the end of a short row. Records are rebuilt on every read and never
/// cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Column names in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow overwrite: every field in `patch` replaces this record's value,
    /// all other fields are kept. New columns land at the end.
    pub fn merge(&mut self, patch: &Record) {
        for (column, value) in patch.iter() {
            self.0.insert(column.clone(), value.clone());
        }
    }

    /// True when every column in `filter` holds an equal value here.
    /// Equality is strict: the number `10` never matches the string `"10"`,
    /// and a column this record lacks matches nothing, not even `Null`.
    pub fn matches(&self, filter: &Record) -> bool {
        filter
            .iter()
            .all(|(column, expected)| self.get(column) == Some(expected))
    }

    /// True when `column` holds exactly the string `value`.
    pub fn field_equals(&self, column: &str, value: &str) -> bool {
        self.get(column).and_then(Value::as_str) == Some(value)
    }

    /// Serialize a model (struct, map, or another record) into a record.
    /// Field order follows the model's serialization order.
    pub fn from_model<T: Serialize + ?Sized>(model: &T) -> Result<Self> {
        match serde_json::to_value(model)? {
            Value::Object(map) => Ok(Record(map)),
            other => Err(SheetOrmError::Validation(format!(
                "Record data must serialize to an object, got: {other}"
            ))),
        }
    }

    /// Deserialize into a model. String cells are coerced into the number,
    /// boolean, or option types the model asks for.
    pub fn into_model<T: DeserializeOwned>(self) -> Result<T> {
        Ok(de::from_record(self)?)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ── Grid <-> records ────────────────────────────────────────────

/// Column names from the first row, if the grid has one.
pub fn header_of(grid: &Grid) -> Option<Vec<String>> {
    grid.first().map(|row| row.iter().map(cell_text).collect())
}

/// Zip every data row against the header row. Cells past the end of a short
/// row, and empty cells, become `Null`.
pub fn records_from_grid(grid: &Grid) -> Vec<Record> {
    let Some(header) = header_of(grid) else {
        return Vec::new();
    };

    grid.iter()
        .skip(1)
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let value = match row.get(index) {
                        Some(Value::String(s)) if s.is_empty() => Value::Null,
                        Some(value) => value.clone(),
                        None => Value::Null,
                    };
                    (column.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Lay a record out in header order. Absent and null fields are written as `""`.
pub fn record_to_row(header: &[String], record: &Record) -> Vec<Value> {
    header
        .iter()
        .map(|column| match record.get(column) {
            Some(Value::Null) | None => Value::String(String::new()),
            Some(value) => value.clone(),
        })
        .collect()
}

/// The header row followed by one row per record.
pub fn grid_from_records(header: &[String], records: &[Record]) -> Grid {
    std::iter::once(header.iter().cloned().map(Value::String).collect())
        .chain(records.iter().map(|record| record_to_row(header, record)))
        .collect()
}

/// Pad `rows` with `""` cells so it covers at least the extent of `previous`.
///
/// Writing a range only overwrites the cells sent, so a rewrite that shrinks
/// the sheet has to blank the rows and columns it no longer uses.
pub fn pad_to_extent(rows: &mut Grid, previous: &Grid) {
    let width = rows
        .iter()
        .chain(previous.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    let height = rows.len().max(previous.len());

    rows.resize_with(height, Vec::new);
    for row in rows.iter_mut() {
        row.resize(width, Value::String(String::new()));
    }
}

/// Drop `offset` items from the front, then keep at most `limit`.
pub fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: Option<usize>) -> Vec<T> {
    let rest = items.into_iter().skip(offset.unwrap_or(0));
    match limit {
        Some(limit) => rest.take(limit).collect(),
        None => rest.collect(),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
