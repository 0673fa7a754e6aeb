use super::{RangeStore, ServiceProvider};
use crate::error::Result;
use crate::record::Grid;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// An in-process spreadsheet. Clones share the same cells, so a clone can be
/// handed to a table as its provider while the original is inspected.
///
/// Stored cells behave like the remote service renders them on read: every
/// value comes back as a string, and trailing empty cells and rows are
/// dropped. Writes overwrite only the cells they carry.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sheets: Arc<Mutex<HashMap<(String, String), Grid>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one sheet with the given contents.
    pub fn with_sheet(spreadsheet_id: &str, range: &str, rows: Grid) -> Self {
        let store = Self::new();
        store
            .lock()
            .insert(key(spreadsheet_id, range), rows.into_iter().map(render_row).collect());
        store
    }

    /// Current contents of a sheet, empty if it was never written.
    pub fn snapshot(&self, spreadsheet_id: &str, range: &str) -> Grid {
        self.lock()
            .get(&key(spreadsheet_id, range))
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, String), Grid>> {
        self.sheets.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn key(spreadsheet_id: &str, range: &str) -> (String, String) {
    (spreadsheet_id.to_string(), range.to_string())
}

/// Render a row the way the service displays it: strings only, no trailing blanks.
fn render_row(row: Vec<Value>) -> Vec<Value> {
    let mut rendered: Vec<Value> = row.into_iter().map(render_cell).collect();
    while rendered.last().is_some_and(|v| v.as_str() == Some("")) {
        rendered.pop();
    }
    rendered
}

fn render_cell(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        Value::Null => Value::String(String::new()),
        Value::Bool(b) => Value::String(if b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        other => Value::String(other.to_string()),
    }
}

#[async_trait]
impl RangeStore for MemoryStore {
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid> {
        Ok(self.snapshot(spreadsheet_id, range))
    }

    async fn append_rows(&self, spreadsheet_id: &str, range: &str, rows: Grid) -> Result<()> {
        self.lock()
            .entry(key(spreadsheet_id, range))
            .or_default()
            .extend(rows.into_iter().map(render_row));
        Ok(())
    }

    async fn write_range(&self, spreadsheet_id: &str, range: &str, rows: Grid) -> Result<()> {
        let mut sheets = self.lock();
        let grid = sheets.entry(key(spreadsheet_id, range)).or_default();

        for (index, row) in rows.into_iter().enumerate() {
            if grid.len() <= index {
                grid.resize_with(index + 1, Vec::new);
            }
            let target = &mut grid[index];
            if target.len() < row.len() {
                target.resize(row.len(), Value::String(String::new()));
            }
            for (column, cell) in row.into_iter().enumerate() {
                target[column] = cell;
            }
            *target = render_row(std::mem::take(target));
        }

        while grid.last().is_some_and(Vec::is_empty) {
            grid.pop();
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceProvider for MemoryStore {
    type Handle = MemoryStore;

    async fn service_handle(&self) -> Result<MemoryStore> {
        Ok(self.clone())
    }
}
