// Remote range store - the get/append/update contract of the spreadsheet service

mod memory;
mod sheets;

pub use memory::MemoryStore;
pub use sheets::SheetsClient;

use crate::error::Result;
use crate::record::Grid;
use async_trait::async_trait;

/// Whole-range access to the cells of one spreadsheet.
///
/// Ranges are A1 notation; a bare sheet name addresses the whole sheet.
#[async_trait]
pub trait RangeStore: Send + Sync {
    /// Read every row in the range. Rows may be shorter than the widest row
    /// when trailing cells are empty; an empty range yields an empty grid.
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid>;

    /// Add rows after the existing content of the range.
    async fn append_rows(&self, spreadsheet_id: &str, range: &str, rows: Grid) -> Result<()>;

    /// Overwrite the range, starting at its first cell, with `rows` in a
    /// single request. Cells outside `rows` keep their values; send `""` to
    /// blank them.
    async fn write_range(&self, spreadsheet_id: &str, range: &str, rows: Grid) -> Result<()>;
}

/// Hands out an authenticated [`RangeStore`].
///
/// The table asks for a fresh handle on every operation.
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    type Handle: RangeStore;

    async fn service_handle(&self) -> Result<Self::Handle>;
}
