use crate::config::Config;
use crate::credentials::CredentialProvider;
use crate::error::{Result, SheetOrmError};
use crate::hooks::{HookPoint, Hooks};
use crate::record::{self, Grid, Record};
use crate::store::{RangeStore, ServiceProvider};
use crate::validation;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;

/// A single sheet treated as a table of `T` records.
///
/// Row 0 of the sheet is the header; every later row is one record. Each
/// operation obtains a fresh service handle, reads the whole sheet and works
/// on that copy. Update and delete write the whole sheet back, so they cost
/// O(rows) per call, and a concurrent writer between the read and the write
/// is silently overwritten.
pub struct Table<T, P = CredentialProvider> {
    provider: P,
    spreadsheet_id: String,
    sheet_name: String,
    hooks: Hooks,
    _model: PhantomData<fn() -> T>,
}

impl<T> Table<T, CredentialProvider>
where
    T: DeserializeOwned,
{
    /// A table over the configured spreadsheet and sheet, authenticated with
    /// the configured service account key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (spreadsheet_id, sheet_name) = config.require_table()?;
        Ok(Self::new(
            CredentialProvider::from_config(config),
            spreadsheet_id,
            sheet_name,
        ))
    }
}

impl<T, P> Table<T, P>
where
    T: DeserializeOwned,
    P: ServiceProvider,
{
    pub fn new(
        provider: P,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Table {
            provider,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            hooks: Hooks::new(),
            _model: PhantomData,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    // ── Hook registration ───────────────────────────────────────────

    pub fn on_before_insert<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Record) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.hooks.register(HookPoint::BeforeInsert, hook);
        self
    }

    pub fn on_after_insert<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Record) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.hooks.register(HookPoint::AfterInsert, hook);
        self
    }

    pub fn on_before_update<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Record) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.hooks.register(HookPoint::BeforeUpdate, hook);
        self
    }

    pub fn on_after_update<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Record) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.hooks.register(HookPoint::AfterUpdate, hook);
        self
    }

    // ── Reads ───────────────────────────────────────────────────────

    async fn read_sheet(&self) -> Result<(P::Handle, Grid)> {
        let store = self.provider.service_handle().await?;
        let grid = store
            .read_range(&self.spreadsheet_id, &self.sheet_name)
            .await?;
        log::debug!("Read {} rows from sheet '{}'", grid.len(), self.sheet_name);
        Ok((store, grid))
    }

    /// Records in sheet order, optionally filtered then paginated.
    /// `offset` is applied before `limit`, both after filtering.
    pub async fn find_records(
        &self,
        filter: Option<&Record>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Record>> {
        let (_, grid) = self.read_sheet().await?;
        let mut records = record::records_from_grid(&grid);

        if let Some(filter) = filter {
            records.retain(|r| r.matches(filter));
        }

        Ok(record::paginate(records, limit, offset))
    }

    /// Typed form of [`Table::find_records`].
    pub async fn find_all(
        &self,
        filter: Option<&Record>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<T>> {
        self.find_records(filter, limit, offset)
            .await?
            .into_iter()
            .map(Record::into_model)
            .collect()
    }

    /// The first record whose `column` equals `value`.
    /// Loads the whole sheet and scans it.
    pub async fn find_one(&self, column: &str, value: &str) -> Result<Option<T>> {
        let records = self.find_records(None, None, None).await?;
        records
            .into_iter()
            .find(|r| r.field_equals(column, value))
            .map(Record::into_model)
            .transpose()
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Append one record. `data` must carry `id`, `name` and `age`; no
    /// uniqueness check is made on `id`.
    ///
    /// On a sheet with no rows at all, the header is taken from `data`'s own
    /// field order and written ahead of the record.
    pub async fn insert<D>(&self, data: &D) -> Result<()>
    where
        D: Serialize + ?Sized,
    {
        let data = Record::from_model(data)?;
        validation::validate_insert(&data)?;

        self.hooks.run(HookPoint::BeforeInsert, &data).await?;

        let (store, grid) = self.read_sheet().await?;
        let mut rows: Grid = Vec::new();
        let header = match record::header_of(&grid) {
            Some(header) => header,
            None => {
                let header: Vec<String> = data.keys().cloned().collect();
                rows.push(header.iter().cloned().map(Value::String).collect());
                header
            }
        };
        rows.push(record::record_to_row(&header, &data));

        store
            .append_rows(&self.spreadsheet_id, &self.sheet_name, rows)
            .await?;
        log::info!("Inserted record into sheet '{}'", self.sheet_name);

        self.hooks.run(HookPoint::AfterInsert, &data).await
    }

    /// Merge `patch` into the first record whose `column` equals `value` and
    /// rewrite the sheet. Returns `false` if nothing matched; the before-update
    /// hooks have already run by then.
    pub async fn update<D>(&self, column: &str, value: &str, patch: &D) -> Result<bool>
    where
        D: Serialize + ?Sized,
    {
        let patch = Record::from_model(patch)?;
        self.hooks.run(HookPoint::BeforeUpdate, &patch).await?;

        let (store, grid) = self.read_sheet().await?;
        let mut records = record::records_from_grid(&grid);
        let header = self.header_from_records(&records)?;

        let Some(index) = records.iter().position(|r| r.field_equals(column, value)) else {
            return Ok(false);
        };
        records[index].merge(&patch);

        self.rewrite(&store, &grid, record::grid_from_records(&header, &records))
            .await?;
        log::info!(
            "Updated record {column}={value} in sheet '{}'",
            self.sheet_name
        );

        self.hooks.run(HookPoint::AfterUpdate, &patch).await?;
        Ok(true)
    }

    /// Remove every record whose `column` equals `value` and rewrite the
    /// sheet. Returns `false`, without writing, if nothing matched.
    pub async fn delete(&self, column: &str, value: &str) -> Result<bool> {
        let (store, grid) = self.read_sheet().await?;
        let records = record::records_from_grid(&grid);
        let header = self.header_from_records(&records)?;

        let before = records.len();
        let remaining: Vec<Record> = records
            .into_iter()
            .filter(|r| !r.field_equals(column, value))
            .collect();
        if remaining.len() == before {
            return Ok(false);
        }

        self.rewrite(&store, &grid, record::grid_from_records(&header, &remaining))
            .await?;
        log::info!(
            "Deleted {} record(s) {column}={value} from sheet '{}'",
            before - remaining.len(),
            self.sheet_name
        );
        Ok(true)
    }

    /// Write `rows` over the sheet in one request, blanking whatever part of
    /// `previous` they no longer cover.
    async fn rewrite(&self, store: &P::Handle, previous: &Grid, mut rows: Grid) -> Result<()> {
        record::pad_to_extent(&mut rows, previous);
        store
            .write_range(&self.spreadsheet_id, &self.sheet_name, rows)
            .await
    }

    /// Column order for a full rewrite, taken from the first record.
    /// A sheet with no records has nothing to take it from.
    fn header_from_records(&self, records: &[Record]) -> Result<Vec<String>> {
        match records.first() {
            Some(first) => Ok(first.keys().cloned().collect()),
            None => {
                log::warn!("Sheet '{}' has no records to rewrite", self.sheet_name);
                Err(SheetOrmError::EmptySheet {
                    sheet: self.sheet_name.clone(),
                })
            }
        }
    }
}
