use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// An opened worksheet. Cheap to clone; carries no connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    pub title: String,
    pub sheet_id: i64,
}

/// Row-level operations the adapter needs from a spreadsheet service.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    async fn open_worksheet(&self, title: &str) -> Result<TableHandle, StoreError>;

    /// Values of row 1; empty when the sheet has no header yet.
    async fn first_row(&self, table: &TableHandle) -> Result<Vec<String>, StoreError>;

    /// Inserts `values` above the current first row.
    async fn insert_first_row(&self, table: &TableHandle, values: &[String]) -> Result<(), StoreError>;

    async fn append_row(&self, table: &TableHandle, values: &[String]) -> Result<(), StoreError>;
}

/// Adapter over the configured spreadsheet. When no backend could be built
/// (missing credentials or sheet location) every open reports `Unavailable`.
#[derive(Clone)]
pub struct ExternalStore {
    backend: Option<Arc<dyn SheetBackend>>,
    reason: String,
}

impl ExternalStore {
    pub fn new(backend: Arc<dyn SheetBackend>) -> Self {
        ExternalStore {
            backend: Some(backend),
            reason: String::new(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ExternalStore {
            backend: None,
            reason: reason.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&Arc<dyn SheetBackend>, StoreError> {
        self.backend
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable(self.reason.clone()))
    }

    /// Opens `table_name` and makes sure its first row equals `headers`.
    /// A failing header check is logged and does not fail the open.
    pub async fn open_table(&self, table_name: &str, headers: &[String]) -> Result<TableHandle, StoreError> {
        let backend = self.backend()?;
        debug!(table = table_name, "opening worksheet");
        let table = backend.open_worksheet(table_name).await?;

        if let Err(e) = ensure_headers(backend.as_ref(), &table, headers).await {
            warn!(table = table_name, error = %e, "header setup failed; continuing without guaranteed headers");
        }

        Ok(table)
    }

    pub async fn append_row(&self, table: &TableHandle, values: &[String]) -> Result<(), StoreError> {
        self.backend()?.append_row(table, values).await
    }
}

/// Inserts `expected` as the first row unless row 1 already matches it
/// exactly. Returns whether a header row was written.
pub async fn ensure_headers(
    backend: &dyn SheetBackend,
    table: &TableHandle,
    expected: &[String],
) -> Result<bool, StoreError> {
    let first_row = backend.first_row(table).await?;
    if !first_row.is_empty() && first_row == expected {
        return Ok(false);
    }

    backend.insert_first_row(table, expected).await?;
    info!(table = %table.title, "headers added to worksheet");
    Ok(true)
}
