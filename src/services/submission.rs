use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::Application;
use crate::services::store::ExternalStore;

/// Where a validated submission ended up. Both outcomes look the same to
/// the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Stored,
    LoggedFallback,
}

/// Opens the form's worksheet and appends the record as one row. Any store
/// failure sends the record to the fallback log instead; there is no retry.
pub async fn submit<A: Application>(store: &ExternalStore, application: &A) -> Outcome {
    let submission_id = Uuid::new_v4();
    let row = application.to_row();

    let result = match store.open_table(A::TABLE, &A::headers()).await {
        Ok(table) => store.append_row(&table, &row).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            info!(form = A::KIND, table = A::TABLE, %submission_id, "submission stored");
            Outcome::Stored
        }
        Err(e) => {
            log_fallback::<A>(&submission_id, &row, &e);
            Outcome::LoggedFallback
        }
    }
}

/// Log target that carries records the store did not take. Kept enabled at
/// warn regardless of the configured filter.
pub const FALLBACK_TARGET: &str = "fallback";

fn log_fallback<A: Application>(submission_id: &Uuid, row: &[String], error: &StoreError) {
    warn!(form = A::KIND, table = A::TABLE, %submission_id, error = %error, "store write failed; recording submission in log");

    let record = A::FIELDS
        .iter()
        .zip(row)
        .map(|(field, value)| format!("{}={:?}", field.header, value))
        .collect::<Vec<_>>()
        .join(", ");
    warn!(target: FALLBACK_TARGET, form = A::KIND, %submission_id, %record, "application received");
}
