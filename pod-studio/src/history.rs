//! Submission history.
//!
//! Every successful submission is appended to a JSON file under the
//! application home directory.

use std::time::{SystemTime, UNIX_EPOCH};

use pod_client::PrintOptions;
use pod_core::{
    EditorSession, FileStoreManager, JsonStore, MemoryDataPort, ProductColor, ProductSide,
    ProductSize,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StudioResult;

/// Store name of the history file.
pub const HISTORY_FILE: &str = "history/submissions.json";

/// One successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Product name at submission time.
    pub product_name: String,
    /// Product color.
    pub color: ProductColor,
    /// Product size.
    pub size: ProductSize,
    /// Side that was submitted.
    pub side: ProductSide,
    /// Mock-up dataset.
    pub dataset_name: String,
    /// Model gender.
    pub gender: String,
    /// URL of the rendered mock-up.
    pub image_url: String,
    /// Seconds since the Unix epoch.
    pub submitted_at: u64,
}

impl SubmissionRecord {
    /// Record a submission of `session` that produced `image_url`.
    #[must_use]
    pub fn new(session: &EditorSession, options: &PrintOptions, image_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_name: session.product_name().to_string(),
            color: session.color(),
            size: session.size(),
            side: session.side(),
            dataset_name: options.dataset_name.clone(),
            gender: options.gender.clone(),
            image_url: image_url.into(),
            submitted_at: current_timestamp(),
        }
    }
}

/// Persistent list of submissions, oldest first.
pub struct SubmissionHistory {
    store: JsonStore<Vec<SubmissionRecord>>,
}

impl std::fmt::Debug for SubmissionHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionHistory")
            .field("records", &self.records().len())
            .finish()
    }
}

impl SubmissionHistory {
    /// Open the history file under `manager`'s home, loading what is there.
    ///
    /// A missing or unreadable file starts an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the history path cannot be prepared.
    pub fn open(manager: &FileStoreManager) -> StudioResult<Self> {
        let port = manager.port(HISTORY_FILE)?;
        let mut store = JsonStore::new(Box::new(port));
        if !store.load() {
            tracing::debug!("starting with empty submission history");
        }
        Ok(Self { store })
    }

    /// A history that lives only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: JsonStore::new(Box::new(MemoryDataPort::new())),
        }
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[SubmissionRecord] {
        self.store.data().map(Vec::as_slice).unwrap_or_default()
    }

    /// Append a record and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be written.
    pub fn record(&mut self, record: SubmissionRecord) -> StudioResult<()> {
        tracing::info!(id = %record.id, url = %record.image_url, "recording submission");
        match self.store.data_mut() {
            Some(records) => records.push(record),
            None => self.store.set(vec![record]),
        }
        self.store.save()?;
        Ok(())
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
