use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::lock::Mutex;

use warden_result::Result;

/// Opaque storage for uploaded report evidence
#[async_trait]
pub trait AbstractEvidenceStore: Sync + Send {
    /// Store a blob, returning an opaque reference
    async fn upload(&self, bytes: &[u8]) -> Result<String>;

    /// Fetch a blob by its reference
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Reference implementation holding blobs in memory
#[derive(Clone, Default)]
pub struct ReferenceEvidenceStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    unavailable: Arc<AtomicBool>,
}

impl ReferenceEvidenceStore {
    /// Make all following calls fail, to exercise degraded submission
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl AbstractEvidenceStore for ReferenceEvidenceStore {
    async fn upload(&self, bytes: &[u8]) -> Result<String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(create_database_error!("upload", "evidence"));
        }

        let reference = ulid::Ulid::new().to_string();
        self.blobs
            .lock()
            .await
            .insert(reference.to_string(), bytes.to_vec());
        Ok(reference)
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        self.blobs
            .lock()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| create_error!(NotFound))
    }
}
