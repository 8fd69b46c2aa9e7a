//! Idempotent nested path provisioning
//!
//! Segments are created strictly root-to-leaf so the backend never sees a
//! child before its parent. "Already exists" counts as success. Concurrent
//! calls for the same path share one in-flight attempt.

use crate::config::UploadSource;
use crate::error::{ImportError, StoreError};
use crate::store::{AssetStore, DirectoryStatus};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Creates ancestor directories in the asset store, at most once per path
pub struct StorageProvisioner {
    store: Arc<dyn AssetStore>,
    source: UploadSource,
    /// Path -> completion cell. Failed attempts leave the cell empty.
    provisioned: DashMap<String, Arc<OnceCell<()>>>,
}

impl StorageProvisioner {
    #[must_use]
    pub fn new(store: Arc<dyn AssetStore>, source: UploadSource) -> Self {
        Self {
            store,
            source,
            provisioned: DashMap::new(),
        }
    }

    /// Ensure every segment of `path` exists.
    ///
    /// # Errors
    /// `ImportError::ProvisioningFailure` when the deepest segment could not
    /// be created. Errors on intermediate segments are logged and ignored.
    #[tracing::instrument(skip(self), fields(source = %self.source))]
    pub async fn ensure_path(&self, path: &str) -> Result<(), ImportError> {
        let key = normalize(path);
        if key.is_empty() {
            return Ok(());
        }

        let cell = self
            .provisioned
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let outcome = cell.get_or_try_init(|| self.create_segments(&key)).await;
        outcome
            .map(|_| ())
            .map_err(|source| ImportError::ProvisioningFailure { path: key.clone(), source })
    }

    /// Whether `path` has been provisioned by this instance
    #[must_use]
    pub fn is_provisioned(&self, path: &str) -> bool {
        self.provisioned
            .get(&normalize(path))
            .is_some_and(|cell| cell.initialized())
    }

    async fn create_segments(&self, path: &str) -> Result<(), StoreError> {
        let segments: Vec<&str> = path.split('/').collect();
        let mut current = String::with_capacity(path.len());

        for (idx, segment) in segments.iter().enumerate() {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            let is_leaf = idx + 1 == segments.len();

            match self.store.create_directory(self.source, &current).await {
                Ok(DirectoryStatus::Created) => tracing::debug!(dir = %current, "created directory"),
                Ok(DirectoryStatus::AlreadyExists) => {}
                Err(e) if e.is_already_exists() => {}
                Err(e) if is_leaf => {
                    tracing::error!(dir = %current, error = %e, "leaf directory creation failed");
                    return Err(e);
                }
                Err(e) => {
                    tracing::debug!(dir = %current, error = %e, "ignoring ancestor directory error");
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for StorageProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageProvisioner")
            .field("source", &self.source)
            .field("paths", &self.provisioned.len())
            .finish_non_exhaustive()
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
