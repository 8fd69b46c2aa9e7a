//! Per-batch grouping folder registry
//!
//! At most one canonical folder per `(name, kind)`. Concurrent ensures for
//! the same key share a single in-flight find-or-create; a duplicate-create
//! error from the store is resolved by looking the folder up again.

use crate::error::{ItemError, StoreError};
use crate::store::DocumentStore;
use crate::types::{DocumentKind, FolderId};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Key of a grouping folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderKey {
    pub name: String,
    pub kind: DocumentKind,
}

/// Folder state scoped to one batch
pub struct ProvisioningContext {
    store: Arc<dyn DocumentStore>,
    folders: DashMap<FolderKey, Arc<OnceCell<FolderId>>>,
}

impl ProvisioningContext {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            folders: DashMap::new(),
        }
    }

    /// Find or create the folder `(name, kind)`.
    ///
    /// # Errors
    /// `ItemError::FolderFailure` if the store fails for a reason other than
    /// a duplicate create.
    pub async fn ensure_folder(&self, name: &str, kind: DocumentKind) -> Result<FolderId, ItemError> {
        let key = FolderKey {
            name: name.to_string(),
            kind,
        };
        let cell = self
            .folders
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let outcome = cell.get_or_try_init(|| self.find_or_create(name, kind)).await;
        outcome.cloned().map_err(|source| ItemError::FolderFailure {
            name: name.to_string(),
            kind,
            source,
        })
    }

    /// Folder already resolved in this batch, if any
    #[must_use]
    pub fn resolved(&self, name: &str, kind: DocumentKind) -> Option<FolderId> {
        let key = FolderKey {
            name: name.to_string(),
            kind,
        };
        self.folders.get(&key).and_then(|cell| cell.get().cloned())
    }

    async fn find_or_create(&self, name: &str, kind: DocumentKind) -> Result<FolderId, StoreError> {
        if let Some(id) = self.store.find_folder(name, kind).await? {
            tracing::debug!(folder = name, %kind, %id, "reusing folder");
            return Ok(id);
        }

        match self.store.create_folder(name, kind).await {
            Ok(id) => {
                tracing::info!(folder = name, %kind, %id, "created folder");
                Ok(id)
            }
            Err(e) if e.is_already_exists() => {
                tracing::debug!(folder = name, %kind, "folder created concurrently, looking it up");
                self.store
                    .find_folder(name, kind)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("folder {name:?} ({kind})")))
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for ProvisioningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningContext")
            .field("folders", &self.folders.len())
            .finish_non_exhaustive()
    }
}
