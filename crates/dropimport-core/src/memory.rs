//! In-memory document and asset stores
//!
//! Behave like a strict backend: directories need their parent, duplicate
//! folders are rejected, uploads need their directory. Every call yields once
//! so concurrent callers interleave.

use crate::config::UploadSource;
use crate::error::StoreError;
use crate::store::{AssetStore, DirectoryStatus, DocumentStore};
use crate::types::{
    AssetRef, CreatedDocument, DocumentDraft, DocumentId, DocumentKind, FolderId, Placement,
    UploadFile,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Folder as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFolder {
    pub id: FolderId,
    pub name: String,
    pub kind: DocumentKind,
}

/// Document as stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub name: String,
    pub folder: FolderId,
    pub attributes: serde_json::Value,
}

/// Everything the store holds, for dumping
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub folders: Vec<StoredFolder>,
    pub documents: Vec<StoredDocument>,
    pub placements: Vec<Placement>,
}

/// Document store kept in memory
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    /// Catalog entries: name -> template attributes
    catalog: Vec<(String, serde_json::Value)>,
    folders: Mutex<Vec<StoredFolder>>,
    documents: Mutex<Vec<StoredDocument>>,
    placements: Mutex<Vec<Placement>>,
    folder_creates: AtomicUsize,
    catalog_reads: AtomicUsize,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose catalog holds `names` with minimal templates
    #[must_use]
    pub fn with_catalog<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let catalog = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let template = serde_json::json!({ "_id": format!("tpl-{name}"), "name": name });
                (name, template)
            })
            .collect();
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Add a catalog entry with explicit template attributes
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, template: serde_json::Value) -> Self {
        self.catalog.push((name.into(), template));
        self
    }

    #[must_use]
    pub fn folders(&self) -> Vec<StoredFolder> {
        self.folders.lock().clone()
    }

    #[must_use]
    pub fn documents(&self) -> Vec<StoredDocument> {
        self.documents.lock().clone()
    }

    #[must_use]
    pub fn placements(&self) -> Vec<Placement> {
        self.placements.lock().clone()
    }

    /// Number of successful folder creations
    #[must_use]
    pub fn folder_creates(&self) -> usize {
        self.folder_creates.load(Ordering::SeqCst)
    }

    /// Number of catalog index reads
    #[must_use]
    pub fn catalog_reads(&self) -> usize {
        self.catalog_reads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            folders: self.folders(),
            documents: self.documents(),
            placements: self.placements(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn catalog_names(&self) -> Result<Vec<String>, StoreError> {
        tokio::task::yield_now().await;
        self.catalog_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn find_template(&self, name: &str) -> Result<Option<serde_json::Value>, StoreError> {
        tokio::task::yield_now().await;
        let wanted = name.to_lowercase();
        Ok(self
            .catalog
            .iter()
            .find(|(entry, _)| entry.to_lowercase() == wanted)
            .map(|(_, template)| template.clone()))
    }

    async fn find_folder(
        &self,
        name: &str,
        kind: DocumentKind,
    ) -> Result<Option<FolderId>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self
            .folders
            .lock()
            .iter()
            .find(|f| f.name == name && f.kind == kind)
            .map(|f| f.id.clone()))
    }

    async fn create_folder(&self, name: &str, kind: DocumentKind) -> Result<FolderId, StoreError> {
        tokio::task::yield_now().await;
        let mut folders = self.folders.lock();
        if folders.iter().any(|f| f.name == name && f.kind == kind) {
            return Err(StoreError::AlreadyExists(format!("folder {name}")));
        }
        let id = FolderId(format!("fld-{}", uuid::Uuid::new_v4().simple()));
        folders.push(StoredFolder {
            id: id.clone(),
            name: name.to_string(),
            kind,
        });
        self.folder_creates.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn create_document(&self, draft: DocumentDraft) -> Result<CreatedDocument, StoreError> {
        tokio::task::yield_now().await;
        if !self.folders.lock().iter().any(|f| f.id == draft.folder) {
            return Err(StoreError::NotFound(format!("folder {}", draft.folder)));
        }
        let id = DocumentId(uuid::Uuid::new_v4().simple().to_string());
        let created = CreatedDocument {
            id: id.clone(),
            name: draft.name.clone(),
            kind: draft.kind,
        };
        self.documents.lock().push(StoredDocument {
            id,
            kind: draft.kind,
            name: draft.name,
            folder: draft.folder,
            attributes: draft.attributes,
        });
        Ok(created)
    }

    async fn place(&self, placement: Placement) -> Result<DocumentId, StoreError> {
        tokio::task::yield_now().await;
        let document = placement.document().clone();
        if !self.documents.lock().iter().any(|d| d.id == document) {
            return Err(StoreError::NotFound(format!("document {document}")));
        }
        self.placements.lock().push(placement);
        Ok(DocumentId(format!("plc-{}", uuid::Uuid::new_v4().simple())))
    }
}

/// Asset store kept in memory
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    directories: Mutex<BTreeSet<String>>,
    /// Path -> byte length
    files: Mutex<BTreeMap<String, usize>>,
    directory_calls: Mutex<Vec<String>>,
}

impl MemoryAssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn directories(&self) -> Vec<String> {
        self.directories.lock().iter().cloned().collect()
    }

    /// Stored file paths with their sizes
    #[must_use]
    pub fn files(&self) -> Vec<(String, usize)> {
        self.files
            .lock()
            .iter()
            .map(|(path, len)| (path.clone(), *len))
            .collect()
    }

    /// Every `create_directory` call, in order
    #[must_use]
    pub fn directory_calls(&self) -> Vec<String> {
        self.directory_calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl AssetStore for MemoryAssetStore {
    async fn create_directory(
        &self,
        _source: UploadSource,
        path: &str,
    ) -> Result<DirectoryStatus, StoreError> {
        tokio::task::yield_now().await;
        self.directory_calls.lock().push(path.to_string());
        let mut dirs = self.directories.lock();
        if let Some((parent, _)) = path.rsplit_once('/') {
            if !dirs.contains(parent) {
                return Err(StoreError::NotFound(format!("parent directory {parent}")));
            }
        }
        if dirs.insert(path.to_string()) {
            Ok(DirectoryStatus::Created)
        } else {
            Ok(DirectoryStatus::AlreadyExists)
        }
    }

    async fn upload(
        &self,
        _source: UploadSource,
        directory: &str,
        file: UploadFile,
    ) -> Result<AssetRef, StoreError> {
        tokio::task::yield_now().await;
        if !self.directories.lock().contains(directory) {
            return Err(StoreError::NotFound(format!("directory {directory}")));
        }
        let path = format!("{directory}/{}", file.name);
        self.files.lock().insert(path.clone(), file.bytes.len());
        Ok(AssetRef(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folders::ProvisioningContext;
    use std::sync::Arc;

    #[tokio::test]
    async fn duplicate_folder_rejected() {
        let store = MemoryDocumentStore::new();
        store.create_folder("A", DocumentKind::Actor).await.unwrap();
        let err = store.create_folder("A", DocumentKind::Actor).await.unwrap_err();
        assert!(err.is_already_exists());
        // same name, other kind is a different folder
        store.create_folder("A", DocumentKind::Note).await.unwrap();
        assert_eq!(store.folder_creates(), 2);
    }

    #[tokio::test]
    async fn folder_ensure_coalesces_within_batch() {
        let store = Arc::new(MemoryDocumentStore::new());
        let ctx = ProvisioningContext::new(store.clone());
        let (a, b) = tokio::join!(
            ctx.ensure_folder("Drag Upload: Actors", DocumentKind::Actor),
            ctx.ensure_folder("Drag Upload: Actors", DocumentKind::Actor),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(store.folder_creates(), 1);
        assert!(ctx.resolved("Drag Upload: Actors", DocumentKind::Actor).is_some());
    }

    #[tokio::test]
    async fn racing_batches_share_one_folder() {
        let store = Arc::new(MemoryDocumentStore::new());
        let first = ProvisioningContext::new(store.clone());
        let second = ProvisioningContext::new(store.clone());
        let (a, b) = tokio::join!(
            first.ensure_folder("Handouts", DocumentKind::Note),
            second.ensure_folder("Handouts", DocumentKind::Note),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(store.folders().len(), 1);
    }

    #[tokio::test]
    async fn existing_folder_is_reused() {
        let store = Arc::new(MemoryDocumentStore::new());
        let id = store.create_folder("Handouts", DocumentKind::Note).await.unwrap();
        let ctx = ProvisioningContext::new(store.clone());
        assert_eq!(ctx.ensure_folder("Handouts", DocumentKind::Note).await.unwrap(), id);
        assert_eq!(store.folder_creates(), 1);
    }

    #[tokio::test]
    async fn upload_requires_directory() {
        let store = MemoryAssetStore::new();
        let file = UploadFile {
            name: "a.png".to_string(),
            bytes: Arc::from(vec![0u8; 4]),
            mime: None,
        };
        assert!(store.upload(UploadSource::Data, "x", file.clone()).await.is_err());
        store.create_directory(UploadSource::Data, "x").await.unwrap();
        let asset = store.upload(UploadSource::Data, "x", file).await.unwrap();
        assert_eq!(asset.as_str(), "x/a.png");
        assert_eq!(store.files(), vec![("x/a.png".to_string(), 4)]);
    }
}
