//! Collaborator interfaces
//!
//! The pipeline never talks to a host directly. Everything it needs from the
//! outside world goes through these traits.

use crate::config::UploadSource;
use crate::error::{PromptError, StoreError};
use crate::summary::BatchSummary;
use crate::types::{
    AssetRef, CreatedDocument, DocumentDraft, DocumentId, DocumentKind, FolderId, Placement,
    PromptAnswer, ResolutionRequest, UploadFile,
};

/// Result of a directory creation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStatus {
    Created,
    AlreadyExists,
}

/// Blob storage
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Create one directory. Parents are not created implicitly.
    async fn create_directory(
        &self,
        source: UploadSource,
        path: &str,
    ) -> Result<DirectoryStatus, StoreError>;

    /// Store `file` under `directory`, returning a stable reference
    async fn upload(
        &self,
        source: UploadSource,
        directory: &str,
        file: UploadFile,
    ) -> Result<AssetRef, StoreError>;
}

/// Document persistence and canvas placement
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of all catalog entries. May contain duplicates.
    async fn catalog_names(&self) -> Result<Vec<String>, StoreError>;

    /// Attributes of the catalog entry named `name` (case-insensitive), if any
    async fn find_template(&self, name: &str)
        -> Result<Option<serde_json::Value>, StoreError>;

    async fn find_folder(
        &self,
        name: &str,
        kind: DocumentKind,
    ) -> Result<Option<FolderId>, StoreError>;

    /// Create a folder. Returns `StoreError::AlreadyExists` on a duplicate.
    async fn create_folder(&self, name: &str, kind: DocumentKind) -> Result<FolderId, StoreError>;

    async fn create_document(&self, draft: DocumentDraft) -> Result<CreatedDocument, StoreError>;

    /// Put a token or pin on the canvas
    async fn place(&self, placement: Placement) -> Result<DocumentId, StoreError>;
}

/// Human in the loop
#[async_trait::async_trait]
pub trait Prompt: Send + Sync {
    /// Ask about one item. Only one call is outstanding at a time.
    async fn ask(&self, request: &ResolutionRequest<'_>) -> Result<PromptAnswer, PromptError>;
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// User-facing notifications
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, level: Level, message: &str);

    /// Deliver the batch summary privately to the initiating user
    async fn deliver_summary(&self, summary: &BatchSummary);
}
