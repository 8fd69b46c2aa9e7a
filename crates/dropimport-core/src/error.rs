//! Error types for the drop import pipeline
//!
//! Two layers:
//! - [`ImportError`] aborts a whole batch before side effects begin
//! - [`ItemError`] fails one item; the batch carries on
//!
//! Collaborators report [`StoreError`] and [`PromptError`].

use crate::types::DocumentKind;

/// Batch-level failure
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Viewport transform unusable
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),

    /// Storage path could not be provisioned
    #[error("provisioning failed for {path}: {source}")]
    ProvisioningFailure {
        /// Path that failed
        path: String,
        /// Backend error on the deepest segment
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    /// Whether a retry of the same batch could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProvisioningFailure { .. })
    }
}

/// Per-item failure
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Item had nothing to upload or register
    #[error("item {0} has no usable payload")]
    MissingPayload(String),

    /// Asset upload failed
    #[error("upload of {filename} failed: {source}")]
    UploadFailure {
        filename: String,
        #[source]
        source: StoreError,
    },

    /// Grouping folder could not be found or created
    #[error("folder {name:?} ({kind}) unavailable: {source}")]
    FolderFailure {
        name: String,
        kind: DocumentKind,
        #[source]
        source: StoreError,
    },

    /// Document store rejected the document
    #[error("creating {kind} {name:?} failed: {source}")]
    DocumentCreationFailure {
        name: String,
        kind: DocumentKind,
        #[source]
        source: StoreError,
    },

    /// Document exists but could not be placed on the canvas
    #[error("placing {name:?} failed: {reason}")]
    PlacementFailure { name: String, reason: String },
}

impl ItemError {
    /// Short label for notifications
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingPayload(_) => "missing payload",
            Self::UploadFailure { .. } => "upload failure",
            Self::FolderFailure { .. } => "folder failure",
            Self::DocumentCreationFailure { .. } => "document creation failure",
            Self::PlacementFailure { .. } => "placement failure",
        }
    }
}

/// Error reported by the document or asset store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Target already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Target not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    #[inline]
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Error raised by the interactive prompt itself
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    /// Prompt could not be shown
    #[error("prompt rendering failed: {0}")]
    Rendering(String),

    /// Input channel went away
    #[error("prompt input closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_error_display() {
        let err = ImportError::ProvisioningFailure {
            path: "uploads/dragupload/actors".to_string(),
            source: StoreError::Backend("disk full".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("uploads/dragupload/actors"));
        assert!(text.contains("disk full"));
        assert!(err.is_retryable());
        assert!(!ImportError::InvalidViewport("zero scale".to_string()).is_retryable());
    }

    #[test]
    fn item_error_labels() {
        let err = ItemError::UploadFailure {
            filename: "a.png".to_string(),
            source: StoreError::Backend("timeout".to_string()),
        };
        assert_eq!(err.label(), "upload failure");
        assert!(err.to_string().contains("a.png"));
    }

    #[test]
    fn store_error_already_exists() {
        assert!(StoreError::AlreadyExists("x".to_string()).is_already_exists());
        assert!(!StoreError::NotFound("x".to_string()).is_already_exists());
    }
}
