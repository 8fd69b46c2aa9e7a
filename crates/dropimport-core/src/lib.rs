//! Drop Import Core
//!
//! Turns a drop gesture into documents on a canvas:
//! - Maps the drop point from screen to world space
//! - Suggests names from a catalog snapshot
//! - Provisions storage paths exactly once, even under concurrency
//! - Asks a human about each item, one at a time
//! - Uploads, creates and places items with a diagonal stagger
//!
//! # Example
//!
//! ```rust,ignore
//! use dropimport_core::prelude::*;
//!
//! # async fn example(collaborators: Collaborators) -> Result<(), ImportError> {
//! let orchestrator = PlacementOrchestrator::new(ImportConfig::new(), collaborators);
//!
//! let batch = DropBatch::new(
//!     vec![DroppedItem::from_bytes("orc_boss.png", bytes, None)],
//!     ScreenPoint::new(640.0, 360.0),
//! );
//! let report = orchestrator.import_batch(batch).await?;
//! println!("created {} documents", report.created().len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod catalog;
pub mod config;
pub mod coords;
pub mod documents;
pub mod error;
pub mod folders;
pub mod label;
pub mod memory;
pub mod orchestrator;
pub mod provision;
pub mod resolver;
pub mod store;
pub mod summary;
pub mod types;

// Re-exports for convenience
pub use catalog::{find_best_match, Catalog};
pub use config::{ConfigError, ImportConfig, ImportMode, UploadSource};
pub use coords::{to_world, GridViewport, ViewTransform, Viewport};
pub use error::{ImportError, ItemError, PromptError, StoreError};
pub use folders::{FolderKey, ProvisioningContext};
pub use orchestrator::{Collaborators, ItemSlot, OffsetCounter, PlacementOrchestrator};
pub use provision::StorageProvisioner;
pub use resolver::{ImportResolver, ResolutionState};
pub use store::{AssetStore, DirectoryStatus, DocumentStore, Level, Notifier, Prompt};
pub use summary::{BatchEntry, BatchReport, BatchSummary, ItemOutcome, SummaryLine};
pub use types::{
    AssetRef, CreatedDocument, DocumentDraft, DocumentId, DocumentKind, DropBatch, DroppedItem,
    FolderId, ItemPayload, NameAffordance, Placement, PromptAnswer, ResolutionRequest,
    ResolutionResult, ScreenPoint, UploadFile, WorldPoint,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring up a drop import
    pub use crate::{
        AssetStore, BatchReport, Collaborators, DocumentKind, DocumentStore, DropBatch,
        DroppedItem, ImportConfig, ImportError, ImportMode, Notifier, PlacementOrchestrator,
        Prompt, PromptAnswer, ResolutionRequest, ScreenPoint, Viewport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
