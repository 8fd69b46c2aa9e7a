//! Core types for the drop import pipeline
//!
//! Defines the data flowing through a batch:
//! - Dropped items and their payloads
//! - Resolution requests and results
//! - World-space coordinates and placements
//! - Identifiers handed back by the document store

use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of document an item is imported as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Actor-like record, placed as a token
    Actor,
    /// Note/handout record, placed as a pin
    Note,
}

impl DocumentKind {
    /// All kinds, in a stable order
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Actor, DocumentKind::Note];

    /// Kind suggested for a mime hint. Images become actors, anything else a note.
    #[must_use]
    pub fn suggested_for(mime_hint: Option<&str>) -> Self {
        match mime_hint {
            Some(mime) if mime.starts_with("image/") => Self::Actor,
            Some(_) => Self::Note,
            None => Self::Actor,
        }
    }

    /// Leaf directory name under the storage root
    #[inline]
    #[must_use]
    pub fn storage_leaf(self) -> &'static str {
        match self {
            Self::Actor => "actors",
            Self::Note => "notes",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actor => f.write_str("Actor"),
            Self::Note => f.write_str("Note"),
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "actor" => Ok(Self::Actor),
            "note" | "journal" | "handout" => Ok(Self::Note),
            other => Err(format!("unknown document kind: {other}")),
        }
    }
}

/// Content of a dropped item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPayload {
    /// Raw file bytes
    Bytes(Arc<[u8]>),
    /// Reference to an externally hosted asset
    ExternalUrl(String),
}

/// A single item delivered by a drop gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedItem {
    payload: ItemPayload,
    original_filename: String,
    mime_hint: Option<String>,
}

impl DroppedItem {
    /// Item carrying raw bytes
    #[must_use]
    pub fn from_bytes(
        original_filename: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        mime_hint: Option<String>,
    ) -> Self {
        let original_filename = original_filename.into();
        let mime_hint = mime_hint.or_else(|| mime_from_filename(&original_filename));
        Self {
            payload: ItemPayload::Bytes(bytes.into()),
            original_filename,
            mime_hint,
        }
    }

    /// Item referencing an external URL; the filename is inferred from the
    /// last path segment.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let original_filename = filename_from_url(&url);
        let mime_hint = mime_from_filename(&original_filename);
        Self {
            payload: ItemPayload::ExternalUrl(url),
            original_filename,
            mime_hint,
        }
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> &ItemPayload {
        &self.payload
    }

    #[inline]
    #[must_use]
    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    #[inline]
    #[must_use]
    pub fn mime_hint(&self) -> Option<&str> {
        self.mime_hint.as_deref()
    }
}

fn filename_from_url(url: &str) -> String {
    let without_suffix = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let after_scheme = without_suffix
        .split_once("://")
        .map_or(without_suffix, |(_, rest)| rest);
    match after_scheme.split_once('/') {
        Some((_, path)) => path
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("asset")
            .to_string(),
        None => "asset".to_string(),
    }
}

fn mime_from_filename(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "webm" => "video/webm",
        "mp4" => "video/mp4",
        _ => return None,
    };
    Some(mime.to_string())
}

/// A point in screen space (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in world (scene) space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// All items delivered by a single drop gesture
#[derive(Debug, Clone)]
pub struct DropBatch {
    /// Items in arrival order
    pub items: Vec<DroppedItem>,
    /// Where the drop happened
    pub screen_point: ScreenPoint,
    /// Disable grid snapping for the whole batch
    pub free_placement: bool,
}

impl DropBatch {
    #[must_use]
    pub fn new(items: Vec<DroppedItem>, screen_point: ScreenPoint) -> Self {
        Self {
            items,
            screen_point,
            free_placement: false,
        }
    }

    /// Batch for a drop that carried a single external reference
    #[must_use]
    pub fn from_url(url: impl Into<String>, screen_point: ScreenPoint) -> Self {
        Self::new(vec![DroppedItem::from_url(url)], screen_point)
    }

    /// With the free placement modifier
    #[inline]
    #[must_use]
    pub fn with_free_placement(mut self, free: bool) -> Self {
        self.free_placement = free;
        self
    }
}

/// Whether the prompt is about to reuse a catalog identity or mint a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameAffordance {
    /// Seeded name comes from the catalog
    ExistingEntry,
    /// Seeded name was derived from the filename
    NewEntry,
}

/// Everything the prompt needs to ask about one item
#[derive(Debug, Clone)]
pub struct ResolutionRequest<'a> {
    pub item: &'a DroppedItem,
    /// Label derived from the filename
    pub suggested_name: String,
    pub matched_catalog_name: Option<String>,
    pub sequence_index: usize,
    pub batch_size: usize,
    /// Kind preselected in the prompt
    pub default_kind: DocumentKind,
    /// Candidate names for autocompletion
    pub candidates: &'a Catalog,
}

impl ResolutionRequest<'_> {
    /// Name the prompt input is seeded with
    #[inline]
    #[must_use]
    pub fn initial_name(&self) -> &str {
        self.matched_catalog_name
            .as_deref()
            .unwrap_or(&self.suggested_name)
    }

    #[inline]
    #[must_use]
    pub fn affordance(&self) -> NameAffordance {
        if self.matched_catalog_name.is_some() {
            NameAffordance::ExistingEntry
        } else {
            NameAffordance::NewEntry
        }
    }

    /// Title shown on the prompt, e.g. `Import 1/3: orc_boss.png`
    #[must_use]
    pub fn title(&self) -> String {
        format!(
            "Import {}/{}: {}",
            self.sequence_index + 1,
            self.batch_size,
            self.item.original_filename()
        )
    }
}

/// What the human answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Picked a kind and confirmed a name
    Chosen { kind: DocumentKind, name: String },
    /// Pressed skip
    Skipped,
    /// Closed the prompt without choosing
    Dismissed,
}

/// Final decision for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Skip,
    Create {
        kind: DocumentKind,
        final_name: String,
    },
}

impl ResolutionResult {
    #[inline]
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }
}

/// Identifier of a document in the document store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a grouping folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderId(pub String);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable reference to a stored asset (URL or path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef(pub String);

impl AssetRef {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document created by the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDocument {
    pub id: DocumentId,
    pub name: String,
    pub kind: DocumentKind,
}

/// Blob handed to the asset store
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Unique name the blob is stored under
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub mime: Option<String>,
}

/// Draft of a document to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub kind: DocumentKind,
    pub name: String,
    pub folder: FolderId,
    /// Host-specific attribute payload
    pub attributes: serde_json::Value,
}

/// Visual representation placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Placement {
    /// Token linked to an actor
    Token {
        document: DocumentId,
        name: String,
        texture: AssetRef,
        position: WorldPoint,
    },
    /// Pin linked to a note
    Note {
        document: DocumentId,
        icon: String,
        position: WorldPoint,
    },
}

impl Placement {
    #[inline]
    #[must_use]
    pub fn position(&self) -> WorldPoint {
        match self {
            Self::Token { position, .. } | Self::Note { position, .. } => *position,
        }
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &DocumentId {
        match self {
            Self::Token { document, .. } | Self::Note { document, .. } => document,
        }
    }
}
