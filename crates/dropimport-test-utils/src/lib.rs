//! Testing utilities for the drop import workspace
//!
//! Scripted collaborators, failure-injecting store wrappers and a harness
//! that wires them into a [`PlacementOrchestrator`].

#![allow(missing_docs)]

use dropimport_core::memory::{MemoryAssetStore, MemoryDocumentStore};
use dropimport_core::{
    AssetRef, AssetStore, BatchSummary, Collaborators, CreatedDocument, DirectoryStatus,
    DocumentDraft, DocumentId, DocumentKind, DocumentStore, DroppedItem, FolderId, GridViewport,
    ImportConfig, Level, NameAffordance, Notifier, Placement, PlacementOrchestrator, Prompt,
    PromptAnswer, PromptError, ResolutionRequest, StoreError, UploadFile, UploadSource,
    ViewTransform,
};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What the prompt was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub title: String,
    pub suggested_name: String,
    pub matched_catalog_name: Option<String>,
    pub affordance: NameAffordance,
    pub sequence_index: usize,
    pub batch_size: usize,
    pub default_kind: DocumentKind,
    pub candidates: Vec<String>,
}

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply {
    /// Accept the seeded name as `kind`
    Accept(DocumentKind),
    /// Answer exactly this
    Answer(PromptAnswer),
    /// Fail the prompt
    Fail(PromptError),
}

/// Prompt replying from a script; when the script runs out it dismisses
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    outstanding: AtomicUsize,
    max_outstanding: AtomicUsize,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Accept every item as `kind`, `count` times
    #[must_use]
    pub fn accepting(kind: DocumentKind, count: usize) -> Self {
        Self::new(std::iter::repeat(Reply::Accept(kind)).take(count))
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Highest number of prompts that were open at the same time
    #[must_use]
    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Prompt for ScriptedPrompt {
    async fn ask(&self, request: &ResolutionRequest<'_>) -> Result<PromptAnswer, PromptError> {
        let open = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_outstanding.fetch_max(open, Ordering::SeqCst);

        self.requests.lock().push(RecordedRequest {
            title: request.title(),
            suggested_name: request.suggested_name.clone(),
            matched_catalog_name: request.matched_catalog_name.clone(),
            affordance: request.affordance(),
            sequence_index: request.sequence_index,
            batch_size: request.batch_size,
            default_kind: request.default_kind,
            candidates: request.candidates.names().to_vec(),
        });

        // a human takes a while
        tokio::task::yield_now().await;

        let reply = self.replies.lock().pop_front();
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        match reply {
            Some(Reply::Accept(kind)) => Ok(PromptAnswer::Chosen {
                kind,
                name: request.initial_name().to_string(),
            }),
            Some(Reply::Answer(answer)) => Ok(answer),
            Some(Reply::Fail(e)) => Err(e),
            None => Ok(PromptAnswer::Dismissed),
        }
    }
}

/// Notifier that keeps everything it was told
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Level, String)>>,
    summaries: Mutex<Vec<BatchSummary>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().clone()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<BatchSummary> {
        self.summaries.lock().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, level: Level, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }

    async fn deliver_summary(&self, summary: &BatchSummary) {
        self.summaries.lock().push(summary.clone());
    }
}

/// Asset store that fails uploads or directories on demand
#[derive(Debug, Default)]
pub struct FlakyAssetStore {
    pub inner: MemoryAssetStore,
    /// Uploads whose name contains any of these fail
    fail_uploads: Mutex<HashSet<String>>,
    /// Directories that fail to be created
    fail_directories: Mutex<HashSet<String>>,
}

impl FlakyAssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads_containing(&self, fragment: &str) {
        self.fail_uploads.lock().insert(fragment.to_string());
    }

    pub fn fail_directory(&self, path: &str) {
        self.fail_directories.lock().insert(path.to_string());
    }

    pub fn heal(&self) {
        self.fail_uploads.lock().clear();
        self.fail_directories.lock().clear();
    }
}

#[async_trait::async_trait]
impl AssetStore for FlakyAssetStore {
    async fn create_directory(
        &self,
        source: UploadSource,
        path: &str,
    ) -> Result<DirectoryStatus, StoreError> {
        if self.fail_directories.lock().contains(path) {
            return Err(StoreError::Backend(format!("permission denied: {path}")));
        }
        self.inner.create_directory(source, path).await
    }

    async fn upload(
        &self,
        source: UploadSource,
        directory: &str,
        file: UploadFile,
    ) -> Result<AssetRef, StoreError> {
        let rejected = self
            .fail_uploads
            .lock()
            .iter()
            .any(|fragment| file.name.contains(fragment.as_str()));
        if rejected {
            return Err(StoreError::Backend(format!("upload rejected: {}", file.name)));
        }
        self.inner.upload(source, directory, file).await
    }
}

/// Document store that fails selected operations
#[derive(Debug, Default)]
pub struct FlakyDocumentStore {
    pub inner: MemoryDocumentStore,
    fail_documents: Mutex<HashSet<String>>,
    fail_catalog: Mutex<bool>,
    fail_templates: Mutex<bool>,
    fail_placements: Mutex<bool>,
}

impl FlakyDocumentStore {
    #[must_use]
    pub fn new(inner: MemoryDocumentStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Reject documents with this exact name
    pub fn fail_document(&self, name: &str) {
        self.fail_documents.lock().insert(name.to_string());
    }

    pub fn fail_catalog(&self) {
        *self.fail_catalog.lock() = true;
    }

    pub fn fail_templates(&self) {
        *self.fail_templates.lock() = true;
    }

    pub fn fail_placements(&self) {
        *self.fail_placements.lock() = true;
    }
}

#[async_trait::async_trait]
impl DocumentStore for FlakyDocumentStore {
    async fn catalog_names(&self) -> Result<Vec<String>, StoreError> {
        if *self.fail_catalog.lock() {
            return Err(StoreError::Backend("index unavailable".to_string()));
        }
        self.inner.catalog_names().await
    }

    async fn find_template(&self, name: &str) -> Result<Option<serde_json::Value>, StoreError> {
        if *self.fail_templates.lock() {
            return Err(StoreError::Backend("template index unavailable".to_string()));
        }
        self.inner.find_template(name).await
    }

    async fn find_folder(
        &self,
        name: &str,
        kind: DocumentKind,
    ) -> Result<Option<FolderId>, StoreError> {
        self.inner.find_folder(name, kind).await
    }

    async fn create_folder(&self, name: &str, kind: DocumentKind) -> Result<FolderId, StoreError> {
        self.inner.create_folder(name, kind).await
    }

    async fn create_document(&self, draft: DocumentDraft) -> Result<CreatedDocument, StoreError> {
        if self.fail_documents.lock().contains(&draft.name) {
            return Err(StoreError::Backend(format!("validation failed for {}", draft.name)));
        }
        self.inner.create_document(draft).await
    }

    async fn place(&self, placement: Placement) -> Result<DocumentId, StoreError> {
        if *self.fail_placements.lock() {
            return Err(StoreError::Backend("scene is locked".to_string()));
        }
        self.inner.place(placement).await
    }
}

/// Orchestrator wired to inspectable collaborators
pub struct Harness {
    pub orchestrator: PlacementOrchestrator,
    pub documents: Arc<FlakyDocumentStore>,
    pub assets: Arc<FlakyAssetStore>,
    pub prompt: Arc<ScriptedPrompt>,
    pub notifier: Arc<RecordingNotifier>,
    pub viewport: Arc<GridViewport>,
}

impl Harness {
    /// Identity viewport with a 100-unit grid, empty catalog
    #[must_use]
    pub fn new(config: ImportConfig, prompt: ScriptedPrompt) -> Self {
        Self::with_parts(
            config,
            prompt,
            MemoryDocumentStore::new(),
            GridViewport::new(ViewTransform::identity(), 100.0),
        )
    }

    #[must_use]
    pub fn with_parts(
        config: ImportConfig,
        prompt: ScriptedPrompt,
        documents: MemoryDocumentStore,
        viewport: GridViewport,
    ) -> Self {
        let documents = Arc::new(FlakyDocumentStore::new(documents));
        let assets = Arc::new(FlakyAssetStore::new());
        let prompt = Arc::new(prompt);
        let notifier = Arc::new(RecordingNotifier::new());
        let viewport = Arc::new(viewport);
        let orchestrator = PlacementOrchestrator::new(
            config,
            Collaborators {
                documents: documents.clone(),
                assets: assets.clone(),
                prompt: prompt.clone(),
                viewport: viewport.clone(),
                notifier: notifier.clone(),
            },
        );
        Self {
            orchestrator,
            documents,
            assets,
            prompt,
            notifier,
            viewport,
        }
    }
}

/// Image item with a few bytes of content
#[must_use]
pub fn image(name: &str) -> DroppedItem {
    DroppedItem::from_bytes(name, vec![0x89, b'P', b'N', b'G'], None)
}
