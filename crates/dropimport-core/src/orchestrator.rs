//! Placement Orchestrator
//!
//! Drives a whole drop batch:
//! - Validates the viewport and snapshots the catalog
//! - Provisions storage paths before any per-item work
//! - Resolves items (one prompt at a time, in arrival order)
//! - Uploads, creates and places each resolved item
//! - Emits exactly one summary

use crate::catalog::Catalog;
use crate::config::{ImportConfig, ImportMode};
use crate::coords::{to_world, Viewport};
use crate::documents::attributes_for;
use crate::error::{ImportError, ItemError};
use crate::folders::ProvisioningContext;
use crate::label::unique_upload_name;
use crate::provision::StorageProvisioner;
use crate::resolver::ImportResolver;
use crate::store::{AssetStore, DocumentStore, Level, Notifier, Prompt};
use crate::summary::{BatchEntry, BatchReport, ItemOutcome};
use crate::types::{
    AssetRef, CreatedDocument, DocumentDraft, DocumentKind, DropBatch, DroppedItem, ItemPayload,
    Placement, ResolutionResult, UploadFile, WorldPoint,
};
use futures::future::join_all;
use std::sync::Arc;

/// External collaborators the orchestrator drives
#[derive(Clone)]
pub struct Collaborators {
    pub documents: Arc<dyn DocumentStore>,
    pub assets: Arc<dyn AssetStore>,
    pub prompt: Arc<dyn Prompt>,
    pub viewport: Arc<dyn Viewport>,
    pub notifier: Arc<dyn Notifier>,
}

/// Hands out per-item offsets in arrival order
#[derive(Debug, Clone)]
pub struct OffsetCounter {
    next: usize,
    stagger: f64,
}

impl OffsetCounter {
    #[inline]
    #[must_use]
    pub fn new(stagger: f64) -> Self {
        Self { next: 0, stagger }
    }

    /// Slot for the next item; each index is issued once
    #[allow(clippy::cast_precision_loss)]
    pub fn advance(&mut self) -> ItemSlot {
        let index = self.next;
        self.next += 1;
        ItemSlot {
            index,
            offset: index as f64 * self.stagger,
        }
    }
}

/// Position of an item within its batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSlot {
    pub index: usize,
    /// Added to both world axes
    pub offset: f64,
}

/// Top-level batch driver
pub struct PlacementOrchestrator {
    config: ImportConfig,
    documents: Arc<dyn DocumentStore>,
    assets: Arc<dyn AssetStore>,
    viewport: Arc<dyn Viewport>,
    notifier: Arc<dyn Notifier>,
    resolver: ImportResolver,
    provisioner: StorageProvisioner,
}

impl PlacementOrchestrator {
    #[must_use]
    pub fn new(config: ImportConfig, collaborators: Collaborators) -> Self {
        let resolver = ImportResolver::new(
            collaborators.prompt,
            collaborators.notifier.clone(),
            config.title_case_labels,
        );
        let provisioner =
            StorageProvisioner::new(collaborators.assets.clone(), config.upload_source);
        Self {
            config,
            documents: collaborators.documents,
            assets: collaborators.assets,
            viewport: collaborators.viewport,
            notifier: collaborators.notifier,
            resolver,
            provisioner,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn provisioner(&self) -> &StorageProvisioner {
        &self.provisioner
    }

    /// Import every item of a drop.
    ///
    /// # Errors
    /// Batch-level failures only (`InvalidViewport`, `ProvisioningFailure`),
    /// raised before any item is touched. Per-item failures are reported in
    /// the returned [`BatchReport`].
    #[tracing::instrument(skip_all, fields(items = batch.items.len(), free = batch.free_placement))]
    pub async fn import_batch(&self, batch: DropBatch) -> Result<BatchReport, ImportError> {
        if batch.items.is_empty() {
            tracing::debug!("empty drop, nothing to import");
            return Ok(BatchReport::default());
        }

        let base = match to_world(self.viewport.as_ref(), batch.screen_point, 0.0) {
            Ok(base) => base,
            Err(e) => return Err(self.abort(e).await),
        };
        tracing::info!(x = base.x, y = base.y, mode = ?self.config.mode, "importing drop");

        let catalog = self.fetch_catalog().await;

        for kind in self.config.mode.target_kinds() {
            let path = self.config.storage_path(kind);
            if let Err(e) = self.provisioner.ensure_path(&path).await {
                return Err(self.abort(e).await);
            }
        }

        let ctx = ProvisioningContext::new(self.documents.clone());
        let entries = match self.config.mode {
            ImportMode::Interactive => self.run_interactive(&batch, &catalog, &ctx).await,
            ImportMode::Direct { kind } => self.run_direct(&batch, &catalog, &ctx, kind).await,
        };

        let report = BatchReport { entries };
        tracing::info!(
            created = report.created().len(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "drop import finished"
        );
        self.notifier.deliver_summary(&report.summary()).await;
        Ok(report)
    }

    /// One prompt at a time; each item completes before the next is offered
    async fn run_interactive(
        &self,
        batch: &DropBatch,
        catalog: &Catalog,
        ctx: &ProvisioningContext,
    ) -> Vec<BatchEntry> {
        let total = batch.items.len();
        let mut counter = OffsetCounter::new(self.config.stagger);
        let mut entries = Vec::with_capacity(total);

        for item in &batch.items {
            let slot = counter.advance();
            let decision = self.resolver.resolve(item, slot.index, total, catalog).await;
            let entry = match decision {
                ResolutionResult::Skip => skipped(item, slot),
                ResolutionResult::Create { kind, final_name } => {
                    self.process_item(item, slot, kind, &final_name, batch, ctx).await
                }
            };
            entries.push(entry);
        }
        entries
    }

    /// No prompts: ensure the shared folder once, then run every item concurrently
    async fn run_direct(
        &self,
        batch: &DropBatch,
        catalog: &Catalog,
        ctx: &ProvisioningContext,
        kind: DocumentKind,
    ) -> Vec<BatchEntry> {
        let mut counter = OffsetCounter::new(self.config.stagger);
        let slots: Vec<ItemSlot> = batch.items.iter().map(|_| counter.advance()).collect();

        if let Err(e) = ctx.ensure_folder(self.config.folder_name(kind), kind).await {
            tracing::warn!(error = %e, "destination folder unavailable, failing every item");
            self.notifier.notify(Level::Error, &e.to_string()).await;
            let reason = e.to_string();
            return batch
                .items
                .iter()
                .zip(slots)
                .map(|(item, slot)| failed(item, slot, reason.clone()))
                .collect();
        }

        let tasks = batch.items.iter().zip(slots).map(|(item, slot)| async move {
            match self.resolver.resolve_direct(item, catalog, kind) {
                ResolutionResult::Create { kind, final_name } => {
                    self.process_item(item, slot, kind, &final_name, batch, ctx).await
                }
                ResolutionResult::Skip => skipped(item, slot),
            }
        });
        join_all(tasks).await
    }

    #[tracing::instrument(skip_all, fields(file = item.original_filename(), index = slot.index, kind = %kind))]
    async fn process_item(
        &self,
        item: &DroppedItem,
        slot: ItemSlot,
        kind: DocumentKind,
        name: &str,
        batch: &DropBatch,
        ctx: &ProvisioningContext,
    ) -> BatchEntry {
        let (document, asset) = match self.create_item(item, slot, kind, name, ctx).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, kind = e.label(), "item failed");
                self.notifier
                    .notify(Level::Error, &format!("{}: {e}", item.original_filename()))
                    .await;
                return failed(item, slot, e.to_string());
            }
        };

        let position = match self.place(&document, &asset, slot, batch).await {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::warn!(error = %e, document = %document.id, "document created but not placed");
                self.notifier
                    .notify(Level::Error, &format!("{}: {e}", item.original_filename()))
                    .await;
                None
            }
        };

        BatchEntry {
            original_filename: item.original_filename().to_string(),
            sequence_index: slot.index,
            position,
            outcome: ItemOutcome::Created {
                placed: position.is_some(),
                document,
            },
        }
    }

    /// Folder, upload and document creation for one item
    async fn create_item(
        &self,
        item: &DroppedItem,
        slot: ItemSlot,
        kind: DocumentKind,
        name: &str,
        ctx: &ProvisioningContext,
    ) -> Result<(CreatedDocument, AssetRef), ItemError> {
        let folder = ctx.ensure_folder(self.config.folder_name(kind), kind).await?;
        let asset = self.store_asset(item, slot, kind).await?;
        tracing::debug!(%asset, "asset stored");

        let template = if kind == DocumentKind::Actor && self.config.use_templates {
            match self.documents.find_template(name).await {
                Ok(template) => template,
                Err(e) => {
                    tracing::warn!(error = %e, "template lookup failed, creating plain actor");
                    let message = format!(
                        "{}: template lookup failed, creating a plain actor: {e}",
                        item.original_filename()
                    );
                    self.notifier.notify(Level::Warn, &message).await;
                    None
                }
            }
        } else {
            None
        };

        let draft = DocumentDraft {
            kind,
            name: name.to_string(),
            folder,
            attributes: attributes_for(kind, name, &asset, template),
        };
        // an uploaded asset stays in place if this fails
        let document = self
            .documents
            .create_document(draft)
            .await
            .map_err(|source| ItemError::DocumentCreationFailure {
                name: name.to_string(),
                kind,
                source,
            })?;
        tracing::info!(id = %document.id, name = %document.name, "document created");
        Ok((document, asset))
    }

    async fn store_asset(
        &self,
        item: &DroppedItem,
        slot: ItemSlot,
        kind: DocumentKind,
    ) -> Result<AssetRef, ItemError> {
        match item.payload() {
            ItemPayload::ExternalUrl(url) if url.trim().is_empty() => Err(
                ItemError::MissingPayload(item.original_filename().to_string()),
            ),
            ItemPayload::ExternalUrl(url) => Ok(AssetRef(url.clone())),
            ItemPayload::Bytes(bytes) => {
                let file = UploadFile {
                    name: unique_upload_name(
                        item.original_filename(),
                        chrono::Utc::now().timestamp_millis(),
                        slot.index,
                    ),
                    bytes: bytes.clone(),
                    mime: item.mime_hint().map(str::to_string),
                };
                self.assets
                    .upload(self.config.upload_source, &self.config.storage_path(kind), file)
                    .await
                    .map_err(|source| ItemError::UploadFailure {
                        filename: item.original_filename().to_string(),
                        source,
                    })
            }
        }
    }

    /// World position for a slot: drop point plus offset, snapped unless placing freely
    fn position_for(&self, slot: ItemSlot, batch: &DropBatch) -> Result<WorldPoint, ImportError> {
        let point = to_world(self.viewport.as_ref(), batch.screen_point, slot.offset)?;
        Ok(if batch.free_placement {
            point
        } else {
            self.viewport.snap(point)
        })
    }

    async fn place(
        &self,
        document: &CreatedDocument,
        asset: &AssetRef,
        slot: ItemSlot,
        batch: &DropBatch,
    ) -> Result<WorldPoint, ItemError> {
        let position = self
            .position_for(slot, batch)
            .map_err(|e| ItemError::PlacementFailure {
                name: document.name.clone(),
                reason: e.to_string(),
            })?;

        let placement = match document.kind {
            DocumentKind::Actor => Placement::Token {
                document: document.id.clone(),
                name: document.name.clone(),
                texture: asset.clone(),
                position,
            },
            DocumentKind::Note => Placement::Note {
                document: document.id.clone(),
                icon: self.config.note_icon.clone(),
                position,
            },
        };

        self.documents
            .place(placement)
            .await
            .map_err(|e| ItemError::PlacementFailure {
                name: document.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(position)
    }

    async fn fetch_catalog(&self) -> Catalog {
        if !self.config.match_catalog {
            return Catalog::default();
        }
        match self.documents.catalog_names().await {
            Ok(names) => {
                let catalog = Catalog::from_names(names);
                tracing::debug!(entries = catalog.len(), "catalog snapshot taken");
                catalog
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog unavailable, continuing without matches");
                self.notifier
                    .notify(Level::Warn, &format!("Catalog unavailable, names will not be matched: {e}"))
                    .await;
                Catalog::default()
            }
        }
    }

    async fn abort(&self, error: ImportError) -> ImportError {
        tracing::error!(error = %error, "drop import aborted");
        self.notifier
            .notify(Level::Error, &format!("Drop import aborted: {error}"))
            .await;
        error
    }
}

impl std::fmt::Debug for PlacementOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementOrchestrator")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("provisioner", &self.provisioner)
            .finish_non_exhaustive()
    }
}

fn skipped(item: &DroppedItem, slot: ItemSlot) -> BatchEntry {
    BatchEntry {
        original_filename: item.original_filename().to_string(),
        sequence_index: slot.index,
        position: None,
        outcome: ItemOutcome::Skipped,
    }
}

fn failed(item: &DroppedItem, slot: ItemSlot, reason: String) -> BatchEntry {
    BatchEntry {
        original_filename: item.original_filename().to_string(),
        sequence_index: slot.index,
        position: None,
        outcome: ItemOutcome::Failed { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn counter_issues_each_index_once() {
        let mut counter = OffsetCounter::new(20.0);
        let slots: Vec<_> = (0..3).map(|_| counter.advance()).collect();
        assert_eq!(slots[0], ItemSlot { index: 0, offset: 0.0 });
        assert_eq!(slots[1], ItemSlot { index: 1, offset: 20.0 });
        assert_eq!(slots[2], ItemSlot { index: 2, offset: 40.0 });
    }

    proptest! {
        #[test]
        fn prop_offsets_are_distinct(n in 1usize..64, stagger in 0.5f64..500.0) {
            let mut counter = OffsetCounter::new(stagger);
            let offsets: Vec<f64> = (0..n).map(|_| counter.advance().offset).collect();
            for pair in offsets.windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
        }
    }
}
