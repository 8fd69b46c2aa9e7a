//! Per-item resolution: filename label, catalog suggestion, human decision
//!
//! Each item moves `Pending -> AwaitingHuman -> Resolved`. The prompt's
//! answer is the only input that can produce `Create`; dismissal and prompt
//! errors both resolve to `Skip` and never reach the batch.

use crate::catalog::Catalog;
use crate::label::derive_label;
use crate::store::{Level, Notifier, Prompt};
use crate::types::{DocumentKind, DroppedItem, PromptAnswer, ResolutionRequest, ResolutionResult};
use std::sync::Arc;

/// Where an item is in its resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Pending,
    AwaitingHuman,
    Resolved(ResolutionResult),
}

/// Resolves dropped items into create/skip decisions
pub struct ImportResolver {
    prompt: Arc<dyn Prompt>,
    notifier: Arc<dyn Notifier>,
    title_case: bool,
}

impl ImportResolver {
    #[must_use]
    pub fn new(prompt: Arc<dyn Prompt>, notifier: Arc<dyn Notifier>, title_case: bool) -> Self {
        Self {
            prompt,
            notifier,
            title_case,
        }
    }

    /// Label for `item`; the raw filename when nothing readable is left
    #[must_use]
    pub fn label_for(&self, item: &DroppedItem) -> String {
        let label = derive_label(item.original_filename(), self.title_case);
        if label.trim().is_empty() {
            item.original_filename().to_string()
        } else {
            label
        }
    }

    /// Build the request shown to the human for `item`
    #[must_use]
    pub fn prepare<'a>(
        &self,
        item: &'a DroppedItem,
        sequence_index: usize,
        batch_size: usize,
        catalog: &'a Catalog,
    ) -> ResolutionRequest<'a> {
        let suggested_name = self.label_for(item);
        let matched_catalog_name = catalog.best_match(&suggested_name).map(str::to_string);
        ResolutionRequest {
            item,
            suggested_name,
            matched_catalog_name,
            sequence_index,
            batch_size,
            default_kind: DocumentKind::suggested_for(item.mime_hint()),
            candidates: catalog,
        }
    }

    /// Ask the human about `item` and wait for the answer
    #[tracing::instrument(skip_all, fields(file = item.original_filename(), index = sequence_index))]
    pub async fn resolve(
        &self,
        item: &DroppedItem,
        sequence_index: usize,
        batch_size: usize,
        catalog: &Catalog,
    ) -> ResolutionResult {
        let request = self.prepare(item, sequence_index, batch_size, catalog);
        tracing::debug!(
            state = ?ResolutionState::Pending,
            suggested = %request.suggested_name,
            matched = ?request.matched_catalog_name,
            "prepared resolution request"
        );
        tracing::debug!(state = ?ResolutionState::AwaitingHuman, title = %request.title(), "prompting");

        let result = match self.prompt.ask(&request).await {
            Ok(PromptAnswer::Chosen { kind, name }) => {
                let trimmed = name.trim();
                let final_name = if trimmed.is_empty() {
                    request.initial_name().to_string()
                } else {
                    trimmed.to_string()
                };
                ResolutionResult::Create { kind, final_name }
            }
            Ok(PromptAnswer::Skipped) => ResolutionResult::Skip,
            Ok(PromptAnswer::Dismissed) => {
                tracing::debug!("prompt dismissed, skipping item");
                ResolutionResult::Skip
            }
            Err(e) => {
                tracing::error!(error = %e, "prompt failed, skipping item");
                self.notifier
                    .notify(
                        Level::Error,
                        &format!("{}: prompt failed, item skipped: {e}", item.original_filename()),
                    )
                    .await;
                ResolutionResult::Skip
            }
        };

        tracing::debug!(state = ?ResolutionState::Resolved(result.clone()), "resolved");
        result
    }

    /// Resolve without a human: the catalog match, or the label, as `kind`
    #[must_use]
    pub fn resolve_direct(
        &self,
        item: &DroppedItem,
        catalog: &Catalog,
        kind: DocumentKind,
    ) -> ResolutionResult {
        let label = self.label_for(item);
        let final_name = catalog
            .best_match(&label)
            .map_or(label.clone(), str::to_string);
        ResolutionResult::Create { kind, final_name }
    }
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("title_case", &self.title_case)
            .finish_non_exhaustive()
    }
}
