//! Batch outcomes and the single end-of-batch summary

use crate::types::{CreatedDocument, DocumentId, WorldPoint};
use std::fmt::Write as _;

/// What happened to one item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Document created; `placed` is false if the canvas placement failed
    Created {
        document: CreatedDocument,
        placed: bool,
    },
    Skipped,
    /// Failed before a document existed
    Failed { reason: String },
}

/// Outcome of one item, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub original_filename: String,
    pub sequence_index: usize,
    /// Final position, when placed
    pub position: Option<WorldPoint>,
    pub outcome: ItemOutcome,
}

impl BatchEntry {
    #[inline]
    #[must_use]
    pub fn document(&self) -> Option<&CreatedDocument> {
        match &self.outcome {
            ItemOutcome::Created { document, .. } => Some(document),
            _ => None,
        }
    }
}

/// Ordered outcomes of a whole batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// `(original filename, created document id)` pairs in arrival order
    #[must_use]
    pub fn results(&self) -> Vec<(&str, Option<&DocumentId>)> {
        self.entries
            .iter()
            .map(|e| (e.original_filename.as_str(), e.document().map(|d| &d.id)))
            .collect()
    }

    #[must_use]
    pub fn created(&self) -> Vec<&CreatedDocument> {
        self.entries.iter().filter_map(BatchEntry::document).collect()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, ItemOutcome::Skipped))
            .count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, ItemOutcome::Failed { .. }))
            .count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_report(self)
    }
}

/// One line of the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub original_filename: String,
    pub document: CreatedDocument,
    pub placed: bool,
}

/// Message delivered once per batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub lines: Vec<SummaryLine>,
    pub total: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_report(report: &BatchReport) -> Self {
        let lines = report
            .entries
            .iter()
            .filter_map(|e| match &e.outcome {
                ItemOutcome::Created { document, placed } => Some(SummaryLine {
                    original_filename: e.original_filename.clone(),
                    document: document.clone(),
                    placed: *placed,
                }),
                _ => None,
            })
            .collect();
        Self {
            lines,
            total: report.entries.len(),
            skipped: report.skipped_count(),
            failed: report.failed_count(),
        }
    }

    /// Human-readable message referencing every created document by id
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!(
            "Drop import complete: {} of {} created",
            self.lines.len(),
            self.total
        );
        if self.skipped > 0 {
            let _ = write!(out, ", {} skipped", self.skipped);
        }
        if self.failed > 0 {
            let _ = write!(out, ", {} failed", self.failed);
        }
        for line in &self.lines {
            let _ = write!(
                out,
                "\n- {} -> @{}[{}]{{{}}}",
                line.original_filename, line.document.kind, line.document.id, line.document.name
            );
            if !line.placed {
                out.push_str(" (not placed)");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentKind;

    fn created(id: &str, name: &str) -> ItemOutcome {
        ItemOutcome::Created {
            document: CreatedDocument {
                id: DocumentId(id.to_string()),
                name: name.to_string(),
                kind: DocumentKind::Actor,
            },
            placed: true,
        }
    }

    fn entry(idx: usize, file: &str, outcome: ItemOutcome) -> BatchEntry {
        BatchEntry {
            original_filename: file.to_string(),
            sequence_index: idx,
            position: None,
            outcome,
        }
    }

    #[test]
    fn results_keep_order_and_nulls() {
        let report = BatchReport {
            entries: vec![
                entry(0, "a.png", created("1", "a")),
                entry(1, "b.png", ItemOutcome::Skipped),
                entry(2, "c.png", ItemOutcome::Failed { reason: "upload failure".into() }),
            ],
        };
        let results = report.results();
        assert_eq!(results[0], ("a.png", Some(&DocumentId("1".to_string()))));
        assert_eq!(results[1], ("b.png", None));
        assert_eq!(results[2], ("c.png", None));
        assert_eq!(report.created().len(), 1);
    }

    #[test]
    fn render_lists_created_documents() {
        let report = BatchReport {
            entries: vec![
                entry(0, "orc_boss.png", created("id1", "orc boss")),
                entry(1, "x.png", ItemOutcome::Skipped),
            ],
        };
        let text = report.summary().render();
        assert!(text.starts_with("Drop import complete: 1 of 2 created, 1 skipped"));
        assert!(text.contains("orc_boss.png -> @Actor[id1]{orc boss}"));
        assert!(!text.contains("x.png"));
    }
}
