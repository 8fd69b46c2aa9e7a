//! Import configuration
//!
//! Read-only values consumed by the provisioner and orchestrator. Loaded from
//! TOML; every field has a default so partial files work.

use crate::types::DocumentKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Upload backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadSource {
    /// Host user data directory
    #[default]
    Data,
    /// S3-compatible bucket
    S3,
    /// Forge hosted storage
    ForgeVtt,
}

impl fmt::Display for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => f.write_str("data"),
            Self::S3 => f.write_str("s3"),
            Self::ForgeVtt => f.write_str("forgevtt"),
        }
    }
}

/// How items are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ImportMode {
    /// Ask the human about every item, one at a time
    #[default]
    Interactive,
    /// No prompt; every item becomes `kind`
    Direct { kind: DocumentKind },
}

impl ImportMode {
    #[inline]
    #[must_use]
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Interactive)
    }

    /// Kinds a batch may produce under this mode
    #[must_use]
    pub fn target_kinds(self) -> Vec<DocumentKind> {
        match self {
            Self::Interactive => DocumentKind::ALL.to_vec(),
            Self::Direct { kind } => vec![kind],
        }
    }
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Import configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub upload_source: UploadSource,
    /// Root under which per-kind directories are provisioned
    pub storage_root: String,
    /// Display name of the actor grouping folder
    pub actor_folder: String,
    /// Display name of the note grouping folder
    pub note_folder: String,
    /// Per-item diagonal displacement in world units
    pub stagger: f64,
    pub title_case_labels: bool,
    /// Fetch the catalog and suggest matches
    pub match_catalog: bool,
    /// Seed new actors from a same-named catalog entry
    pub use_templates: bool,
    /// Icon used for note pins
    pub note_icon: String,
    pub mode: ImportMode,
}

impl ImportConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&text)
    }

    /// Reject values the pipeline cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        // a zero stagger stacks every item of a batch on one spot
        if !self.stagger.is_finite() || self.stagger <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "stagger must be a positive number, got {}",
                self.stagger
            )));
        }
        if self.actor_folder.trim().is_empty() || self.note_folder.trim().is_empty() {
            return Err(ConfigError::Invalid("folder names must not be blank".to_string()));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_upload_source(mut self, source: UploadSource) -> Self {
        self.upload_source = source;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_title_case(mut self, enabled: bool) -> Self {
        self.title_case_labels = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_catalog_matching(mut self, enabled: bool) -> Self {
        self.match_catalog = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_templates(mut self, enabled: bool) -> Self {
        self.use_templates = enabled;
        self
    }

    /// Folder display name for a kind
    #[must_use]
    pub fn folder_name(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Actor => &self.actor_folder,
            DocumentKind::Note => &self.note_folder,
        }
    }

    /// Storage directory for a kind, e.g. `uploads/dragupload/actors`
    #[must_use]
    pub fn storage_path(&self, kind: DocumentKind) -> String {
        let root = self.storage_root.trim_matches('/');
        if root.is_empty() {
            kind.storage_leaf().to_string()
        } else {
            format!("{root}/{}", kind.storage_leaf())
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            upload_source: UploadSource::Data,
            storage_root: "uploads/dragupload".to_string(),
            actor_folder: "Drag Upload: Actors".to_string(),
            note_folder: "Drag Upload: Handouts".to_string(),
            stagger: 20.0,
            title_case_labels: false,
            match_catalog: true,
            use_templates: true,
            note_icon: "icons/svg/book.svg".to_string(),
            mode: ImportMode::Interactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ImportConfig::new();
        assert_eq!(config.stagger, 20.0);
        assert_eq!(config.folder_name(DocumentKind::Actor), "Drag Upload: Actors");
        assert_eq!(config.storage_path(DocumentKind::Note), "uploads/dragupload/notes");
        assert!(config.mode.is_interactive());
    }

    #[test]
    fn partial_toml() {
        let config = ImportConfig::from_toml_str(
            r#"
            upload_source = "s3"
            stagger = 40.0

            [mode]
            type = "direct"
            kind = "note"
            "#,
        )
        .unwrap();
        assert_eq!(config.upload_source, UploadSource::S3);
        assert_eq!(config.stagger, 40.0);
        assert_eq!(config.mode, ImportMode::Direct { kind: DocumentKind::Note });
        assert_eq!(config.actor_folder, "Drag Upload: Actors");
    }

    #[test]
    fn rejects_negative_stagger() {
        let err = ImportConfig::from_toml_str("stagger = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_stagger() {
        let err = ImportConfig::from_toml_str("stagger = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(ImportConfig::new().with_stagger(0.0).validate().is_err());
        assert!(ImportConfig::new().with_stagger(0.5).validate().is_ok());
    }

    #[test]
    fn storage_path_trims_slashes() {
        let mut config = ImportConfig::new();
        config.storage_root = "/imports/".to_string();
        assert_eq!(config.storage_path(DocumentKind::Actor), "imports/actors");
        config.storage_root = String::new();
        assert_eq!(config.storage_path(DocumentKind::Actor), "actors");
    }

    #[test]
    fn target_kinds_by_mode() {
        assert_eq!(ImportMode::Interactive.target_kinds().len(), 2);
        assert_eq!(
            ImportMode::Direct { kind: DocumentKind::Actor }.target_kinds(),
            vec![DocumentKind::Actor]
        );
    }
}
