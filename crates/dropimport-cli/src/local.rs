//! Asset store backed by a local directory

use dropimport_core::{AssetRef, AssetStore, DirectoryStatus, StoreError, UploadFile, UploadSource};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writes uploads below `root`, one directory level at a time
#[derive(Debug, Clone)]
pub(crate) struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

fn store_error(path: &Path, e: &std::io::Error) -> StoreError {
    let message = format!("{}: {e}", path.display());
    match e.kind() {
        ErrorKind::AlreadyExists => StoreError::AlreadyExists(message),
        ErrorKind::NotFound => StoreError::NotFound(message),
        _ => StoreError::Backend(message),
    }
}

#[async_trait::async_trait]
impl AssetStore for LocalAssetStore {
    async fn create_directory(
        &self,
        source: UploadSource,
        path: &str,
    ) -> Result<DirectoryStatus, StoreError> {
        let target = self.resolve(path);
        tracing::debug!(%source, dir = %target.display(), "create directory");
        match tokio::fs::create_dir(&target).await {
            Ok(()) => Ok(DirectoryStatus::Created),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(DirectoryStatus::AlreadyExists),
            Err(e) => Err(store_error(&target, &e)),
        }
    }

    async fn upload(
        &self,
        source: UploadSource,
        directory: &str,
        file: UploadFile,
    ) -> Result<AssetRef, StoreError> {
        let dir = self.resolve(directory);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Err(StoreError::NotFound(format!("{}", dir.display())));
        }
        let target = dir.join(&file.name);
        tokio::fs::write(&target, &file.bytes[..])
            .await
            .map_err(|e| store_error(&target, &e))?;
        tracing::debug!(%source, file = %target.display(), bytes = file.bytes.len(), "uploaded");
        Ok(AssetRef(format!("{}/{}", directory.trim_matches('/'), file.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn directories_need_their_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(tmp.path());

        let err = store
            .create_directory(UploadSource::Data, "uploads/dragupload")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        assert_eq!(
            store.create_directory(UploadSource::Data, "uploads").await.unwrap(),
            DirectoryStatus::Created
        );
        assert_eq!(
            store.create_directory(UploadSource::Data, "uploads").await.unwrap(),
            DirectoryStatus::AlreadyExists
        );
    }

    #[tokio::test]
    async fn upload_writes_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(tmp.path());
        store.create_directory(UploadSource::Data, "actors").await.unwrap();

        let asset = store
            .upload(
                UploadSource::Data,
                "actors",
                UploadFile {
                    name: "orc_1_0.png".to_string(),
                    bytes: Arc::from(vec![1u8, 2, 3]),
                    mime: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(asset.as_str(), "actors/orc_1_0.png");
        let written = std::fs::read(tmp.path().join("actors/orc_1_0.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }
}
