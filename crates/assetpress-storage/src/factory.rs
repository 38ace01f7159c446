use assetpress_core::Config;
use crate::{
    AssetStorage, FsAssetStorage, GzipSidecarStorage, StorageBackend, StorageError, StorageResult,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Create a storage backend based on configuration
///
/// An unset identifier selects the filesystem backend; an unknown one is a
/// configuration error.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn AssetStorage>> {
    let backend = match config.backend_identifier.as_deref() {
        Some(identifier) => identifier
            .parse::<StorageBackend>()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        None => StorageBackend::Filesystem,
    };

    match backend {
        StorageBackend::Filesystem => {
            let storage = FsAssetStorage::new(config).await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Gzip => {
            let storage = GzipSidecarStorage::new(config).await?;
            Ok(Arc::new(storage))
        }
    }
}

/// Lazily resolved default storage.
///
/// Holds configuration and constructs the configured backend on first use,
/// caching the instance for the life of the value. Concurrent first uses
/// construct at most one backend. A failed construction is not cached, so a
/// later call retries once the underlying problem is fixed; a bad backend
/// identifier therefore surfaces at first use rather than at construction.
pub struct DefaultStorage {
    config: Config,
    resolved: OnceCell<Arc<dyn AssetStorage>>,
}

impl DefaultStorage {
    pub fn new(config: Config) -> Self {
        DefaultStorage {
            config,
            resolved: OnceCell::new(),
        }
    }

    /// Build a default storage from environment configuration.
    pub fn from_env() -> StorageResult<Self> {
        let config = Config::from_env().map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// Resolve the configured backend, constructing it on first call.
    pub async fn resolve(&self) -> StorageResult<Arc<dyn AssetStorage>> {
        let storage = self
            .resolved
            .get_or_try_init(|| create_storage(&self.config))
            .await?;
        Ok(Arc::clone(storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_config(root: &Path, backend: Option<&str>) -> Config {
        Config {
            storage_root: Some(root.to_string_lossy().into_owned()),
            public_base_url: Some("/static/".to_string()),
            backend_identifier: backend.map(String::from),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_defaults_to_filesystem_backend() {
        let dir = tempdir().unwrap();
        let storage = create_storage(&test_config(dir.path(), None)).await.unwrap();
        assert_eq!(storage.backend(), StorageBackend::Filesystem);
    }

    #[tokio::test]
    async fn test_creates_gzip_backend() {
        let dir = tempdir().unwrap();
        let storage = create_storage(&test_config(dir.path(), Some("gzip"))).await.unwrap();

        assert_eq!(storage.backend(), StorageBackend::Gzip);
        storage.save("a.txt", b"hello".to_vec()).await.unwrap();
        assert!(dir.path().join("a.txt.gz").exists());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_config_error() {
        let dir = tempdir().unwrap();
        let err = create_storage(&test_config(dir.path(), Some("redis"))).await.unwrap_err();

        assert!(matches!(err, StorageError::ConfigError(_)));
        assert!(err.to_string().contains("redis"));
    }

    #[tokio::test]
    async fn test_resolve_constructs_once() {
        let dir = tempdir().unwrap();
        let storage = DefaultStorage::new(test_config(dir.path(), None));

        let first = storage.resolve().await.unwrap();
        let second = storage.resolve().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_first_use_shares_instance() {
        let dir = tempdir().unwrap();
        let storage = DefaultStorage::new(test_config(dir.path(), None));

        let (a, b, c) = tokio::join!(storage.resolve(), storage.resolve(), storage.resolve());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn test_bad_identifier_surfaces_at_first_use() {
        let dir = tempdir().unwrap();
        let storage = DefaultStorage::new(test_config(dir.path(), Some("redis")));

        let err = storage.resolve().await.unwrap_err();
        assert!(matches!(err, StorageError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_failed_resolution_is_retried() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("assets");
        // A file at the root path makes backend construction fail.
        std::fs::write(&root, b"blocking file").unwrap();

        let storage = DefaultStorage::new(test_config(&root, None));
        assert!(storage.resolve().await.is_err());

        std::fs::remove_file(&root).unwrap();
        let resolved = storage.resolve().await.unwrap();
        assert_eq!(resolved.backend(), StorageBackend::Filesystem);
    }
}
