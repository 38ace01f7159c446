use crate::traits::{AssetStorage, StorageError, StorageResult};
use crate::uri;
use assetpress_core::{Config, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use futures::StreamExt;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Per-instance overrides for [`FsAssetStorage`] construction.
///
/// Any field left as `None` falls back to the corresponding [`Config`]
/// value (`STORAGE_ROOT`, `PUBLIC_BASE_URL`, `SECURE_BASE_URL`).
#[derive(Debug, Clone, Default)]
pub struct FsStorageOptions {
    pub location: Option<PathBuf>,
    pub base_url: Option<String>,
    pub base_url_ssl: Option<String>,
}

/// Filesystem storage for compressed static assets.
///
/// Saves are destructive overwrites by name: an existing entry under the
/// target name is deleted before the new content is written, and the stored
/// name is always the requested one.
#[derive(Clone, Debug)]
pub struct FsAssetStorage {
    location: PathBuf,
    base_url: Option<String>,
    base_url_ssl: Option<String>,
}

impl FsAssetStorage {
    /// Create a storage rooted at `STORAGE_ROOT` with the configured URLs.
    pub async fn new(config: &Config) -> StorageResult<Self> {
        Self::with_options(config, FsStorageOptions::default()).await
    }

    /// Create a storage with per-field overrides, falling back to `config`
    /// for anything not overridden.
    ///
    /// The root directory is created if it does not exist. A missing root
    /// (neither override nor `STORAGE_ROOT`) is a configuration error; the
    /// base URLs stay optional until a URL is actually requested.
    pub async fn with_options(config: &Config, options: FsStorageOptions) -> StorageResult<Self> {
        let location = options
            .location
            .or_else(|| config.storage_root.as_ref().map(PathBuf::from))
            .ok_or_else(|| StorageError::ConfigError("STORAGE_ROOT not configured".to_string()))?;
        let base_url = options.base_url.or_else(|| config.public_base_url.clone());
        let base_url_ssl = options
            .base_url_ssl
            .or_else(|| config.secure_base_url.clone());

        fs::create_dir_all(&location).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage root {}: {}",
                location.display(),
                e
            ))
        })?;

        Ok(FsAssetStorage {
            location,
            base_url,
            base_url_ssl,
        })
    }

    /// Resolve an entry name to a filesystem path under the root.
    ///
    /// Names must be relative and must not contain parent-directory
    /// components, so a name can never address anything outside the root.
    fn checked_path(&self, name: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(name);
        if name.is_empty()
            || relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(StorageError::InvalidName(name.to_string()));
        }

        Ok(self.location.join(relative))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn entry_metadata(&self, name: &str) -> StorageResult<std::fs::Metadata> {
        let path = self.checked_path(name)?;
        fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                StorageError::IoError(e)
            }
        })
    }
}

#[async_trait]
impl AssetStorage for FsAssetStorage {
    async fn save(&self, name: &str, data: Vec<u8>) -> StorageResult<String> {
        let name = self.available_name(name).await?;
        let path = self.checked_path(&name)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::SaveFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::SaveFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::SaveFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            name = %name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Filesystem save successful"
        );

        Ok(name)
    }

    async fn save_stream(
        &self,
        name: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let name = self.available_name(name).await?;
        let path = self.checked_path(&name)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::SaveFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::SaveFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::SaveFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            name = %name,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Filesystem stream save successful"
        );

        Ok(name)
    }

    async fn open(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.checked_path(name)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            name = %name,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Filesystem read successful"
        );

        Ok(data)
    }

    async fn open_stream(
        &self,
        name: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>> {
        let path = self.checked_path(name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let stream = tokio_util::io::ReaderStream::new(file).map(|chunk| {
            chunk.map_err(|e| StorageError::ReadFailed(format!("Failed to read chunk: {}", e)))
        });

        Ok(Box::pin(stream))
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.checked_path(name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.checked_path(name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            name = %name,
            "Filesystem delete successful"
        );

        Ok(())
    }

    async fn size(&self, name: &str) -> StorageResult<u64> {
        let meta = self.entry_metadata(name).await?;
        Ok(meta.len())
    }

    async fn available_name(&self, name: &str) -> StorageResult<String> {
        if self.exists(name).await? {
            self.delete(name).await?;
        }
        Ok(name.to_string())
    }

    fn path(&self, name: &str) -> StorageResult<PathBuf> {
        self.checked_path(name)
    }

    fn url(&self, name: &str) -> StorageResult<String> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            StorageError::ConfigError("PUBLIC_BASE_URL not configured".to_string())
        })?;
        Ok(uri::join_url(base, name))
    }

    fn url_ssl(&self, name: &str) -> StorageResult<String> {
        let base = self.base_url_ssl.as_deref().ok_or_else(|| {
            StorageError::ConfigError("SECURE_BASE_URL not configured".to_string())
        })?;
        Ok(uri::join_url(base, name))
    }

    async fn accessed_time(&self, name: &str) -> StorageResult<DateTime<Utc>> {
        let meta = self.entry_metadata(name).await?;
        Ok(DateTime::<Utc>::from(meta.accessed()?))
    }

    async fn created_time(&self, name: &str) -> StorageResult<DateTime<Utc>> {
        let meta = self.entry_metadata(name).await?;
        Ok(DateTime::<Utc>::from(meta.created()?))
    }

    async fn modified_time(&self, name: &str) -> StorageResult<DateTime<Utc>> {
        let meta = self.entry_metadata(name).await?;
        Ok(DateTime::<Utc>::from(meta.modified()?))
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Filesystem
    }
}
