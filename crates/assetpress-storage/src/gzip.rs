//! Gzip sidecar storage
//!
//! A decorator over any [`AssetStorage`] that, after every successful save,
//! writes a gzip-compressed copy of the stored entry at `<path>.gz` so web
//! servers can serve pre-compressed assets directly.

use crate::fs::FsAssetStorage;
use crate::traits::{AssetStorage, StorageError, StorageResult};
use assetpress_core::constants::GZIP_SIDECAR_SUFFIX;
use assetpress_core::{Config, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use futures::Stream;
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::fs;
use tokio::io::AsyncRead;

/// Storage decorator that maintains a gzip sidecar per saved asset.
///
/// Saving delegates to the inner storage (which applies the overwrite
/// policy), then streams the just-written entry back and writes its
/// compressed form to the sidecar path, truncating any previous sidecar.
/// The two writes are not atomic: a failure after the inner save leaves the
/// primary entry in place with a stale or missing sidecar, and the error is
/// propagated. Deletes only touch the primary entry; an orphaned sidecar is
/// left behind.
#[derive(Debug)]
pub struct GzipSidecarStorage<S: AssetStorage> {
    inner: S,
    level: Compression,
}

impl GzipSidecarStorage<FsAssetStorage> {
    /// Create a gzip-sidecar storage over a filesystem backend configured
    /// from `config`.
    pub async fn new(config: &Config) -> StorageResult<Self> {
        let inner = FsAssetStorage::new(config).await?;
        Ok(Self::wrap(inner, config.gzip_compression_level))
    }
}

impl<S: AssetStorage> GzipSidecarStorage<S> {
    /// Wrap an existing storage, compressing sidecars at `level` (0-9).
    pub fn wrap(inner: S, level: u32) -> Self {
        GzipSidecarStorage {
            inner,
            level: Compression::new(level),
        }
    }

    /// Sidecar path for an entry: the resolved storage path with the gzip
    /// suffix appended.
    fn sidecar_path(&self, name: &str) -> StorageResult<PathBuf> {
        let mut path = self.inner.path(name)?.into_os_string();
        path.push(GZIP_SIDECAR_SUFFIX);
        Ok(PathBuf::from(path))
    }

    async fn write_sidecar(&self, name: &str) -> StorageResult<()> {
        let sidecar = self.sidecar_path(name)?;
        let start = std::time::Instant::now();

        let mut source = self.inner.open_stream(name).await?;
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        while let Some(chunk) = source.next().await {
            encoder.write_all(&chunk?)?;
        }
        let compressed = encoder.finish()?;

        fs::write(&sidecar, &compressed).await.map_err(|e| {
            StorageError::SaveFailed(format!(
                "Failed to write sidecar {}: {}",
                sidecar.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %sidecar.display(),
            name = %name,
            size_bytes = compressed.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Gzip sidecar write successful"
        );

        Ok(())
    }
}

#[async_trait]
impl<S: AssetStorage> AssetStorage for GzipSidecarStorage<S> {
    async fn save(&self, name: &str, data: Vec<u8>) -> StorageResult<String> {
        let name = self.inner.save(name, data).await?;
        self.write_sidecar(&name).await?;
        Ok(name)
    }

    async fn save_stream(
        &self,
        name: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let name = self.inner.save_stream(name, reader).await?;
        self.write_sidecar(&name).await?;
        Ok(name)
    }

    async fn open(&self, name: &str) -> StorageResult<Vec<u8>> {
        self.inner.open(name).await
    }

    async fn open_stream(
        &self,
        name: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>> {
        self.inner.open_stream(name).await
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        self.inner.exists(name).await
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        self.inner.delete(name).await
    }

    async fn size(&self, name: &str) -> StorageResult<u64> {
        self.inner.size(name).await
    }

    async fn available_name(&self, name: &str) -> StorageResult<String> {
        self.inner.available_name(name).await
    }

    fn path(&self, name: &str) -> StorageResult<PathBuf> {
        self.inner.path(name)
    }

    fn url(&self, name: &str) -> StorageResult<String> {
        self.inner.url(name)
    }

    fn url_ssl(&self, name: &str) -> StorageResult<String> {
        self.inner.url_ssl(name)
    }

    async fn accessed_time(&self, name: &str) -> StorageResult<DateTime<Utc>> {
        self.inner.accessed_time(name).await
    }

    async fn created_time(&self, name: &str) -> StorageResult<DateTime<Utc>> {
        self.inner.created_time(name).await
    }

    async fn modified_time(&self, name: &str) -> StorageResult<DateTime<Utc>> {
        self.inner.modified_time(name).await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Gzip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_config(root: &Path) -> Config {
        Config {
            storage_root: Some(root.to_string_lossy().into_owned()),
            public_base_url: Some("/static/".to_string()),
            ..Config::default()
        }
    }

    async fn gzip_storage(root: &Path) -> GzipSidecarStorage<FsAssetStorage> {
        GzipSidecarStorage::new(&test_config(root)).await.unwrap()
    }

    fn gunzip(path: &Path) -> Vec<u8> {
        let compressed = std::fs::read(path).unwrap();
        let mut decoder = GzDecoder::new(&compressed[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn test_save_writes_primary_and_sidecar() {
        let dir = tempdir().unwrap();
        let storage = gzip_storage(dir.path()).await;

        let stored = storage.save("a.txt", b"hello".to_vec()).await.unwrap();

        assert_eq!(stored, "a.txt");
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"hello");
        assert_eq!(gunzip(&dir.path().join("a.txt.gz")), b"hello");
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_sidecar() {
        let dir = tempdir().unwrap();
        let storage = gzip_storage(dir.path()).await;

        storage.save("app.css", b"first".to_vec()).await.unwrap();
        storage.save("app.css", b"second".to_vec()).await.unwrap();

        assert_eq!(storage.open("app.css").await.unwrap(), b"second");
        assert_eq!(gunzip(&dir.path().join("app.css.gz")), b"second");
        // Exactly one primary and one sidecar.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_save_stream_writes_sidecar() {
        let dir = tempdir().unwrap();
        let storage = gzip_storage(dir.path()).await;

        let reader = Box::pin(std::io::Cursor::new(b"streamed".to_vec()))
            as Pin<Box<dyn AsyncRead + Send + Unpin>>;
        storage.save_stream("s.js", reader).await.unwrap();

        assert_eq!(gunzip(&dir.path().join("s.js.gz")), b"streamed");
    }

    #[tokio::test]
    async fn test_sidecar_follows_nested_names() {
        let dir = tempdir().unwrap();
        let storage = gzip_storage(dir.path()).await;

        storage.save("css/app.css", b"body{}".to_vec()).await.unwrap();

        assert_eq!(gunzip(&dir.path().join("css/app.css.gz")), b"body{}");
    }

    #[tokio::test]
    async fn test_delete_leaves_sidecar_behind() {
        let dir = tempdir().unwrap();
        let storage = gzip_storage(dir.path()).await;

        storage.save("a.txt", b"hello".to_vec()).await.unwrap();
        storage.delete("a.txt").await.unwrap();

        assert!(!dir.path().join("a.txt").exists());
        assert!(dir.path().join("a.txt.gz").exists());
    }

    #[tokio::test]
    async fn test_forwards_reads_and_urls() {
        let dir = tempdir().unwrap();
        let storage = gzip_storage(dir.path()).await;

        storage.save("app.css", b"body{}".to_vec()).await.unwrap();

        assert!(storage.exists("app.css").await.unwrap());
        assert_eq!(storage.size("app.css").await.unwrap(), 6);
        assert_eq!(storage.url("app.css").unwrap(), "/static/app.css");
        assert!(matches!(
            storage.url_ssl("app.css"),
            Err(StorageError::ConfigError(_))
        ));
        assert_eq!(storage.backend(), StorageBackend::Gzip);
    }

    #[tokio::test]
    async fn test_stored_level_sidecar_still_decodes() {
        let dir = tempdir().unwrap();
        let inner = FsAssetStorage::new(&test_config(dir.path())).await.unwrap();
        let storage = GzipSidecarStorage::wrap(inner, 0);

        storage.save("raw.bin", b"uncompressed".to_vec()).await.unwrap();

        assert_eq!(gunzip(&dir.path().join("raw.bin.gz")), b"uncompressed");
    }
}
