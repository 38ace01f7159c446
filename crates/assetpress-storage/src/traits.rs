//! Storage abstraction trait
//!
//! This module defines the AssetStorage trait that all storage backends must
//! implement, together with the error taxonomy for storage operations.

use assetpress_core::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::fmt::Debug;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All asset storage backends (plain filesystem, gzip-sidecar filesystem)
/// implement this trait, so callers can work against configuration-selected
/// storage without naming a concrete type.
///
/// **Naming contract:** entry names are relative, path-like strings
/// (`css/app.css`). Saving under a name that already exists is a destructive
/// overwrite: the previous entry is deleted and the new one is stored under
/// the *same* name, never a uniquified one. Callers that need superseded
/// content must keep it themselves.
#[async_trait]
pub trait AssetStorage: Send + Sync + Debug {
    /// Save an asset and return the name it was stored under.
    ///
    /// Applies the overwrite policy from [`available_name`] first, so the
    /// returned name always equals the requested one. The delete-then-write
    /// sequence is not transactional: a write failure after the delete
    /// leaves neither the old nor the new content behind.
    ///
    /// [`available_name`]: AssetStorage::available_name
    async fn save(&self, name: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Save an asset from an async reader (for large files).
    ///
    /// Same overwrite semantics as [`save`](AssetStorage::save); the reader
    /// is consumed until EOF.
    async fn save_stream(
        &self,
        name: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String>;

    /// Read an asset's full contents.
    async fn open(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Read an asset as a stream of `Bytes` chunks (for large files).
    async fn open_stream(
        &self,
        name: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>>;

    /// Check whether an entry exists under `name`.
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Delete the entry under `name`. Deleting a missing entry is not an
    /// error.
    async fn delete(&self, name: &str) -> StorageResult<()>;

    /// Size in bytes of the entry under `name`.
    async fn size(&self, name: &str) -> StorageResult<u64>;

    /// Overwrite policy: if an entry named `name` already exists, delete it,
    /// then return `name` unchanged.
    ///
    /// This inverts the usual collision behavior of generic file storage
    /// (appending a disambiguating suffix). The existence check and the
    /// delete are separate filesystem calls; concurrent savers of the same
    /// name race, and the last write wins.
    async fn available_name(&self, name: &str) -> StorageResult<String>;

    /// Resolve `name` to an absolute filesystem path under the storage root.
    ///
    /// Fails with [`StorageError::InvalidName`] for names that are absolute
    /// or would escape the root.
    fn path(&self, name: &str) -> StorageResult<PathBuf>;

    /// Resolve `name` to a public URL under the configured base URL.
    fn url(&self, name: &str) -> StorageResult<String>;

    /// Resolve `name` to a URL under the configured secure (HTTPS) base URL.
    ///
    /// Fails with [`StorageError::ConfigError`] when no secure base URL was
    /// configured; there is no fallback to the public base URL.
    fn url_ssl(&self, name: &str) -> StorageResult<String>;

    /// Last access time of the entry under `name`.
    async fn accessed_time(&self, name: &str) -> StorageResult<DateTime<Utc>>;

    /// Creation time of the entry under `name`.
    ///
    /// Propagates the filesystem's error on platforms or filesystems that do
    /// not record a birth time.
    async fn created_time(&self, name: &str) -> StorageResult<DateTime<Utc>>;

    /// Last modification time of the entry under `name`.
    async fn modified_time(&self, name: &str) -> StorageResult<DateTime<Utc>>;

    /// Get the storage backend type
    fn backend(&self) -> StorageBackend;
}
