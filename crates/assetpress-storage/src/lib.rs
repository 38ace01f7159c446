//! Assetpress Storage Library
//!
//! This crate provides storage abstraction and implementations for Assetpress.
//! It includes the AssetStorage trait, a filesystem backend, and a gzip
//! sidecar variant layered on top of it.
//!
//! # Naming and overwrite policy
//!
//! Asset names are slash-separated paths relative to the storage root. Names
//! must not contain `..`, a leading `/`, or a drive prefix. Saving under a
//! taken name never renames: the existing entry is deleted first and the
//! asset keeps its requested name, so compiled assets stay addressable at
//! stable URLs.
//!
//! # Gzip sidecars
//!
//! The gzip backend writes a compressed copy of every saved asset next to it
//! at `{name}.gz`. Sidecars are derivative artifacts: they are refreshed on
//! save through the gzip backend but never deleted or refreshed by any other
//! write path.

pub mod factory;
pub mod fs;
pub mod gzip;
pub mod traits;
pub(crate) mod uri;

// Re-export commonly used types
pub use assetpress_core::StorageBackend;
pub use factory::{create_storage, DefaultStorage};
pub use fs::{FsAssetStorage, FsStorageOptions};
pub use gzip::GzipSidecarStorage;
pub use traits::{AssetStorage, StorageError, StorageResult};
