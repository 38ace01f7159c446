//! Assetpress Core Library
//!
//! This crate provides the configuration and shared types used by the
//! assetpress storage layer: the environment-driven [`Config`], the
//! [`StorageBackend`] identifier vocabulary, and a handful of constants.

pub mod config;
pub mod constants;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use storage_types::StorageBackend;
