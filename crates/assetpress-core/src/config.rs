//! Configuration module
//!
//! Environment-driven settings for the asset storage layer: where assets
//! land on disk, the URL prefixes they are served under, and which backend
//! the default storage resolves to.

use std::env;

use crate::constants::DEFAULT_GZIP_COMPRESSION_LEVEL;

/// Asset storage configuration.
///
/// `storage_root` and `public_base_url` are optional here; backends that
/// need them reject construction with a configuration error when they are
/// absent. The backend identifier is kept as the raw string and parsed by
/// the storage factory, so a bad identifier surfaces when the backend is
/// first resolved rather than at load time.
#[derive(Clone, Debug)]
pub struct Config {
    /// Filesystem root for saved assets (`STORAGE_ROOT`).
    pub storage_root: Option<String>,
    /// URL prefix for public retrieval (`PUBLIC_BASE_URL`).
    pub public_base_url: Option<String>,
    /// URL prefix for HTTPS retrieval (`SECURE_BASE_URL`).
    pub secure_base_url: Option<String>,
    /// Which backend the default storage constructs (`STORAGE_BACKEND`,
    /// falling back to `BACKEND_IDENTIFIER`).
    pub backend_identifier: Option<String>,
    /// Compression level for gzip sidecars (`GZIP_COMPRESSION_LEVEL`, 0-9).
    pub gzip_compression_level: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_root: None,
            public_base_url: None,
            secure_base_url: None,
            backend_identifier: None,
            gzip_compression_level: DEFAULT_GZIP_COMPRESSION_LEVEL,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let backend_identifier = env::var("STORAGE_BACKEND")
            .or_else(|_| env::var("BACKEND_IDENTIFIER"))
            .ok()
            .filter(|s| !s.is_empty());

        let config = Config {
            storage_root: env::var("STORAGE_ROOT").ok().filter(|s| !s.is_empty()),
            public_base_url: env::var("PUBLIC_BASE_URL").ok().filter(|s| !s.is_empty()),
            secure_base_url: env::var("SECURE_BASE_URL").ok().filter(|s| !s.is_empty()),
            backend_identifier,
            gzip_compression_level: env::var("GZIP_COMPRESSION_LEVEL")
                .unwrap_or_else(|_| DEFAULT_GZIP_COMPRESSION_LEVEL.to_string())
                .parse()
                .unwrap_or(DEFAULT_GZIP_COMPRESSION_LEVEL),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.gzip_compression_level > 9 {
            return Err(anyhow::anyhow!(
                "GZIP_COMPRESSION_LEVEL must be between 0 and 9"
            ));
        }

        Ok(())
    }
}
