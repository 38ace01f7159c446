//! Shared constants.

/// Default compression level for gzip sidecar files (0 = store, 9 = best).
pub const DEFAULT_GZIP_COMPRESSION_LEVEL: u32 = 9;

/// Suffix appended to an asset name to form its gzip sidecar name.
pub const GZIP_SIDECAR_SUFFIX: &str = ".gz";
