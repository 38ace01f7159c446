use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// This enum defines the available storage backend identifiers. It lives in
/// core because it is shared between configuration and the storage factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Plain filesystem storage.
    Filesystem,
    /// Filesystem storage that additionally writes a gzip sidecar per asset.
    Gzip,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filesystem" => Ok(StorageBackend::Filesystem),
            "gzip" => Ok(StorageBackend::Gzip),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Filesystem => write!(f, "filesystem"),
            StorageBackend::Gzip => write!(f, "gzip"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_identifiers() {
        assert_eq!(
            "filesystem".parse::<StorageBackend>().unwrap(),
            StorageBackend::Filesystem
        );
        assert_eq!("gzip".parse::<StorageBackend>().unwrap(), StorageBackend::Gzip);
        assert_eq!("GZIP".parse::<StorageBackend>().unwrap(), StorageBackend::Gzip);
    }

    #[test]
    fn rejects_unknown_identifier() {
        let err = "redis".parse::<StorageBackend>().unwrap_err();
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn serializes_as_identifier() {
        assert_eq!(
            serde_json::to_string(&StorageBackend::Gzip).unwrap(),
            "\"gzip\""
        );
        assert_eq!(
            serde_json::from_str::<StorageBackend>("\"filesystem\"").unwrap(),
            StorageBackend::Filesystem
        );
    }
}
