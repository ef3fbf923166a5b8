//! Prebuilt function bundles.
//!
//! A deployable unit's code ships as an opaque, separately built artifact.
//! This layer never opens the artifact; it records where it lives
//! ([`BundleSource`]), which build it is (a semver version), and a sha256
//! checksum the orchestration tool verifies at upload time.

use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

/// Where a bundle artifact lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BundleSource {
    /// S3 object: s3://bucket/path/to/bundle.zip
    S3 { bucket: String, key: String },
    /// HTTPS download: https://releases.example.com/bundle.zip
    Https { url: String },
    /// OCI registry: oci://registry.example.com/api-handler:v1.2.0
    Oci { registry: String, repository: String, tag: String },
    /// Local file: file:///path/to/bundle.zip or ./relative/bundle.zip
    File { path: String },
}

impl BundleSource {
    pub fn parse(uri: &str) -> CoreResult<Self> {
        if let Some(rest) = uri.strip_prefix("s3://") {
            let (bucket, key) = rest
                .split_once('/')
                .ok_or_else(|| CoreError::InvalidUri(uri.to_string()))?;
            if bucket.is_empty() || key.is_empty() {
                return Err(CoreError::InvalidUri(uri.to_string()));
            }
            Ok(BundleSource::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
        } else if uri.starts_with("https://") {
            Ok(BundleSource::Https { url: uri.to_string() })
        } else if let Some(rest) = uri.strip_prefix("oci://") {
            let (repo_path, tag) = rest.rsplit_once(':').unwrap_or((rest, "latest"));
            let (registry, repository) = repo_path
                .split_once('/')
                .ok_or_else(|| CoreError::InvalidUri(uri.to_string()))?;
            Ok(BundleSource::Oci {
                registry: registry.to_string(),
                repository: repository.to_string(),
                tag: tag.to_string(),
            })
        } else if let Some(path) = uri.strip_prefix("file://") {
            Ok(BundleSource::File { path: path.to_string() })
        } else if uri.starts_with("./") || uri.starts_with('/') {
            Ok(BundleSource::File { path: uri.to_string() })
        } else {
            Err(CoreError::UnsupportedScheme(uri.to_string()))
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            BundleSource::S3 { .. } => "s3",
            BundleSource::Https { .. } => "https",
            BundleSource::Oci { .. } => "oci",
            BundleSource::File { .. } => "file",
        }
    }
}

/// A pinned bundle: source plus checksum plus version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRef {
    pub source: BundleSource,
    /// Hex-encoded sha256 of the artifact bytes.
    pub sha256: String,
    pub version: Version,
}

impl BundleRef {
    pub fn new(source: BundleSource, sha256: &str, version: &str) -> CoreResult<Self> {
        let version = Version::parse(version).map_err(|e| CoreError::InvalidVersion {
            version: version.to_string(),
            reason: e.to_string(),
        })?;
        Ok(BundleRef {
            source,
            sha256: sha256.to_string(),
            version,
        })
    }

    /// Reference a local artifact, hashing its bytes on the spot.
    pub fn from_file(path: &Path, version: &str) -> CoreResult<Self> {
        let bytes = std::fs::read(path)?;
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Self::new(
            BundleSource::File {
                path: path.display().to_string(),
            },
            &sha256,
            version,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_s3_source() {
        let src = BundleSource::parse("s3://artifacts/handlers/api.zip").unwrap();
        assert_eq!(src.scheme(), "s3");
        assert_eq!(
            src,
            BundleSource::S3 {
                bucket: "artifacts".to_string(),
                key: "handlers/api.zip".to_string(),
            }
        );
    }

    #[test]
    fn parses_oci_source_with_default_tag() {
        let src = BundleSource::parse("oci://registry.example.com/api-handler").unwrap();
        match src {
            BundleSource::Oci { tag, .. } => assert_eq!(tag, "latest"),
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(BundleSource::parse("ftp://example.com/x.zip").is_err());
        assert!(BundleSource::parse("s3://bucket-only").is_err());
    }

    #[test]
    fn hashes_local_bundle() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"bundle bytes").unwrap();

        let bundle = BundleRef::from_file(file.path(), "1.0.0").unwrap();
        assert_eq!(bundle.sha256.len(), 64);
        assert_eq!(bundle.version, Version::new(1, 0, 0));
    }

    #[test]
    fn rejects_bad_version() {
        let src = BundleSource::parse("s3://artifacts/api.zip").unwrap();
        assert!(BundleRef::new(src, "deadbeef", "not-a-version").is_err());
    }
}
