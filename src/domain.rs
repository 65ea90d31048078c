use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeoDatasetsError;

/// Characters removed from names before they are compared.
pub const NAME_SEPARATORS: [char; 6] = ['.', ',', ' ', '-', '_', '/'];

/// Lower-cases `value` and deletes every separator character.
///
/// `"GeoDa AirBnB"`, `"geoda_airbnb"` and `"geoda.airbnb"` all normalize to
/// `"geodaairbnb"`.
pub fn normalize_name(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !NAME_SEPARATORS.contains(ch))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    Mixed,
}

impl GeometryType {
    pub const ALL: [GeometryType; 4] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryType {
    type Err = GeoDatasetsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_name(value).to_uppercase();
        GeometryType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| GeoDatasetsError::InvalidAttribute {
                dataset: String::new(),
                attribute: "geometry_type".to_string(),
                reason: format!(
                    "'{value}' is not one of POINT, LINESTRING, POLYGON, MIXED"
                ),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Sha1 => write!(f, "sha1"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
            HashAlgorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

impl HashAlgorithm {
    /// Number of hex characters in a digest of this algorithm.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = GeoDatasetsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(GeoDatasetsError::InvalidHash(format!(
                "unsupported algorithm '{other}'"
            ))),
        }
    }
}

/// A content digest in `algorithm:hexdigest` form. A bare hex digest is
/// read as sha256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownHash {
    algorithm: HashAlgorithm,
    digest: String,
}

impl KnownHash {
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn matches(&self, digest: &str) -> bool {
        self.digest.eq_ignore_ascii_case(digest)
    }
}

impl fmt::Display for KnownHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

impl FromStr for KnownHash {
    type Err = GeoDatasetsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (algorithm, digest) = match trimmed.split_once(':') {
            Some((algorithm, digest)) => (algorithm.parse()?, digest),
            None => (HashAlgorithm::Sha256, trimmed),
        };
        if !digest.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(GeoDatasetsError::InvalidHash(value.to_string()));
        }
        if digest.len() != algorithm.hex_len() {
            return Err(GeoDatasetsError::InvalidHash(format!(
                "{value}: a {algorithm} digest has {} hex characters, got {}",
                algorithm.hex_len(),
                digest.len()
            )));
        }
        Ok(Self {
            algorithm,
            digest: digest.to_ascii_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn normalize_strips_separators_and_case() {
        assert_eq!(normalize_name("GeoDa AirBnB"), "geodaairbnb");
        assert_eq!(normalize_name("geoda_airbnb"), "geodaairbnb");
        assert_eq!(normalize_name("geoda-air-bnb"), "geodaairbnb");
        assert_eq!(normalize_name("geoda.airbnb"), "geodaairbnb");
        assert_eq!(normalize_name("a/b,c"), "abc");
    }

    #[test]
    fn normalize_is_idempotent() {
        for value in ["GeoDa AirBnB", "  x.Y_z-/", "", "ÄÖ-ü", "nybb"] {
            let once = normalize_name(value);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn parse_geometry_type() {
        assert_eq!("Point".parse::<GeometryType>().unwrap(), GeometryType::Point);
        assert_eq!(
            "line-string".parse::<GeometryType>().unwrap(),
            GeometryType::LineString
        );
        let err = "Raster".parse::<GeometryType>().unwrap_err();
        assert_matches!(err, GeoDatasetsError::InvalidAttribute { .. });
    }

    #[test]
    fn parse_known_hash_with_prefix() {
        let hash: KnownHash = "SHA1:A9993E364706816ABA3E25717850C26C9CD0D89D".parse().unwrap();
        assert_eq!(hash.algorithm(), HashAlgorithm::Sha1);
        assert_eq!(hash.digest(), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(hash.to_string(), "sha1:a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn parse_known_hash_defaults_to_sha256() {
        let digest = "deadbeef".repeat(8);
        let hash: KnownHash = digest.parse().unwrap();
        assert_eq!(hash.algorithm(), HashAlgorithm::Sha256);
        assert!(hash.matches(&digest.to_uppercase()));
    }

    #[test]
    fn parse_known_hash_invalid() {
        assert_matches!(
            "crc32:abcd".parse::<KnownHash>(),
            Err(GeoDatasetsError::InvalidHash(_))
        );
        assert_matches!(
            "sha256:not-hex".parse::<KnownHash>(),
            Err(GeoDatasetsError::InvalidHash(_))
        );
    }

    #[test]
    fn truncated_digest_is_rejected() {
        assert_matches!(
            "sha256:aa".parse::<KnownHash>(),
            Err(GeoDatasetsError::InvalidHash(_))
        );
        assert_matches!("md5:".parse::<KnownHash>(), Err(GeoDatasetsError::InvalidHash(_)));
        let sha1_as_sha256 = "sha256:a9993e364706816aba3e25717850c26c9cd0d89d";
        assert_matches!(
            sha1_as_sha256.parse::<KnownHash>(),
            Err(GeoDatasetsError::InvalidHash(_))
        );
    }
}
