//! Algorithm-prefixed content digests.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Digest algorithms a [`ContentHash`] may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256 (64 hex characters).
    Sha256,
}

impl HashAlgorithm {
    /// Prefix used in the textual form (`sha256`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Number of hex characters a digest of this algorithm has.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced when parsing a [`ContentHash`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HashError {
    /// The string has no `<algorithm>:` prefix.
    #[error("Missing algorithm prefix in '{0}'")]
    MissingPrefix(String),

    /// The prefix names an algorithm we do not know.
    #[error("Unknown hash algorithm '{0}'")]
    UnknownAlgorithm(String),

    /// The hex part has the wrong length or non-hex characters.
    #[error("Invalid {algorithm} digest: expected {expected} hex characters in '{value}'")]
    InvalidDigest {
        /// Algorithm named by the prefix.
        algorithm: HashAlgorithm,
        /// Expected number of hex characters.
        expected: usize,
        /// The offending input.
        value: String,
    },
}

/// An algorithm-prefixed content digest, e.g. `sha256:<hex>`.
///
/// The prefix makes stored hashes self-describing so that a future algorithm
/// migration never has to guess what a bare hex string meant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ContentHash {
    algorithm: HashAlgorithm,
    hex: String,
}

impl ContentHash {
    /// Build a SHA-256 hash from an already computed hex digest.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidDigest`] if `hex` is not 64 hex characters.
    pub fn sha256(hex: impl Into<String>) -> Result<Self, HashError> {
        Self::from_parts(HashAlgorithm::Sha256, hex.into())
    }

    /// Parse the textual `<algorithm>:<hex>` form.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the prefix is missing or unknown, or if the
    /// digest does not match the algorithm's length.
    pub fn parse(s: &str) -> Result<Self, HashError> {
        let (prefix, hex) = s
            .split_once(':')
            .ok_or_else(|| HashError::MissingPrefix(s.to_string()))?;

        let algorithm = match prefix.to_ascii_lowercase().as_str() {
            "sha256" => HashAlgorithm::Sha256,
            other => return Err(HashError::UnknownAlgorithm(other.to_string())),
        };

        Self::from_parts(algorithm, hex.to_string())
    }

    fn from_parts(algorithm: HashAlgorithm, hex: String) -> Result<Self, HashError> {
        if hex.len() != algorithm.hex_len() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidDigest {
                algorithm,
                expected: algorithm.hex_len(),
                value: hex,
            });
        }

        Ok(Self {
            algorithm,
            hex: hex.to_ascii_lowercase(),
        })
    }

    /// The digest algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The lowercase hex digest without prefix.
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_string()
    }
}

impl std::str::FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
