use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("invalid flag digest: {0}")]
    InvalidDigest(String),
}

/// A one-way SHA-256 digest of a flag.
///
/// Both the stored answer and every submitted guess are reduced to this
/// before they touch storage or comparison; plaintext flags never leave
/// the request that carried them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagDigest([u8; 32]);

impl FlagDigest {
    /// Digest a plaintext flag. Surrounding whitespace is the submitter's
    /// problem and must be stripped before calling.
    pub fn compute(flag: &str) -> Self {
        let hash = Sha256::digest(flag.as_bytes());
        Self(hash.into())
    }

    /// Parse a hex-encoded digest string.
    pub fn from_hex(s: &str) -> Result<Self, FlagError> {
        if s.len() != 64 {
            return Err(FlagError::InvalidDigest(format!(
                "expected 64 hex characters, got {}",
                s.len()
            )));
        }

        let bytes =
            hex::decode(s).map_err(|e| FlagError::InvalidDigest(format!("invalid hex: {e}")))?;

        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| FlagError::InvalidDigest("decoded to wrong length".into()))?;

        Ok(Self(arr))
    }

    /// Return the digest as a 64-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for FlagDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagDigest({})", self.to_hex())
    }
}

impl fmt::Display for FlagDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for FlagDigest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FlagDigest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
