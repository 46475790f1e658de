//! SHA-256 content digests
//!
//! A [`Digest`] is the fixed-length content identifier every manifest entry
//! carries. The [`Hasher`] trait is the seam through which bytes become
//! digests; [`Sha256Hasher`] is the implementation used throughout the
//! workspace.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::{Error, Result};

/// Length of a digest in bytes.
pub const DIGEST_LEN: usize = 32;

const READ_CHUNK: usize = 64 * 1024;

/// A fixed-length content identifier.
///
/// Displayed and parsed as lowercase hexadecimal. Absence of content is
/// modelled as `Option<Digest>::None`, never as a special digest value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex-encoded digest (either case).
    pub fn from_hex(value: &str) -> Result<Self> {
        let decoded = hex::decode(value).map_err(|e| Error::InvalidDigest {
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; DIGEST_LEN] = decoded.try_into().map_err(|v: Vec<u8>| {
            Error::InvalidDigest {
                value: value.to_string(),
                reason: format!("expected {} bytes, got {}", DIGEST_LEN, v.len()),
            }
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..12])
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Turns byte streams into digests.
///
/// Implementations must be deterministic and collision resistant: all
/// content-addressed reuse relies on equal digests meaning equal bytes.
pub trait Hasher {
    /// Digest everything readable from `reader`.
    fn digest_reader(&self, reader: &mut dyn Read) -> io::Result<Digest>;

    /// Digest an in-memory buffer.
    fn digest_bytes(&self, mut bytes: &[u8]) -> Digest {
        // Reading from a slice cannot fail.
        self.digest_reader(&mut bytes)
            .unwrap_or_else(|_| unreachable!("reading from a byte slice"))
    }

    /// Digest the full contents of the file at `path`.
    fn digest_file(&self, path: &Path) -> Result<Digest> {
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
        self.digest_reader(&mut file).map_err(|e| Error::io(path, e))
    }
}

/// SHA-256 [`Hasher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn digest_reader(&self, reader: &mut dyn Read) -> io::Result<Digest> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Digest(hasher.finalize().into()))
    }
}
