//! Comparing a working root against a goal manifest
//!
//! [`check`] reports every difference without touching anything;
//! [`verify`] is the strict form run at the end of an update.

use std::fs;
use std::io;
use std::path::Path;

use nupd_fs::{Digest, Hasher, RelativePath};
use serde::Serialize;

use crate::{Error, Manifest, Result};

/// Overall result of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    /// Every goal path holds its goal content
    Healthy,
    /// Some goal paths have no file
    Missing,
    /// Some goal paths hold other content
    Drifted,
}

/// A goal path that does not hold its goal content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftItem {
    pub path: RelativePath,
    pub expected: Digest,
    /// Hex digest found, or a description when no digest could be taken
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub drifted: Vec<DriftItem>,
    pub missing: Vec<DriftItem>,
}

impl CheckReport {
    pub fn healthy() -> Self {
        Self {
            status: CheckStatus::Healthy,
            drifted: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }

    fn from_items(drifted: Vec<DriftItem>, missing: Vec<DriftItem>) -> Self {
        let status = if !drifted.is_empty() {
            CheckStatus::Drifted
        } else if !missing.is_empty() {
            CheckStatus::Missing
        } else {
            CheckStatus::Healthy
        };
        Self {
            status,
            drifted,
            missing,
        }
    }
}

enum Observed {
    Matches,
    Missing,
    Differs(String),
}

fn observe(root: &Path, path: &RelativePath, expected: &Digest, hasher: &dyn Hasher) -> Result<Observed> {
    let native = path.to_native(root);
    let meta = match fs::symlink_metadata(&native) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Observed::Missing),
        Err(e) => return Err(nupd_fs::Error::io(&native, e).into()),
    };
    if !meta.is_file() {
        return Ok(Observed::Differs("not a regular file".into()));
    }

    let actual = hasher.digest_file(&native)?;
    if actual == *expected {
        Ok(Observed::Matches)
    } else {
        Ok(Observed::Differs(actual.to_hex()))
    }
}

/// Compare every goal path under `root` with its goal digest.
///
/// Paths under `root` that the goal does not mention are ignored.
pub fn check(root: &Path, goal: &Manifest, hasher: &dyn Hasher) -> Result<CheckReport> {
    let mut drifted = Vec::new();
    let mut missing = Vec::new();

    for (path, expected) in goal {
        let item = |actual: String| DriftItem {
            path: path.clone(),
            expected: *expected,
            actual,
        };
        match observe(root, path, expected, hasher)? {
            Observed::Matches => {}
            Observed::Missing => missing.push(item("missing".into())),
            Observed::Differs(actual) => drifted.push(item(actual)),
        }
    }

    Ok(CheckReport::from_items(drifted, missing))
}

/// Require every goal path under `root` to hold exactly its goal content.
///
/// # Errors
///
/// Returns [`Error::IntegrityMismatch`] for the first path that does not.
pub fn verify(root: &Path, goal: &Manifest, hasher: &dyn Hasher) -> Result<()> {
    for (path, expected) in goal {
        let actual = match observe(root, path, expected, hasher)? {
            Observed::Matches => continue,
            Observed::Missing => "missing".to_string(),
            Observed::Differs(actual) => actual,
        };
        return Err(Error::IntegrityMismatch {
            path: path.clone(),
            expected: *expected,
            actual,
        });
    }
    Ok(())
}
