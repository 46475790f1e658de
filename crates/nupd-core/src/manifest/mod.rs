//! Path-to-digest snapshots of directory trees
//!
//! A [`Manifest`] is built fresh for every run, either by scanning a tree
//! ([`scan`]) or by parsing the text listing a reference source publishes
//! ([`Manifest::parse_listfile`]).

mod listfile;
mod scan;

pub use scan::{scan, scan_source};

use std::collections::{BTreeMap, BTreeSet};

use nupd_fs::{Digest, RelativePath};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An ordered mapping from root-relative path to content digest.
///
/// One entry per regular file; keys are unique by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<RelativePath, Digest>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest, rejecting repeated paths.
    pub fn from_entries(entries: impl IntoIterator<Item = (RelativePath, Digest)>) -> Result<Self> {
        let mut manifest = Self::new();
        for (path, digest) in entries {
            if manifest.entries.contains_key(&path) {
                return Err(Error::DuplicateEntry { path });
            }
            manifest.entries.insert(path, digest);
        }
        Ok(manifest)
    }

    /// Insert or replace the digest recorded for `path`.
    pub fn insert(&mut self, path: RelativePath, digest: Digest) -> Option<Digest> {
        self.entries.insert(path, digest)
    }

    pub fn remove(&mut self, path: &RelativePath) -> Option<Digest> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &RelativePath) -> Option<&Digest> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&RelativePath, &Digest)> {
        self.entries.iter()
    }

    /// The set of distinct digests present.
    pub fn digests(&self) -> BTreeSet<Digest> {
        self.entries.values().copied().collect()
    }

    /// Whether any entry holds `digest`.
    pub fn holds(&self, digest: &Digest) -> bool {
        self.entries.values().any(|d| d == digest)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a RelativePath, &'a Digest);
    type IntoIter = std::collections::btree_map::Iter<'a, RelativePath, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
