//! Reverse lookup from content digest to a file holding it

use std::collections::BTreeMap;

use nupd_fs::{Digest, RelativePath};

use crate::{Error, Manifest, Result};

/// Immutable digest-to-holder map built from one manifest snapshot.
///
/// When several paths share a digest, the lexicographically first one is
/// the holder. Build a new index whenever the snapshot it reflects changes.
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    holders: BTreeMap<Digest, RelativePath>,
}

impl ContentIndex {
    pub fn build(manifest: &Manifest) -> Self {
        let mut holders = BTreeMap::new();
        for (path, digest) in manifest.iter() {
            holders.entry(*digest).or_insert_with(|| path.clone());
        }
        Self { holders }
    }

    /// Find a path holding `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentNotIndexed`] if no indexed path holds it.
    pub fn lookup(&self, digest: &Digest) -> Result<&RelativePath> {
        self.holders
            .get(digest)
            .ok_or(Error::ContentNotIndexed { digest: *digest })
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.holders.contains_key(digest)
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}
