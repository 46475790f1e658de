use std::fs;
use std::path::{Path, PathBuf};

use nupd_fs::constants::LISTFILE_NAME;
use nupd_fs::{RelativePath, Sha256Hasher};
use tracing::debug;

use super::ContentFetcher;
use crate::{Error, Manifest, Result, manifest};

/// Serves goal content from a local directory tree.
///
/// The goal manifest is the tree's `listfile.psli` when one exists at the
/// top, otherwise a fresh scan of the tree.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::fetch(
                root.display().to_string(),
                "source is not a directory",
            ));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentFetcher for DirectoryFetcher {
    fn fetch_manifest(&self) -> Result<Manifest> {
        let listfile = self.root.join(LISTFILE_NAME);
        if listfile.is_file() {
            debug!(path = %listfile.display(), "reading source listing");
            let text = fs::read_to_string(&listfile)
                .map_err(|e| Error::fetch(listfile.display().to_string(), e))?;
            return Manifest::parse_listfile(&text);
        }
        manifest::scan_source(&self.root, &Sha256Hasher)
    }

    fn fetch_content(&self, path: &RelativePath) -> Result<Vec<u8>> {
        let native = path.to_native(&self.root);
        fs::read(&native).map_err(|e| Error::fetch(native.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nupd_fs::Hasher;

    fn rel(p: &str) -> RelativePath {
        RelativePath::new(p).unwrap()
    }

    #[test]
    fn scans_when_no_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/f.txt"), "f").unwrap();

        let fetcher = DirectoryFetcher::new(dir.path()).unwrap();
        let manifest = fetcher.fetch_manifest().unwrap();

        assert_eq!(manifest.get(&rel("sub/f.txt")), Some(&Sha256Hasher.digest_bytes(b"f")));
        assert_eq!(fetcher.fetch_content(&rel("sub/f.txt")).unwrap(), b"f");
    }

    #[test]
    fn listing_takes_precedence_over_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("on-disk.txt"), "x").unwrap();
        let digest = Sha256Hasher.digest_bytes(b"listed");
        fs::write(dir.path().join(LISTFILE_NAME), format!("listed.txt {}\n", digest)).unwrap();

        let manifest = DirectoryFetcher::new(dir.path()).unwrap().fetch_manifest().unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get(&rel("listed.txt")), Some(&digest));
    }

    #[test]
    fn malformed_listing_is_manifest_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LISTFILE_NAME), "garbage\n").unwrap();

        let result = DirectoryFetcher::new(dir.path()).unwrap().fetch_manifest();
        assert!(matches!(result, Err(Error::ManifestParse { line: 1, .. })));
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DirectoryFetcher::new(dir.path())
            .unwrap()
            .fetch_content(&rel("gone.txt"));
        assert!(matches!(result, Err(Error::Fetch { .. })));
    }
}
