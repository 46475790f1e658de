use std::fs;
use std::path::Path;

use nupd_fs::constants::LISTFILE_NAME;
use nupd_fs::{Hasher, RelativePath};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::Manifest;
use crate::{Error, Result};

/// Scan `root` into a manifest of every regular file beneath it.
///
/// Directories and symlinks are not entries; symlinks are not followed.
/// Directories are visited in file-name order so repeated scans of an
/// unchanged tree hash files in the same sequence.
///
/// # Errors
///
/// Fails if `root` is missing, not a directory, or any entry cannot be read.
pub fn scan(root: &Path, hasher: &dyn Hasher) -> Result<Manifest> {
    let meta = fs::metadata(root).map_err(|e| Error::Scan {
        root: root.to_path_buf(),
        message: e.to_string(),
    })?;
    if !meta.is_dir() {
        return Err(Error::Scan {
            root: root.to_path_buf(),
            message: "not a directory".into(),
        });
    }

    let mut manifest = Manifest::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Scan {
            root: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = RelativePath::from_root(root, entry.path())?;
        let digest = hasher.digest_file(entry.path())?;
        debug!(path = %path, digest = %digest, "scanned");
        manifest.insert(path, digest);
    }

    info!(root = %root.display(), files = manifest.len(), "scan complete");
    Ok(manifest)
}

/// Scan a published source tree.
///
/// The tree's own top-level listing is not content and is left out, so
/// regenerating a listing in place never records a digest of itself.
pub fn scan_source(root: &Path, hasher: &dyn Hasher) -> Result<Manifest> {
    let mut manifest = scan(root, hasher)?;
    if manifest.remove(&RelativePath::new(LISTFILE_NAME)?).is_some() {
        debug!(root = %root.display(), "left source listing out of scan");
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nupd_fs::Sha256Hasher;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn scans_nested_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("top.txt"), "t").unwrap();
        fs::write(dir.path().join("sub/deeper/leaf.txt"), "l").unwrap();

        let manifest = scan(dir.path(), &Sha256Hasher).unwrap();

        let paths: Vec<_> = manifest.iter().map(|(p, _)| p.as_str().to_string()).collect();
        assert_eq!(paths, vec!["sub/deeper/leaf.txt", "top.txt"]);
        assert_eq!(
            manifest.get(&RelativePath::new("top.txt").unwrap()),
            Some(&Sha256Hasher.digest_bytes(b"t"))
        );
    }

    #[test]
    fn empty_root_is_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(dir.path(), &Sha256Hasher).unwrap().is_empty());
    }

    #[test]
    fn missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan(&dir.path().join("absent"), &Sha256Hasher);
        assert!(matches!(result, Err(Error::Scan { .. })));
    }

    #[test]
    fn file_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "x").unwrap();
        assert!(matches!(scan(&file, &Sha256Hasher), Err(Error::Scan { .. })));
    }

    #[test]
    fn source_scan_leaves_out_top_level_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("f.txt"), "f").unwrap();
        fs::write(dir.path().join(LISTFILE_NAME), "stale").unwrap();
        fs::write(dir.path().join("sub").join(LISTFILE_NAME), "nested").unwrap();

        let manifest = scan_source(dir.path(), &Sha256Hasher).unwrap();

        let paths: Vec<_> = manifest.iter().map(|(p, _)| p.as_str().to_string()).collect();
        assert_eq!(paths, vec!["f.txt", "sub/listfile.psli"]);
        assert_eq!(scan(dir.path(), &Sha256Hasher).unwrap().len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_fails_the_scan() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"bad\xff.bin");
        // Some filesystems refuse such names outright
        if fs::write(dir.path().join(name), "x").is_err() {
            return;
        }

        let result = scan(dir.path(), &Sha256Hasher);
        assert!(matches!(
            result,
            Err(Error::Fs(nupd_fs::Error::InvalidPath { .. }))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), "r").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

        let manifest = scan(dir.path(), &Sha256Hasher).unwrap();

        assert_eq!(manifest.len(), 1);
        assert!(manifest.get(&RelativePath::new("link.txt").unwrap()).is_none());
    }
}
