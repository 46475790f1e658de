//! Manifest command implementation

use std::path::Path;

use colored::Colorize;

use nupd_core::manifest;
use nupd_fs::{RelativePath, Sha256Hasher, io};
use tracing::debug;

use crate::error::Result;

/// Run the manifest command
///
/// Prints the listfile for `dir`, or writes it atomically to `output`.
/// Neither `listfile.psli` nor an `output` inside `dir` is listed.
pub fn run_manifest(dir: &Path, output: Option<&Path>) -> Result<()> {
    let mut manifest = manifest::scan_source(dir, &Sha256Hasher)?;
    if let Some(own) = output.and_then(|path| listed_as(dir, path)) {
        debug!(path = %own, "leaving output out of the listing");
        manifest.remove(&own);
    }
    let listing = manifest.to_listfile();

    match output {
        Some(path) => {
            io::write_atomic(path, listing.as_bytes())?;
            println!(
                "{} Wrote {} entries to {}",
                "OK".green().bold(),
                manifest.len(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{}", listing),
    }
    Ok(())
}

/// Where `path` would appear in a listing of `dir`, if it lies inside it.
fn listed_as(dir: &Path, path: &Path) -> Option<RelativePath> {
    let dir = io::weakly_canonical(dir);
    let path = io::weakly_canonical(path);
    RelativePath::from_root(&dir, &path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_inside_dir_is_listed_relative() {
        let temp = TempDir::new().unwrap();
        let listed = listed_as(temp.path(), &temp.path().join("out").join("list.txt"));
        assert_eq!(listed, RelativePath::new("out/list.txt").ok());
    }

    #[test]
    fn output_outside_dir_is_not_listed() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("tree")).unwrap();
        assert_eq!(listed_as(&temp.path().join("tree"), &temp.path().join("list.txt")), None);
    }
}
