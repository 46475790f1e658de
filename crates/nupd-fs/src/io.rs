//! Crash-safe filesystem mutations
//!
//! Every mutation the updater performs on a working root goes through this
//! module. None of them destroys bytes: renames are atomic, copies refuse to
//! overwrite, and anything in the way is moved into a [`ScratchArea`] first.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::constants::{SCRATCH_DIR_NAME, SCRATCH_PREFIX};
use crate::{Error, RelativePath, Result};

/// Generate an unpredictable file name with the given prefix.
pub fn unique_name(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}

/// Check whether anything (including a dangling symlink) exists at `path`.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Process-wide holding area for files displaced from a destination.
///
/// Displaced entries get unpredictable names and are never cleaned up by
/// the updater itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchArea {
    dir: PathBuf,
}

impl ScratchArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<system temp dir>/nupd-scratch`
    pub fn system_default() -> Self {
        Self::new(std::env::temp_dir().join(SCRATCH_DIR_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Move whatever is at `path` into the scratch area.
    ///
    /// Returns the new location of the displaced entry.
    pub fn displace(&self, path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let target = self.dir.join(unique_name(SCRATCH_PREFIX));
        if occupied(&target) {
            return Err(Error::TempNameCollision { path: target });
        }

        move_entry(path, &target)?;
        debug!(from = %path.display(), to = %target.display(), "displaced to scratch");
        Ok(target)
    }
}

impl Default for ScratchArea {
    fn default() -> Self {
        Self::system_default()
    }
}

/// Rename `from` to `to`, falling back to copy-then-remove across devices.
fn move_entry(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_entry(from, to)?;
            let removed = if fs::symlink_metadata(from).map_err(|e| Error::io(from, e))?.is_dir() {
                fs::remove_dir_all(from)
            } else {
                fs::remove_file(from)
            };
            removed.map_err(|e| Error::io(from, e))
        }
        Err(e) => Err(Error::io(from, e)),
    }
}

fn copy_entry(from: &Path, to: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(from).map_err(|e| Error::io(from, e))?;
    if meta.is_dir() {
        fs::create_dir(to).map_err(|e| Error::io(to, e))?;
        for entry in fs::read_dir(from).map_err(|e| Error::io(from, e))? {
            let entry = entry.map_err(|e| Error::io(from, e))?;
            copy_entry(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        copy_new(from, to)
    }
}

/// Copy `src` to `dst`, failing if anything already exists at `dst`.
///
/// A destination created here is removed again if the copy fails.
fn copy_new(src: &Path, dst: &Path) -> Result<()> {
    let mut input = File::open(src).map_err(|e| Error::io(src, e))?;
    let output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .map_err(|e| Error::io(dst, e))?;

    fill_new(&mut input, output, src, dst).inspect_err(|_| {
        if let Err(e) = fs::remove_file(dst) {
            debug!(path = %dst.display(), error = %e, "could not remove partial copy");
        }
    })
}

fn fill_new(input: &mut File, mut output: File, src: &Path, dst: &Path) -> Result<()> {
    io::copy(input, &mut output).map_err(|e| Error::io(dst, e))?;
    output.sync_all().map_err(|e| Error::io(dst, e))?;
    drop(output);

    let permissions = input
        .metadata()
        .map_err(|e| Error::io(src, e))?
        .permissions();
    fs::set_permissions(dst, permissions).map_err(|e| Error::io(dst, e))?;
    Ok(())
}

/// Resolve `path` as far as it exists on disk.
///
/// The existing prefix of the parent chain is canonicalized; missing
/// components and the final component are appended lexically.
pub fn weakly_canonical(path: &Path) -> PathBuf {
    let Some(file_name) = path.file_name() else {
        return path.to_path_buf();
    };

    let mut existing = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut missing = vec![file_name.to_os_string()];
    loop {
        if let Ok(canonical) = dunce::canonicalize(&existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, segment| acc.join(segment));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Displace a regular file sitting where a directory of `dst` must go.
///
/// Only the nearest existing ancestor is considered: if it is a directory
/// nothing needs to happen, if it is a file it is moved to scratch.
fn clear_blocking_ancestor(dst: &Path, scratch: &ScratchArea) -> Result<Option<PathBuf>> {
    for ancestor in dst.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        if let Ok(meta) = fs::metadata(ancestor) {
            if meta.is_file() {
                return scratch.displace(ancestor).map(Some);
            }
            return Ok(None);
        }
    }
    Ok(None)
}

/// What [`place_copy`] had to move out of the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Scratch locations of displaced entries, in displacement order.
    pub displaced: Vec<PathBuf>,
}

/// Copy `src` to `dst` without destroying anything already on disk.
///
/// 1. resolve `dst` as far as it exists
/// 2. displace a regular file occupying the nearest existing ancestor
/// 3. create missing parent directories
/// 4. displace an existing entry at `dst`
/// 5. copy with create-new semantics, so a racing writer makes this fail
pub fn place_copy(src: &Path, dst: &Path, scratch: &ScratchArea) -> Result<Placement> {
    let dst = weakly_canonical(dst);
    let mut placement = Placement::default();

    if let Some(displaced) = clear_blocking_ancestor(&dst, scratch)? {
        placement.displaced.push(displaced);
    }

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    if occupied(&dst) {
        placement.displaced.push(scratch.displace(&dst)?);
    }

    copy_new(src, &dst)?;
    debug!(src = %src.display(), dst = %dst.display(), "placed copy");
    Ok(placement)
}

/// Atomically rename `path` to a fresh temporary name directly under `root`.
///
/// Both locations share a root, so this is a metadata-only move.
pub fn evacuate(root: &Path, path: &RelativePath, prefix: &str) -> Result<RelativePath> {
    let temp = RelativePath::new(unique_name(prefix))?;
    let from = path.to_native(root);
    let to = temp.to_native(root);
    if occupied(&to) {
        return Err(Error::TempNameCollision { path: to });
    }

    fs::rename(&from, &to).map_err(|e| Error::io(&from, e))?;
    debug!(from = %path, to = %temp, "evacuated");
    Ok(temp)
}

/// Write `content` to a fresh temporary name directly under `root`.
pub fn stage_bytes(root: &Path, content: &[u8], prefix: &str) -> Result<RelativePath> {
    let temp = RelativePath::new(unique_name(prefix))?;
    let native = temp.to_native(root);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&native)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::TempNameCollision {
                path: native.clone(),
            },
            _ => Error::io(&native, e),
        })?;
    file.write_all(content).map_err(|e| Error::io(&native, e))?;
    file.sync_all().map_err(|e| Error::io(&native, e))?;

    debug!(path = %temp, size = content.len(), "staged");
    Ok(temp)
}

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the final rename on one filesystem
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
