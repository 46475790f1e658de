//! Text encoding of a manifest
//!
//! One entry per line: `<relative-path> <hex-digest>`. Lines may end in
//! `\n`, `\r` or `\r\n`. The separator is the first space on the line, so
//! paths containing a space cannot round-trip.

use std::fmt::Write as _;
use std::sync::LazyLock;

use nupd_fs::{Digest, RelativePath};
use regex::Regex;
use tracing::warn;

use super::Manifest;
use crate::{Error, Result};

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("line break pattern is valid"));

impl Manifest {
    /// Render the manifest as a listing, one `\n`-terminated line per entry.
    pub fn to_listfile(&self) -> String {
        let mut out = String::new();
        for (path, digest) in self.iter() {
            if !path.is_listfile_safe() {
                warn!(path = %path, "path contains a space and will not parse back");
            }
            let _ = writeln!(out, "{} {}", path, digest);
        }
        out
    }

    /// Parse a listing produced by [`Manifest::to_listfile`] or a compatible
    /// producer.
    ///
    /// A single trailing line break is ignored, blank lines are skipped.
    pub fn parse_listfile(text: &str) -> Result<Self> {
        let body = text
            .strip_suffix("\r\n")
            .or_else(|| text.strip_suffix('\n'))
            .or_else(|| text.strip_suffix('\r'))
            .unwrap_or(text);

        let mut manifest = Manifest::new();
        if body.is_empty() {
            return Ok(manifest);
        }

        for (idx, line) in LINE_BREAK.split(body).enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let malformed = |message: String| Error::ManifestParse {
                line: line_no,
                message,
            };

            let (raw_path, raw_digest) = line
                .split_once(' ')
                .ok_or_else(|| malformed("missing space between path and digest".into()))?;
            let path = RelativePath::new(raw_path).map_err(|e| malformed(e.to_string()))?;
            let digest = Digest::from_hex(raw_digest).map_err(|e| malformed(e.to_string()))?;

            if manifest.insert(path.clone(), digest).is_some() {
                return Err(Error::DuplicateEntry { path });
            }
        }
        Ok(manifest)
    }
}
