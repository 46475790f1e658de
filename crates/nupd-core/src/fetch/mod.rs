//! Content sources for the goal side of a run
//!
//! A [`ContentFetcher`] publishes the goal manifest and serves file bytes by
//! path. [`DirectoryFetcher`] mirrors a local tree, [`HttpFetcher`] talks to
//! a plain HTTP server laid out the same way.

mod directory;
mod http;

pub use directory::DirectoryFetcher;
pub use http::HttpFetcher;

use nupd_fs::RelativePath;

use crate::config::HttpConfig;
use crate::{Manifest, Result};

/// Authoritative source of goal content.
pub trait ContentFetcher {
    /// Obtain the goal-side listing.
    fn fetch_manifest(&self) -> Result<Manifest>;

    /// Retrieve the bytes of one goal path.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Fetch`] if the source cannot deliver the file.
    fn fetch_content(&self, path: &RelativePath) -> Result<Vec<u8>>;
}

impl<T: ContentFetcher + ?Sized> ContentFetcher for Box<T> {
    fn fetch_manifest(&self) -> Result<Manifest> {
        (**self).fetch_manifest()
    }

    fn fetch_content(&self, path: &RelativePath) -> Result<Vec<u8>> {
        (**self).fetch_content(path)
    }
}

impl<T: ContentFetcher + ?Sized> ContentFetcher for &T {
    fn fetch_manifest(&self) -> Result<Manifest> {
        (**self).fetch_manifest()
    }

    fn fetch_content(&self, path: &RelativePath) -> Result<Vec<u8>> {
        (**self).fetch_content(path)
    }
}

/// Pick a fetcher for `source`: HTTP for `http://` and `https://` URLs, a
/// local directory otherwise.
pub fn open(source: &str, http: &HttpConfig) -> Result<Box<dyn ContentFetcher>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Box::new(HttpFetcher::new(source, http)?))
    } else {
        Ok(Box::new(DirectoryFetcher::new(source)?))
    }
}
