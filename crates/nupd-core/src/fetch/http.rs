use std::sync::LazyLock;

use nupd_fs::RelativePath;
use nupd_fs::constants::LISTFILE_NAME;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::{debug, info};

use super::ContentFetcher;
use crate::config::HttpConfig;
use crate::{Error, Manifest, Result};

/// Empty, or slash-delimited word segments ending in `/`.
static BASE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/(\w+/)*)?$").expect("base path pattern is valid"));

/// Serves goal content from a plain HTTP server.
///
/// The listing lives at `<base>listfile.psli` and each file at
/// `<base><relative-path>`. One blocking client is reused for every request.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base: Url,
    client: Client,
}

impl HttpFetcher {
    pub fn new(base_url: &str, config: &HttpConfig) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| Error::fetch(base_url, e))?;
        if !BASE_PATH.is_match(base.path()) {
            return Err(Error::fetch(
                base_url,
                "base path must be empty or end in '/' with word-only segments",
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::fetch(base_url, e))?;

        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append `relative` to the base path one percent-encoded segment at a
    /// time, so `#`, `?` and `%` in file names stay part of the path.
    fn url_for(&self, relative: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::fetch(self.base.as_str(), "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(relative.split('/'));
        Ok(url)
    }

    fn get(&self, relative: &str) -> Result<Vec<u8>> {
        let url = self.url_for(relative)?;
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| Error::fetch(url.as_str(), e))?;
        if response.status() != StatusCode::OK {
            return Err(Error::fetch(
                url.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::fetch(url.as_str(), e))?;
        Ok(bytes.to_vec())
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch_manifest(&self) -> Result<Manifest> {
        info!(base = %self.base, "fetching source listing");
        let bytes = self.get(LISTFILE_NAME)?;
        let text = String::from_utf8(bytes).map_err(|e| Error::fetch(LISTFILE_NAME, e))?;
        Manifest::parse_listfile(&text)
    }

    fn fetch_content(&self, path: &RelativePath) -> Result<Vec<u8>> {
        self.get(path.as_str())
    }
}
