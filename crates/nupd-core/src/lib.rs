//! Manifest reconciliation engine for nupd
//!
//! Brings a working directory tree to the state a content source describes
//! by moving, copying, and fetching the minimum needed. Content already
//! present anywhere under the root is reused by digest instead of fetched.
//!
//! # Architecture
//!
//! ```text
//!   scan root ---+
//!                +--> ReconciliationMap --> fetch missing --> evacuate --> fill --> verify
//!   source list -+
//! ```
//!
//! - [`manifest`]: path-to-digest snapshots and their text listing
//! - [`ContentIndex`]: digest-to-holder lookup
//! - [`reconcile`]: per-path dual state and the plan preview
//! - [`fetch`]: the [`ContentFetcher`] trait with directory and HTTP sources
//! - [`Updater`]: the pipeline itself
//!
//! # Example
//!
//! ```no_run
//! use nupd_core::{DirectoryFetcher, Updater};
//!
//! fn example() -> nupd_core::Result<()> {
//!     let fetcher = DirectoryFetcher::new("/srv/mirror")?;
//!     let report = Updater::new("/opt/app", fetcher).run()?;
//!     println!("{} files written", report.filled.len());
//!     Ok(())
//! }
//! ```

pub mod check;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod index;
pub mod manifest;
pub mod reconcile;

pub use check::{CheckReport, CheckStatus, DriftItem};
pub use config::{HttpConfig, UpdaterConfig};
pub use engine::{Evacuation, UpdateReport, Updater};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{ContentFetcher, DirectoryFetcher, HttpFetcher};
pub use index::ContentIndex;
pub use manifest::Manifest;
pub use reconcile::{
    DualState, EntryStatus, FetchRequest, FillSource, FillStep, ReconciliationMap, UpdatePlan,
};
