//! Filesystem primitives for the nupd content updater
//!
//! Provides root-relative paths, content digests, and the crash-safe
//! mutations used to reconcile a working root.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{DIGEST_LEN, Digest, Hasher, Sha256Hasher};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::{Placement, ScratchArea};
pub use path::RelativePath;
