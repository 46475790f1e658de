//! Well-known names used on disk and on the wire.

/// Name of the goal listing at the root of a reference source.
pub const LISTFILE_NAME: &str = "listfile.psli";

/// Default prefix for staged and evacuated files inside a working root.
pub const DEFAULT_TEMP_PREFIX: &str = ".nupd-tmp-";

/// Directory under the system temp dir used as the default scratch area.
pub const SCRATCH_DIR_NAME: &str = "nupd-scratch";

/// Prefix for entries displaced into the scratch area.
pub const SCRATCH_PREFIX: &str = "pstmp";
