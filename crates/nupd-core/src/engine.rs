//! The update pipeline
//!
//! [`Updater`] runs one reconciliation of a working root against a content
//! source: scan, fetch missing content, evacuate, relocate, fill, verify. Every step
//! fails fast; a failed run leaves the root in an intermediate but lossless
//! state, and running again converges.

use std::path::{Path, PathBuf};

use nupd_fs::{Digest, Hasher, RelativePath, Sha256Hasher, io};
use serde::Serialize;
use tracing::{debug, info};

use crate::check::{self, CheckReport};
use crate::config::UpdaterConfig;
use crate::fetch::ContentFetcher;
use crate::reconcile::{EntryStatus, ReconciliationMap, UpdatePlan, missing_content};
use crate::{ContentIndex, Error, Manifest, Result, manifest};

/// A path moved aside before receiving new content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evacuation {
    pub from: RelativePath,
    pub to: RelativePath,
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Goal paths whose content was fetched from the source
    pub fetched: Vec<RelativePath>,
    pub evacuated: Vec<Evacuation>,
    /// Surplus files moved aside because a goal path runs through them
    pub relocated: Vec<Evacuation>,
    /// Goal paths written during this run
    pub filled: Vec<RelativePath>,
    /// Scratch locations of entries moved out of the way of a fill
    pub displaced: Vec<PathBuf>,
    /// Staged and evacuated files left under the root
    pub temporaries: Vec<RelativePath>,
    /// Goal paths that already held their content
    pub satisfied: usize,
    /// Paths outside the goal that were left alone
    pub surplus: usize,
}

impl UpdateReport {
    pub fn changed(&self) -> bool {
        !self.filled.is_empty()
    }
}

/// Reconciles one working root with one content source.
pub struct Updater<F> {
    root: PathBuf,
    fetcher: F,
    hasher: Box<dyn Hasher>,
    config: UpdaterConfig,
}

impl<F: ContentFetcher> Updater<F> {
    pub fn new(root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            root: root.into(),
            fetcher,
            hasher: Box::new(Sha256Hasher),
            config: UpdaterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: UpdaterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hasher(mut self, hasher: impl Hasher + 'static) -> Self {
        self.hasher = Box::new(hasher);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn manifests(&self) -> Result<(Manifest, Manifest)> {
        let current = manifest::scan(&self.root, self.hasher.as_ref())?;
        let goal = self.fetcher.fetch_manifest()?;
        info!(goal = goal.len(), current = current.len(), "manifests assembled");
        Ok((goal, current))
    }

    /// Preview a run without fetching content or touching the root.
    pub fn plan(&self) -> Result<UpdatePlan> {
        let (goal, current) = self.manifests()?;
        Ok(UpdatePlan::derive(&goal, &current))
    }

    /// Compare the root with the source's goal manifest.
    pub fn check(&self) -> Result<CheckReport> {
        if !self.root.is_dir() {
            return Err(Error::Scan {
                root: self.root.clone(),
                message: "not a directory".into(),
            });
        }
        let goal = self.fetcher.fetch_manifest()?;
        check::check(&self.root, &goal, self.hasher.as_ref())
    }

    /// Bring every goal path under the root to its goal content.
    ///
    /// Files the goal does not mention are never deleted.
    pub fn run(&self) -> Result<UpdateReport> {
        let root = self.root.as_path();
        let prefix = self.config.temp_prefix.as_str();
        let (goal, current) = self.manifests()?;

        let mut map = ReconciliationMap::assemble(&goal, &current);
        let mut report = UpdateReport {
            satisfied: map.paths_with(EntryStatus::Satisfied).len(),
            surplus: map.paths_with(EntryStatus::Surplus).len(),
            ..UpdateReport::default()
        };

        for request in missing_content(&goal, &current) {
            let bytes = self.fetcher.fetch_content(&request.path)?;
            let actual = self.hasher.digest_bytes(&bytes);
            if actual != request.digest {
                return Err(Error::FetchDigestMismatch {
                    path: request.path,
                    expected: request.digest,
                    actual,
                });
            }
            let staged = io::stage_bytes(root, &bytes, prefix)?;
            debug!(path = %request.path, staged = %staged, "fetched");
            map.merge_current(staged.clone(), request.digest);
            report.temporaries.push(staged);
            report.fetched.push(request.path);
        }
        info!(fetched = report.fetched.len(), "missing content staged");

        for path in map.paths_with(EntryStatus::NeedsReplacement) {
            let temp = io::evacuate(root, &path, prefix)?;
            if map.evacuate(&path, temp.clone()).is_none() {
                return Err(nupd_fs::Error::TempNameCollision {
                    path: temp.to_native(root),
                }
                .into());
            }
            report.temporaries.push(temp.clone());
            report.evacuated.push(Evacuation { from: path, to: temp });
        }
        info!(evacuated = report.evacuated.len(), "replaced paths evacuated");

        for path in map.blocking_paths() {
            let temp = io::evacuate(root, &path, prefix)?;
            if map.relocate(&path, temp.clone()).is_none() {
                return Err(nupd_fs::Error::TempNameCollision {
                    path: temp.to_native(root),
                }
                .into());
            }
            report.temporaries.push(temp.clone());
            report.relocated.push(Evacuation { from: path, to: temp });
        }
        info!(relocated = report.relocated.len(), "blocking surplus relocated");

        // Built after both moves so no fill displaces a holder it still needs
        let index = ContentIndex::build(&map.current_manifest());
        let scratch = self.config.scratch();
        let wanted: Vec<(RelativePath, Digest)> = map
            .iter()
            .filter(|(_, state)| state.status() == EntryStatus::NeedsCreation)
            .filter_map(|(path, state)| state.goal().map(|goal| (path.clone(), goal)))
            .collect();
        for (path, digest) in wanted {
            let source = index.lookup(&digest)?;
            let placement = io::place_copy(&source.to_native(root), &path.to_native(root), &scratch)?;
            debug!(path = %path, source = %source, "filled");
            map.fill(&path);
            report.displaced.extend(placement.displaced);
            report.filled.push(path);
        }
        info!(filled = report.filled.len(), "goal paths filled");

        check::verify(root, &map.goal_manifest(), self.hasher.as_ref())?;
        info!(
            satisfied = report.satisfied,
            filled = report.filled.len(),
            surplus = report.surplus,
            "update complete"
        );
        Ok(report)
    }
}
