//! Read-only preview of what a run would do

use std::collections::BTreeSet;

use nupd_fs::{Digest, RelativePath};
use serde::Serialize;

use super::map::ReconciliationMap;
use super::state::EntryStatus;
use crate::{ContentIndex, Manifest};

/// One goal digest that no current file holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub digest: Digest,
    /// A goal path known to hold the digest at the source
    pub path: RelativePath,
}

/// Goal digests absent from every current entry, one request per digest.
///
/// Requests follow goal path order; a digest wanted at several paths is
/// requested from the first of them.
pub fn missing_content(goal: &Manifest, current: &Manifest) -> Vec<FetchRequest> {
    let present = current.digests();
    let mut seen = BTreeSet::new();
    goal.iter()
        .filter(|(_, digest)| !present.contains(*digest) && seen.insert(**digest))
        .map(|(path, digest)| FetchRequest {
            digest: *digest,
            path: path.clone(),
        })
        .collect()
}

/// Where a filled path will get its content from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum FillSource {
    /// Copied from a file already in place
    Local(RelativePath),
    /// Copied from the old content of a path that is evacuated first
    Evacuated(RelativePath),
    /// Copied from a surplus file that is moved out of the way first
    Relocated(RelativePath),
    /// Copied from staged bytes fetched from the source
    Fetched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillStep {
    pub path: RelativePath,
    pub digest: Digest,
    pub source: FillSource,
}

/// Everything a run would do, derived without touching the working root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatePlan {
    pub fetch: Vec<FetchRequest>,
    pub evacuate: Vec<RelativePath>,
    /// Surplus files in the way of a goal path, moved aside before filling
    pub relocate: Vec<RelativePath>,
    pub fill: Vec<FillStep>,
    pub satisfied: Vec<RelativePath>,
    pub surplus: Vec<RelativePath>,
}

impl UpdatePlan {
    pub fn derive(goal: &Manifest, current: &Manifest) -> Self {
        let map = ReconciliationMap::assemble(goal, current);
        let fetch = missing_content(goal, current);
        let evacuate = map.paths_with(EntryStatus::NeedsReplacement);

        let relocate = map.blocking_paths();

        let evacuated: BTreeSet<&RelativePath> = evacuate.iter().collect();
        let relocated: BTreeSet<&RelativePath> = relocate.iter().collect();
        let mut in_place = Manifest::new();
        let mut moved = Manifest::new();
        let mut aside = Manifest::new();
        for (path, digest) in current {
            let side = if evacuated.contains(path) {
                &mut moved
            } else if relocated.contains(path) {
                &mut aside
            } else {
                &mut in_place
            };
            side.insert(path.clone(), *digest);
        }
        let in_place = ContentIndex::build(&in_place);
        let moved = ContentIndex::build(&moved);
        let aside = ContentIndex::build(&aside);

        let fill = map
            .iter()
            .filter(|(_, state)| {
                matches!(
                    state.status(),
                    EntryStatus::NeedsCreation | EntryStatus::NeedsReplacement
                )
            })
            .filter_map(|(path, state)| {
                let digest = state.goal()?;
                let source = if let Ok(holder) = in_place.lookup(&digest) {
                    FillSource::Local(holder.clone())
                } else if let Ok(holder) = moved.lookup(&digest) {
                    FillSource::Evacuated(holder.clone())
                } else if let Ok(holder) = aside.lookup(&digest) {
                    FillSource::Relocated(holder.clone())
                } else {
                    FillSource::Fetched
                };
                Some(FillStep {
                    path: path.clone(),
                    digest,
                    source,
                })
            })
            .collect();

        Self {
            fetch,
            evacuate,
            relocate,
            fill,
            satisfied: map.paths_with(EntryStatus::Satisfied),
            surplus: map.paths_with(EntryStatus::Surplus),
        }
    }

    /// Whether applying this plan would change nothing.
    pub fn is_noop(&self) -> bool {
        self.fetch.is_empty()
            && self.evacuate.is_empty()
            && self.relocate.is_empty()
            && self.fill.is_empty()
    }
}
