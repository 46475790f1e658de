use std::collections::{BTreeMap, BTreeSet};

use nupd_fs::{Digest, RelativePath};

use super::state::{DualState, EntryStatus};
use crate::Manifest;

/// Path-keyed dual states for one run.
///
/// Keys are the union of goal and current paths plus any temporary paths
/// introduced by evacuation or relocation. Entries are only transformed,
/// except that a relocated surplus path leaves the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationMap {
    entries: BTreeMap<RelativePath, DualState>,
}

impl ReconciliationMap {
    /// Merge a goal and a current manifest into one map.
    pub fn assemble(goal: &Manifest, current: &Manifest) -> Self {
        let mut map = Self::default();
        for (path, digest) in goal {
            map.merge_goal(path.clone(), *digest);
        }
        for (path, digest) in current {
            map.merge_current(path.clone(), *digest);
        }
        map
    }

    pub fn merge_goal(&mut self, path: RelativePath, digest: Digest) {
        let existing = self.entries.remove(&path);
        self.entries
            .insert(path, DualState::merge_goal(existing, digest));
    }

    pub fn merge_current(&mut self, path: RelativePath, digest: Digest) {
        let existing = self.entries.remove(&path);
        self.entries
            .insert(path, DualState::merge_current(existing, digest));
    }

    pub fn get(&self, path: &RelativePath) -> Option<&DualState> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelativePath, &DualState)> {
        self.entries.iter()
    }

    /// Paths currently in `status`, in path order.
    pub fn paths_with(&self, status: EntryStatus) -> Vec<RelativePath> {
        self.entries
            .iter()
            .filter(|(_, state)| state.status() == status)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Split the needs-replacement entry at `path`, moving its current
    /// content to the fresh key `temp`.
    ///
    /// Returns the moved digest, or `None` if `path` is not in
    /// needs-replacement state or `temp` is already a key.
    pub fn evacuate(&mut self, path: &RelativePath, temp: RelativePath) -> Option<Digest> {
        if self.entries.contains_key(&temp) {
            return None;
        }
        let state = self.entries.remove(path)?;
        match state.evacuated() {
            Ok((left, moved)) => {
                self.entries.insert(path.clone(), left);
                self.entries.insert(temp, moved);
                moved.current()
            }
            Err(unchanged) => {
                self.entries.insert(path.clone(), unchanged);
                None
            }
        }
    }

    /// Surplus paths that sit where an unsatisfied goal path needs a
    /// directory, or inside a directory where one needs a file.
    pub fn blocking_paths(&self) -> Vec<RelativePath> {
        let wanted: BTreeSet<&RelativePath> = self
            .entries
            .iter()
            .filter(|(_, state)| state.goal().is_some() && state.status() != EntryStatus::Satisfied)
            .map(|(path, _)| path)
            .collect();
        let wanted_dirs: BTreeSet<RelativePath> = wanted.iter().flat_map(|p| p.ancestors()).collect();

        self.entries
            .iter()
            .filter(|(_, state)| state.status() == EntryStatus::Surplus)
            .filter(|(path, _)| {
                wanted_dirs.contains(*path) || path.ancestors().any(|a| wanted.contains(&a))
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Move the surplus entry at `path` to the fresh key `temp`.
    ///
    /// Returns the moved digest, or `None` if `path` is not surplus or
    /// `temp` is already a key.
    pub fn relocate(&mut self, path: &RelativePath, temp: RelativePath) -> Option<Digest> {
        if self.entries.contains_key(&temp) {
            return None;
        }
        let state = self.entries.remove(path)?;
        match state.relocated() {
            Ok(moved) => {
                self.entries.insert(temp, moved);
                moved.current()
            }
            Err(unchanged) => {
                self.entries.insert(path.clone(), unchanged);
                None
            }
        }
    }

    /// Mark the needs-creation entry at `path` as satisfied.
    ///
    /// Returns `false` if `path` is not in needs-creation state.
    pub fn fill(&mut self, path: &RelativePath) -> bool {
        let Some(state) = self.entries.remove(path) else {
            return false;
        };
        let (next, changed) = match state.filled() {
            Ok(next) => (next, true),
            Err(unchanged) => (unchanged, false),
        };
        self.entries.insert(path.clone(), next);
        changed
    }

    /// Snapshot of where content physically is according to this map.
    pub fn current_manifest(&self) -> Manifest {
        let mut manifest = Manifest::new();
        for (path, state) in &self.entries {
            if let Some(current) = state.current() {
                manifest.insert(path.clone(), current);
            }
        }
        manifest
    }

    /// Snapshot of the goal side of this map.
    pub fn goal_manifest(&self) -> Manifest {
        let mut manifest = Manifest::new();
        for (path, state) in &self.entries {
            if let Some(goal) = state.goal() {
                manifest.insert(path.clone(), goal);
            }
        }
        manifest
    }
}
