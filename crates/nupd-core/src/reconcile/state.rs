//! Per-path goal/current state and its two transitions

use nupd_fs::Digest;
use serde::Serialize;

/// What the goal wants at a path versus what is there now.
///
/// A path with neither goal nor current content has no representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DualState {
    /// Goal content expected, nothing here yet
    Wanted { goal: Digest },
    /// Content here that the goal does not mention
    Unlisted { current: Digest },
    /// Goal content expected and some content present
    Held { goal: Digest, current: Digest },
}

/// Classification of a [`DualState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    NeedsCreation,
    Surplus,
    Satisfied,
    NeedsReplacement,
}

impl DualState {
    pub fn goal(&self) -> Option<Digest> {
        match *self {
            Self::Wanted { goal } | Self::Held { goal, .. } => Some(goal),
            Self::Unlisted { .. } => None,
        }
    }

    pub fn current(&self) -> Option<Digest> {
        match *self {
            Self::Unlisted { current } | Self::Held { current, .. } => Some(current),
            Self::Wanted { .. } => None,
        }
    }

    pub fn status(&self) -> EntryStatus {
        match *self {
            Self::Wanted { .. } => EntryStatus::NeedsCreation,
            Self::Unlisted { .. } => EntryStatus::Surplus,
            Self::Held { goal, current } if goal == current => EntryStatus::Satisfied,
            Self::Held { .. } => EntryStatus::NeedsReplacement,
        }
    }

    /// Record goal content for this path, keeping any current content.
    pub(crate) fn merge_goal(existing: Option<Self>, goal: Digest) -> Self {
        match existing.and_then(|s| s.current()) {
            Some(current) => Self::Held { goal, current },
            None => Self::Wanted { goal },
        }
    }

    /// Record current content for this path, keeping any goal content.
    pub(crate) fn merge_current(existing: Option<Self>, current: Digest) -> Self {
        match existing.and_then(|s| s.goal()) {
            Some(goal) => Self::Held { goal, current },
            None => Self::Unlisted { current },
        }
    }

    /// Split a needs-replacement entry for evacuation.
    ///
    /// Returns the state left at the original path (goal kept, current
    /// cleared) and the state for the temporary path (old content, no goal).
    /// Any other state is returned unchanged as the error.
    pub fn evacuated(self) -> Result<(Self, Self), Self> {
        match self {
            Self::Held { goal, current } if goal != current => {
                Ok((Self::Wanted { goal }, Self::Unlisted { current }))
            }
            other => Err(other),
        }
    }

    /// Carry surplus content to another path.
    ///
    /// The original path has neither goal nor current content afterwards
    /// and drops out of the map. Any other state is returned as the error.
    pub fn relocated(self) -> Result<Self, Self> {
        match self {
            Self::Unlisted { current } => Ok(Self::Unlisted { current }),
            other => Err(other),
        }
    }

    /// Mark a needs-creation entry as filled with its goal content.
    pub fn filled(self) -> Result<Self, Self> {
        match self {
            Self::Wanted { goal } => Ok(Self::Held {
                goal,
                current: goal,
            }),
            other => Err(other),
        }
    }
}
