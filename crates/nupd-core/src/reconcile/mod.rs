//! Reconciliation planning
//!
//! Merges goal and current manifests into a [`ReconciliationMap`] whose
//! entries move through two transitions: evacuation splits a
//! needs-replacement entry, filling satisfies a needs-creation entry.

mod map;
mod plan;
mod state;

pub use map::ReconciliationMap;
pub use plan::{FetchRequest, FillSource, FillStep, UpdatePlan, missing_content};
pub use state::{DualState, EntryStatus};
