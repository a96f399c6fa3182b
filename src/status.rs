//! Group-status rules and the verdict computation.
//!
//! Given the latest snapshot of every observed source, an ordered list of
//! [`GroupStatusRule`]s decides the single display verdict for the whole
//! group. Rules are evaluated in array order and the first match wins, so the
//! order expresses a display priority. For example:
//!
//! - `[Loading, Error, AllData]` shows a spinner whenever anything is
//!   reloading, or else an error if any source has one, otherwise data once
//!   all sources have it.
//! - `[AnyData, Loading, Error]` favours showing whatever data is available,
//!   stale or not, before falling back to a spinner.
//! - `[AnyData, Error]` never shows a spinner at all.
//!
//! There is no single right list; it depends entirely on the use case, which
//! is why the rules are supplied per call-site. Three common arrangements are
//! provided as [`GroupStatusRule::STANDARD`], [`GroupStatusRule::NO_ERROR`]
//! and [`GroupStatusRule::DATA_ONLY`].

use crate::error::LoadError;
use crate::state::StateSnapshot;

/// One prioritized condition used to decide the display status of a group.
///
/// Rules are evaluated against the full set of snapshots, in list order,
/// first match wins. A list with no guaranteed-to-match final rule (such as
/// `AlwaysData` or `Error`) can leave the group status undetermined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatusRule {
    /// If `is_loading` is true for *any* observed source, the group is
    /// **loading**.
    Loading,

    /// If content is present for *any* observed source, the group is
    /// **data**.
    AnyData,

    /// If content is present for *all* observed sources, the group is
    /// **data**.
    AllData,

    /// Unconditionally **data**, regardless of source state.
    AlwaysData,

    /// If an error is present for any observed source, the group is
    /// **error**. When several sources have errors, the first one in
    /// snapshot iteration order is surfaced; which source that is depends on
    /// the caller's input order and is explicitly arbitrary.
    Error,
}

impl GroupStatusRule {
    /// Prefer showing any available data over a spinner; surface errors last.
    pub const STANDARD: [GroupStatusRule; 3] = [
        GroupStatusRule::AnyData,
        GroupStatusRule::Loading,
        GroupStatusRule::Error,
    ];

    /// Never surface errors: a spinner while loading, data otherwise.
    pub const NO_ERROR: [GroupStatusRule; 2] =
        [GroupStatusRule::Loading, GroupStatusRule::AlwaysData];

    /// Always attempt to render content, ignoring status entirely.
    pub const DATA_ONLY: [GroupStatusRule; 1] = [GroupStatusRule::AlwaysData];
}

/// The derived verdict for a group of sources.
///
/// Recomputed synchronously every time the combined set of latest snapshots
/// changes; it carries no lifecycle of its own and exists only as a function
/// of its inputs at one instant.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupStatus {
    /// Show a loading indicator.
    Loading,

    /// Show the error (and a retry affordance, if anything is reloadable).
    Error(LoadError),

    /// Render content.
    Data,
}

/// Evaluate `rules` in order against `snapshots` and return the first match.
///
/// Returns `None` when no rule matched (possible only if the rule list lacks
/// a catch-all such as [`GroupStatusRule::AlwaysData`]). Callers that need a
/// guaranteed verdict must supply a final rule that always matches.
///
/// This is a pure function: identical inputs always yield identical output,
/// and rules after the first match are never evaluated.
///
/// # Examples
///
/// ```
/// use statuswatch::{group_status, GroupStatus, GroupStatusRule, StateSnapshot};
///
/// let loaded = StateSnapshot { is_loading: false, has_content: true, latest_error: None };
/// let pending = StateSnapshot { is_loading: true, has_content: false, latest_error: None };
///
/// // Loading takes priority even though data exists elsewhere.
/// let status = group_status(
///     &[loaded.clone(), pending.clone()],
///     &[GroupStatusRule::Loading, GroupStatusRule::AnyData],
/// );
/// assert_eq!(status, Some(GroupStatus::Loading));
///
/// // Flip the priority and the available data wins.
/// let status = group_status(
///     &[loaded, pending],
///     &[GroupStatusRule::AnyData, GroupStatusRule::Loading],
/// );
/// assert_eq!(status, Some(GroupStatus::Data));
/// ```
pub fn group_status(
    snapshots: &[StateSnapshot],
    rules: &[GroupStatusRule],
) -> Option<GroupStatus> {
    for rule in rules {
        match rule {
            GroupStatusRule::Loading => {
                if snapshots.iter().any(|s| s.is_loading) {
                    return Some(GroupStatus::Loading);
                }
            }

            GroupStatusRule::AnyData => {
                if snapshots.iter().any(|s| s.has_content) {
                    return Some(GroupStatus::Data);
                }
            }

            GroupStatusRule::AllData => {
                if snapshots.iter().all(|s| s.has_content) {
                    return Some(GroupStatus::Data);
                }
            }

            GroupStatusRule::AlwaysData => return Some(GroupStatus::Data),

            GroupStatusRule::Error => {
                if let Some(error) = snapshots.iter().find_map(|s| s.latest_error.clone()) {
                    return Some(GroupStatus::Error(error));
                }
            }
        }
    }
    None
}
