#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Statuswatch: reactive loadable-state aggregation
//!
//! Applications routinely display several independently-loading pieces of
//! data on one screen, and the screen as a whole must decide what to show:
//! a spinner, an error with a retry button, or the data itself. This crate
//! provides the small reactive core of that decision:
//!
//! 1. **Loadable state** - a uniform shape for "the state of one
//!    asynchronously-loaded value" (loading? content? error?), decoupled
//!    from any particular fetching mechanism
//! 2. **Group status rules** - an ordered, prioritized rule list turning N
//!    such states into a single Loading / Error / Data verdict
//! 3. **Live aggregation** - a combine-latest join over N snapshot streams,
//!    re-deriving the verdict whenever any one source changes
//! 4. **Reload coordination** - a "try again" surface that asks each
//!    reloadable source to refresh
//!
//! The crate performs no I/O of its own. Sources are driven by an external
//! data layer (an HTTP client, a cache, a computation); this core only
//! observes their state streams and derives display decisions.
//!
//! ## Key Features
//!
//! - **Independent state fields**: loading, stale content, and a new error
//!   may all co-occur; the model never forces them into one enum
//! - **Prioritized rules**: first match wins, so the rule order *is* the
//!   display policy (`[AnyData, Loading, Error]` prefers stale data over a
//!   spinner; `[Loading, AlwaysData]` never shows errors)
//! - **Combine-latest semantics**: one emission per upstream change, using
//!   the latest value from every other source
//! - **Typed fixed-arity joins**: two- and three-source combinators keep
//!   content types intact; the N-source model erases content to presence
//! - **Explicit reload policy**: `try_again()` respects each source's
//!   freshness policy, `reload_all()` forces; sources that are not
//!   reloadable are never invoked
//!
//! ## Aggregating a group of sources
//!
//! ```ignore
//! use std::sync::Arc;
//! use statuswatch::{AnyLoadable, GroupStatus, GroupStatusModel, GroupStatusRule, SourceCell};
//!
//! let posts = Arc::new(SourceCell::<Vec<Post>>::new());
//! let user = Arc::new(SourceCell::<User>::new());
//!
//! let model = GroupStatusModel::new(
//!     vec![posts.clone() as AnyLoadable, user.clone() as AnyLoadable],
//!     GroupStatusRule::STANDARD.to_vec(),
//! );
//!
//! match model.status() {
//!     Some(GroupStatus::Loading) => render_spinner(),
//!     Some(GroupStatus::Error(e)) => render_error(e.user_message(), model.can_try_again()),
//!     Some(GroupStatus::Data) => render_content(&posts, &user),
//!     None => {} // no rule matched; add a catch-all rule to avoid this
//! }
//! ```
//!
//! ## Waiting for several sources at once
//!
//! ```ignore
//! use statuswatch::ready2;
//!
//! let (user, repos) = ready2(&user_source, &repo_source).await?;
//! ```
//!
//! ## Computing a verdict directly
//!
//! ```
//! use statuswatch::{group_status, GroupStatus, GroupStatusRule, StateSnapshot};
//!
//! let snapshots = [
//!     StateSnapshot { is_loading: false, has_content: true, latest_error: None },
//!     StateSnapshot { is_loading: true, has_content: false, latest_error: None },
//! ];
//! let status = group_status(&snapshots, &GroupStatusRule::STANDARD);
//! assert_eq!(status, Some(GroupStatus::Data));
//! ```
//!
//! ## Module Structure
//!
//! - **[state]** - `LoadableState` snapshots and their erased form
//! - **[status]** - rules, presets, and the verdict computation
//! - **[source]** - the `Loadable` trait and canonical implementations
//! - **[combine]** - the combine-latest stream join
//! - **[group]** - the live `GroupStatusModel` aggregator
//! - **[join]** - fixed-arity typed joins and `ready2`/`ready3`
//! - **[error]** - error types and result handling

pub mod combine;
pub mod error;
pub mod group;
pub mod join;
pub mod source;
pub mod state;
pub mod status;

pub use combine::{combine_latest, CombineLatest};
pub use error::{LoadError, Result};
pub use group::{GroupStatusModel, StatusStream};
pub use join::{
    join_status2, join_status3, ready2, ready3, GroupDisplay, StatusJoin2, StatusJoin3,
};
pub use source::{
    AnyLoadable, ErasedLoadable, FutureSource, JsonSource, Loadable, SourceCell, StateStream,
    SubscribeOptions, TransformedSource,
};
pub use state::{LoadableState, StateSnapshot};
pub use status::{group_status, GroupStatus, GroupStatusRule};
