//! Task filter engine.
//!
//! Pure functions over an in-memory task collection:
//! - [`filter_tasks`]: the visible subset for a set of criteria
//! - [`compute_stats`]: summary counts over the unfiltered backlog
//! - [`compute_user_stats`]: roster counts by role
//! - [`extract_facets`]: creators/assignees for the filter selectors
//!
//! Nothing here holds state or performs I/O; callers re-run the functions
//! whenever the criteria or the collection change.

pub mod facets;
pub mod filter;
pub mod stats;

pub use facets::{Facet, Facets, extract_facets};
pub use filter::{
    ActiveFilter, AssigneeFilter, FilterCriteria, TaskFilter, filter_tasks,
    filter_tasks_with_criteria,
};
pub use stats::{TaskStats, UserStats, compute_stats, compute_stats_at, compute_user_stats};
