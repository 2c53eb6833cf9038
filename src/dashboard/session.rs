//! Dashboard session state.
//!
//! The session owns the authoritative task and user collections for one
//! dashboard plus the active filter criteria. Every read goes through
//! [`DashboardSession::view`], which re-runs the filter engine against the
//! latest collection; nothing is patched incrementally.

use crate::engine::{
    ActiveFilter, Facets, FilterCriteria, TaskStats, UserStats, compute_stats,
    compute_user_stats, extract_facets, filter_tasks,
};
use crate::error::{FieldErrors, Result, TaskboardError};
use crate::snapshot::Snapshot;
use crate::types::{Task, User, UserId};
use crate::validate::{NewTask, NewUser, TaskUpdate};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Everything a dashboard renders for one set of criteria.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Tasks passing the criteria, in collection order.
    pub tasks: Vec<Task>,
    /// Counts over the whole collection, independent of the criteria.
    pub stats: TaskStats,
    pub facets: Facets,
    /// Roster counts by role.
    pub user_stats: UserStats,
    pub active_filters: Vec<ActiveFilter>,
    pub has_active_filters: bool,
}

/// Shared dashboard state.
///
/// Collections live behind [`ArcSwap`], so readers always see a complete
/// snapshot and writers publish a new one atomically.
pub struct DashboardSession {
    tasks: ArcSwap<Vec<Task>>,
    users: ArcSwap<Vec<User>>,
    criteria: ArcSwap<FilterCriteria>,
    current_user: Option<UserId>,
}

impl DashboardSession {
    pub fn new(tasks: Vec<Task>, users: Vec<User>, current_user: Option<UserId>) -> Self {
        Self {
            tasks: ArcSwap::from_pointee(tasks),
            users: ArcSwap::from_pointee(users),
            criteria: ArcSwap::from_pointee(FilterCriteria::default()),
            current_user,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::new(snapshot.tasks, snapshot.users, snapshot.current_user)
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.current_user
    }

    /// Latest task collection.
    pub fn tasks(&self) -> Arc<Vec<Task>> {
        self.tasks.load_full()
    }

    pub fn users(&self) -> Arc<Vec<User>> {
        self.users.load_full()
    }

    pub fn task(&self, id: i64) -> Option<Task> {
        self.tasks.load().iter().find(|t| t.id == id).cloned()
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::clone(&self.criteria.load())
    }

    pub fn set_criteria(&self, criteria: FilterCriteria) {
        debug!(?criteria, "Filter criteria updated");
        self.criteria.store(Arc::new(criteria));
    }

    pub fn clear_criteria(&self) {
        debug!("Filter criteria cleared");
        self.criteria.store(Arc::new(FilterCriteria::default()));
    }

    /// Replace the whole task collection (a fresh fetch).
    pub fn replace_tasks(&self, tasks: Vec<Task>) {
        debug!(count = tasks.len(), "Task collection replaced");
        self.tasks.store(Arc::new(tasks));
    }

    pub fn replace_users(&self, users: Vec<User>) {
        debug!(count = users.len(), "User roster replaced");
        self.users.store(Arc::new(users));
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.load().iter().find(|u| u.id == id).cloned()
    }

    /// A task the backend just created. An id already present is replaced,
    /// so ids stay unique.
    pub fn task_created(&self, task: Task) {
        let id = task.id;
        let replaced = self.upsert(task);
        debug!(task_id = id, replaced, "Task created");
    }

    /// A task the backend just updated. Unknown ids are appended.
    ///
    /// Returns `true` when an existing task was replaced.
    pub fn task_updated(&self, task: Task) -> bool {
        let id = task.id;
        let replaced = self.upsert(task);
        debug!(task_id = id, replaced, "Task updated");
        replaced
    }

    fn upsert(&self, task: Task) -> bool {
        let id = task.id;
        let previous = self.tasks.rcu(|current| {
            let mut next = Vec::clone(current);
            match next.iter_mut().find(|t| t.id == id) {
                Some(slot) => *slot = task.clone(),
                None => next.push(task.clone()),
            }
            next
        });
        previous.iter().any(|t| t.id == id)
    }

    /// Validate a task form and add the task under the next free id, created
    /// by the current user.
    pub fn create_task(&self, draft: &NewTask, now: DateTime<Utc>) -> Result<Task> {
        draft.validate()?;
        let previous = self.tasks.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(draft.build(next_id(current.iter().map(|t| t.id)), self.current_user, now));
            next
        });
        let task = draft.build(next_id(previous.iter().map(|t| t.id)), self.current_user, now);
        debug!(task_id = task.id, "Task created from form");
        Ok(task)
    }

    /// Validate a partial update and apply it to task `id` on behalf of the
    /// current user.
    pub fn update_task(&self, id: i64, update: &TaskUpdate, now: DateTime<Utc>) -> Result<Task> {
        update.validate()?;
        if self.task(id).is_none() {
            return Err(TaskboardError::TaskNotFound(id));
        }
        let previous = self.tasks.rcu(|current| {
            current
                .iter()
                .map(|t| {
                    if t.id == id {
                        update.apply(t, self.current_user, now)
                    } else {
                        t.clone()
                    }
                })
                .collect::<Vec<_>>()
        });
        let original = previous
            .iter()
            .find(|t| t.id == id)
            .ok_or(TaskboardError::TaskNotFound(id))?;
        debug!(task_id = id, "Task updated from form");
        Ok(update.apply(original, self.current_user, now))
    }

    /// Validate an account form and add the user under the next free id.
    /// Usernames are unique.
    pub fn create_user(&self, draft: &NewUser) -> Result<User> {
        draft.validate()?;
        let username = draft.username.trim();
        if self.users.load().iter().any(|u| u.username == username) {
            let mut errors = FieldErrors::new();
            errors.insert("username".into(), "User already exists".into());
            return Err(TaskboardError::Validation(errors));
        }
        let previous = self.users.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(draft.build(next_id(current.iter().map(|u| u.id))));
            next
        });
        let user = draft.build(next_id(previous.iter().map(|u| u.id)));
        debug!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// A task the backend just deleted. Returns `true` if it was present.
    pub fn task_deleted(&self, id: i64) -> bool {
        let previous = self.tasks.rcu(|current| {
            current
                .iter()
                .filter(|t| t.id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
        let removed = previous.iter().any(|t| t.id == id);
        debug!(task_id = id, removed, "Task deleted");
        removed
    }

    /// View for the stored criteria.
    pub fn view(&self) -> DashboardView {
        self.view_with(&self.criteria())
    }

    /// View for explicit criteria, leaving the stored criteria untouched.
    pub fn view_with(&self, criteria: &FilterCriteria) -> DashboardView {
        let tasks = self.tasks.load();
        let users = self.users.load();
        let filter = criteria.normalize();

        DashboardView {
            tasks: filter_tasks(&tasks, &filter),
            stats: compute_stats(&tasks, self.current_user),
            facets: extract_facets(&tasks, &users),
            user_stats: compute_user_stats(&users),
            active_filters: filter.summary(),
            has_active_filters: !filter.is_empty(),
        }
    }

    pub fn stats(&self) -> TaskStats {
        compute_stats(&self.tasks.load(), self.current_user)
    }

    pub fn facets(&self) -> Facets {
        extract_facets(&self.tasks.load(), &self.users.load())
    }

    pub fn user_stats(&self) -> UserStats {
        compute_user_stats(&self.users.load())
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}
