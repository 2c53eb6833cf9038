//! Aggregate counts over the whole task backlog.
//!
//! Stats are always taken from the unfiltered collection. Filters change what
//! the list shows; they never change the totals.

use crate::types::{Task, TaskStatus, User, UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dashboard summary counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub hold: usize,
    pub cancelled: usize,
    /// Tasks assigned to the current user (0 when there is none).
    pub assigned_to_me: usize,
    /// Past due and not completed.
    pub overdue: usize,
}

impl TaskStats {
    /// Count for a single status.
    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::Hold => self.hold,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
            TaskStatus::Cancelled => self.cancelled,
        }
    }
}

/// Compute stats as of now.
pub fn compute_stats(tasks: &[Task], current_user: Option<UserId>) -> TaskStats {
    compute_stats_at(tasks, current_user, Utc::now())
}

/// Compute stats with an explicit clock for the overdue count.
pub fn compute_stats_at(
    tasks: &[Task],
    current_user: Option<UserId>,
    now: DateTime<Utc>,
) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        match task.status {
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::Hold => stats.hold += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Cancelled => stats.cancelled += 1,
        }
        if current_user.is_some() && task.assigned_to == current_user {
            stats.assigned_to_me += 1;
        }
        if task.is_overdue(now) {
            stats.overdue += 1;
        }
    }

    stats
}

/// Roster summary for the user administration page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    /// Accounts with the regular `user` role.
    pub users: usize,
}

/// Count accounts by role. Inactive accounts are still counted.
pub fn compute_user_stats(users: &[User]) -> UserStats {
    users.iter().fold(
        UserStats {
            total: users.len(),
            ..Default::default()
        },
        |mut stats, user| {
            match user.role {
                UserRole::Admin => stats.admins += 1,
                UserRole::User => stats.users += 1,
            }
            stats
        },
    )
}
