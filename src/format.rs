//! Output formatting utilities for markdown and JSON.

use crate::engine::{Facet, Facets, TaskStats};
use crate::types::{Task, TaskStatus, User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Order in which status groups are listed: active work first, terminal last.
const GROUP_ORDER: [TaskStatus; 5] = [
    TaskStatus::InProgress,
    TaskStatus::Pending,
    TaskStatus::Hold,
    TaskStatus::Completed,
    TaskStatus::Cancelled,
];

fn user_name(id: UserId, users: &HashMap<UserId, &User>) -> String {
    users
        .get(&id)
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| id.to_string())
}

/// One list line for a task.
pub fn format_task_short(
    task: &Task,
    users: &HashMap<UserId, &User>,
    now: DateTime<Utc>,
) -> String {
    let mut line = format!("- **{}** (`#{}`) {}", task.title, task.id, task.priority);

    match task.assigned_to {
        Some(id) => line.push_str(&format!(" → {}", user_name(id, users))),
        None => line.push_str(" → unassigned"),
    }

    if let Some(due) = task.due_date {
        line.push_str(&format!(" · due {}", due.format("%Y-%m-%d")));
        if task.is_overdue(now) {
            line.push_str(" **OVERDUE**");
        }
    }

    line.push('\n');
    line
}

/// Format a single task as markdown.
pub fn format_task_markdown(task: &Task, users: &[User], now: DateTime<Utc>) -> String {
    let roster: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();
    let mut md = String::new();

    md.push_str(&format!("## Task: {}\n", task.title));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    md.push_str(&format!("- **status**: {}\n", task.status));
    md.push_str(&format!("- **priority**: {}\n", task.priority));

    if let Some(id) = task.assigned_to {
        md.push_str(&format!("- **assigned_to**: {}\n", user_name(id, &roster)));
    }
    if let Some(id) = task.created_by {
        md.push_str(&format!("- **created_by**: {}\n", user_name(id, &roster)));
    }
    if let Some(due) = task.due_date {
        let flag = if task.is_overdue(now) { " (overdue)" } else { "" };
        md.push_str(&format!("- **due**: {}{}\n", due.format("%Y-%m-%d"), flag));
    }

    if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
        md.push_str("\n### Description\n");
        md.push_str(desc);
        md.push('\n');
    }

    md
}

/// Format a list of tasks as markdown, grouped by status.
pub fn format_tasks_markdown(tasks: &[Task], users: &[User], now: DateTime<Utc>) -> String {
    let roster: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();
    let mut md = format!("# Tasks ({})\n\n", tasks.len());

    for status in GROUP_ORDER {
        let group: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
        if group.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", status.label()));
        for task in group {
            md.push_str(&format_task_short(task, &roster, now));
        }
        md.push('\n');
    }

    md
}

/// Format stats as a markdown table.
pub fn format_stats_markdown(stats: &TaskStats) -> String {
    let mut md = String::from("# Stats\n\n| Metric | Count |\n|---|---|\n");
    for (label, count) in [
        ("Total", stats.total),
        ("Completed", stats.completed),
        ("In Progress", stats.in_progress),
        ("Pending", stats.pending),
        ("Hold", stats.hold),
        ("Cancelled", stats.cancelled),
        ("Assigned to me", stats.assigned_to_me),
        ("Overdue", stats.overdue),
    ] {
        md.push_str(&format!("| {} | {} |\n", label, count));
    }
    md
}

fn format_facet_list(title: &str, facets: &[Facet]) -> String {
    let mut md = format!("## {}\n\n", title);
    if facets.is_empty() {
        md.push_str("_none_\n");
    }
    for facet in facets {
        md.push_str(&format!(
            "- [{}] {} (`{}`)\n",
            facet.initials, facet.display_name, facet.id
        ));
    }
    md.push('\n');
    md
}

/// Format facets as markdown.
pub fn format_facets_markdown(facets: &Facets) -> String {
    let mut md = String::from("# Facets\n\n");
    md.push_str(&format_facet_list("Created By", &facets.creators));
    md.push_str(&format_facet_list("Assigned To", &facets.assignees));
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskPriority, UserRole};
    use chrono::TimeZone;

    fn ts(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, d, 8, 0, 0).unwrap()
    }

    fn task(id: i64, status: TaskStatus, assigned_to: Option<UserId>) -> Task {
        Task {
            id,
            title: format!("Task {}", id),
            description: Some("details".into()),
            status,
            priority: TaskPriority::High,
            due_date: Some(ts(10)),
            created_by: Some(1),
            updated_by: None,
            assigned_to,
            created_at: ts(1),
            updated_at: ts(1),
        }
    }

    fn users() -> Vec<User> {
        vec![User {
            id: 1,
            username: "ana".into(),
            full_name: Some("Ana Diaz".into()),
            email: "ana@example.com".into(),
            role: UserRole::Admin,
            is_active: true,
        }]
    }

    #[test]
    fn parse_format_names() {
        assert_eq!(OutputFormat::from_str("MD"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn list_groups_active_work_first() {
        let tasks = vec![
            task(1, TaskStatus::Completed, None),
            task(2, TaskStatus::InProgress, Some(1)),
        ];
        let md = format_tasks_markdown(&tasks, &users(), ts(5));
        let in_progress = md.find("## In Progress").unwrap();
        let completed = md.find("## Completed").unwrap();
        assert!(in_progress < completed);
        assert!(md.starts_with("# Tasks (2)"));
        assert!(md.contains("→ Ana Diaz"));
        assert!(md.contains("→ unassigned"));
        assert!(!md.contains("OVERDUE"));
    }

    #[test]
    fn overdue_is_flagged() {
        let md = format_tasks_markdown(&[task(3, TaskStatus::Pending, None)], &[], ts(20));
        assert!(md.contains("**OVERDUE**"));
        let detail = format_task_markdown(&task(3, TaskStatus::Pending, None), &[], ts(20));
        assert!(detail.contains("(overdue)"));
        assert!(detail.contains("### Description"));
    }

    #[test]
    fn stats_table_has_every_metric() {
        let stats = TaskStats {
            total: 3,
            completed: 2,
            pending: 1,
            ..Default::default()
        };
        let md = format_stats_markdown(&stats);
        assert!(md.contains("| Total | 3 |"));
        assert!(md.contains("| Completed | 2 |"));
        assert!(md.contains("| Overdue | 0 |"));
    }
}
