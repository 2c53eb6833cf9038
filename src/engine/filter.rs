//! Filter criteria and task predicate composition.
//!
//! Form input arrives as [`FilterCriteria`]: plain strings where an empty
//! value and the literal `"all"` both mean "no constraint". It is normalized
//! once into a typed [`TaskFilter`], and only the typed filter is ever matched
//! against tasks.

use crate::types::{Task, TaskPriority, TaskStatus, UserId};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Selector value that matches tasks with no assignee.
pub const UNASSIGNED: &str = "unassigned";

/// Selector value that leaves a field unconstrained.
pub const ALL: &str = "all";

/// Raw filter form state, as entered by the user.
///
/// Deserialization is lenient: any key may be spelled in snake_case or
/// camelCase, values may be strings, numbers, booleans or `null`, and unknown
/// keys are ignored. When both spellings of a key are present the snake_case
/// value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub search: String,
    pub status: String,
    pub priority: String,
    pub assigned_to: String,
    pub created_by: String,
    pub date_from: String,
    pub date_to: String,
}

impl<'de> Deserialize<'de> for FilterCriteria {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields =
            Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        let mut take = |snake: &str, camel: &str| {
            let snake = fields.remove(snake);
            let camel = fields.remove(camel);
            snake.or(camel).map(form_text).unwrap_or_default()
        };
        Ok(FilterCriteria {
            search: take("search", "search"),
            status: take("status", "status"),
            priority: take("priority", "priority"),
            assigned_to: take("assigned_to", "assignedTo"),
            created_by: take("created_by", "createdBy"),
            date_from: take("date_from", "dateFrom"),
            date_to: take("date_to", "dateTo"),
        })
    }
}

/// Text a form field holds. `null` and compound values count as blank.
fn form_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

impl FilterCriteria {
    /// Reset every field to unconstrained.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when at least one field still constrains after normalization.
    pub fn has_active_filters(&self) -> bool {
        !self.normalize().is_empty()
    }

    /// Normalize into a typed filter. Values that cannot be understood
    /// (unknown status, malformed date, non-numeric id) drop out as
    /// unconstrained instead of failing.
    pub fn normalize(&self) -> TaskFilter {
        TaskFilter {
            search: search_query(&self.search),
            status: constraint(&self.status).and_then(TaskStatus::from_str),
            priority: constraint(&self.priority).and_then(TaskPriority::from_str),
            assigned_to: constraint(&self.assigned_to).and_then(AssigneeFilter::parse),
            created_by: constraint(&self.created_by).and_then(parse_user_id),
            date_from: constraint(&self.date_from).and_then(parse_date_bound),
            date_to: constraint(&self.date_to).and_then(parse_date_bound),
        }
    }
}

/// Assignee selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeFilter {
    /// Tasks nobody is assigned to.
    Unassigned,
    /// Tasks assigned to this user.
    User(UserId),
}

impl AssigneeFilter {
    fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case(UNASSIGNED) {
            Some(AssigneeFilter::Unassigned)
        } else {
            parse_user_id(value).map(AssigneeFilter::User)
        }
    }

    fn matches(&self, assigned_to: Option<UserId>) -> bool {
        match self {
            AssigneeFilter::Unassigned => assigned_to.is_none(),
            AssigneeFilter::User(id) => assigned_to == Some(*id),
        }
    }
}

/// A filter chip describing one active constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub field: &'static str,
    pub label: String,
}

/// Normalized filter. `None` means unconstrained for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    /// Lower-cased search query.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<AssigneeFilter>,
    pub created_by: Option<UserId>,
    /// Inclusive lower bound on the due date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the due date.
    pub date_to: Option<NaiveDate>,
}

impl TaskFilter {
    /// True when no field constrains.
    pub fn is_empty(&self) -> bool {
        self == &TaskFilter::default()
    }

    /// Builder-style search query, lower-cased like form input.
    pub fn with_search(mut self, query: &str) -> Self {
        self.search = search_query(query);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_assignee(mut self, assignee: AssigneeFilter) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    pub fn with_creator(mut self, creator: UserId) -> Self {
        self.created_by = Some(creator);
        self
    }

    pub fn with_due_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Whether `task` satisfies every active constraint.
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task)
            && self.status.is_none_or(|s| task.status == s)
            && self.priority.is_none_or(|p| task.priority == p)
            && self
                .assigned_to
                .is_none_or(|a| a.matches(task.assigned_to))
            && self
                .created_by
                .is_none_or(|c| task.created_by == Some(c))
            && self.matches_due_range(task)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let Some(query) = self.search.as_deref() else {
            return true;
        };
        task.title.to_lowercase().contains(query)
            || task.description_text().to_lowercase().contains(query)
    }

    // A task without a due date cannot be inside any range.
    fn matches_due_range(&self, task: &Task) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(due) = task.due_date.map(|d| d.date_naive()) else {
            return false;
        };
        self.date_from.is_none_or(|from| due >= from) && self.date_to.is_none_or(|to| due <= to)
    }

    /// Describe the active constraints, in form order.
    pub fn summary(&self) -> Vec<ActiveFilter> {
        let mut chips = Vec::new();
        if let Some(ref q) = self.search {
            chips.push(chip("search", format!("Search: {}", q)));
        }
        if let Some(status) = self.status {
            chips.push(chip("status", format!("Status: {}", status)));
        }
        if let Some(priority) = self.priority {
            chips.push(chip("priority", format!("Priority: {}", priority)));
        }
        match self.assigned_to {
            Some(AssigneeFilter::Unassigned) => {
                chips.push(chip("assigned_to", "Assigned: Unassigned".to_string()))
            }
            Some(AssigneeFilter::User(id)) => {
                chips.push(chip("assigned_to", format!("Assigned: {}", id)))
            }
            None => {}
        }
        if let Some(id) = self.created_by {
            chips.push(chip("created_by", format!("Creator: {}", id)));
        }
        if let Some(from) = self.date_from {
            chips.push(chip("date_from", format!("Due from: {}", from)));
        }
        if let Some(to) = self.date_to {
            chips.push(chip("date_to", format!("Due to: {}", to)));
        }
        chips
    }
}

fn chip(field: &'static str, label: String) -> ActiveFilter {
    ActiveFilter { field, label }
}

/// Apply `filter` to `tasks`, keeping input order.
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    tasks.iter().filter(|t| filter.matches(t)).cloned().collect()
}

/// Normalize raw criteria and filter in one step.
pub fn filter_tasks_with_criteria(tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
    filter_tasks(tasks, &criteria.normalize())
}

/// Trimmed value, or `None` for blank input and the `"all"` sentinel.
fn constraint(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(value)
    }
}

/// The query as typed, lower-cased. Surrounding whitespace is part of the
/// query; trimming only decides whether the field is blank.
fn search_query(value: &str) -> Option<String> {
    constraint(value).map(|_| value.to_lowercase())
}

fn parse_user_id(value: &str) -> Option<UserId> {
    value.parse().ok()
}

/// Accepts a plain `YYYY-MM-DD` date-input value or a full RFC 3339 timestamp.
fn parse_date_bound(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
