//! Integration tests for the task filter engine.
//!
//! Covers filtering, stats and facet extraction through the public API.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use taskboard::engine::{
    AssigneeFilter, FilterCriteria, TaskFilter, compute_stats, extract_facets, filter_tasks,
    filter_tasks_with_criteria,
};
use taskboard::types::{Task, TaskPriority, TaskStatus, User, UserId, UserRole};

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 15, 30, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(id: i64, title: &str, status: TaskStatus) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: Some(format!("Description for {}", title)),
        status,
        priority: TaskPriority::Medium,
        due_date: None,
        created_by: Some(1),
        updated_by: None,
        assigned_to: None,
        created_at: ts(2024, 1, 1),
        updated_at: ts(2024, 1, 1),
    }
}

fn user(id: UserId, username: &str, full_name: Option<&str>) -> User {
    User {
        id,
        username: username.to_string(),
        full_name: full_name.map(str::to_string),
        email: format!("{}@example.com", username),
        role: UserRole::User,
        is_active: true,
    }
}

/// The three tasks used by the dashboard scenarios.
fn scenario_tasks() -> Vec<Task> {
    vec![
        task(1, "Test Task 1", TaskStatus::Pending),
        task(2, "Test Task 2", TaskStatus::InProgress),
        task(3, "Test Task 3", TaskStatus::Completed),
    ]
}

/// A mixed backlog exercising every field.
fn backlog() -> Vec<Task> {
    let mut a = task(1, "Refactor Auth", TaskStatus::InProgress);
    a.priority = TaskPriority::High;
    a.assigned_to = Some(10);
    a.created_by = Some(10);
    a.due_date = Some(ts(2024, 5, 10));

    let mut b = task(2, "Write onboarding docs", TaskStatus::Pending);
    b.description = Some("Cover the auth flow too".into());
    b.assigned_to = Some(11);
    b.created_by = Some(10);
    b.due_date = Some(ts(2024, 5, 20));

    let mut c = task(3, "Fix flaky CI", TaskStatus::Pending);
    c.priority = TaskPriority::Urgent;
    c.created_by = Some(11);

    let mut d = task(4, "Quarterly report", TaskStatus::Completed);
    d.assigned_to = Some(10);
    d.created_by = Some(12);
    d.due_date = Some(ts(2024, 4, 30));

    let mut e = task(5, "Archive old boards", TaskStatus::Cancelled);
    e.priority = TaskPriority::Low;
    e.description = None;

    vec![a, b, c, d, e]
}

fn ids(tasks: &[Task]) -> Vec<i64> {
    tasks.iter().map(|t| t.id).collect()
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn unconstrained_filter_is_identity() {
    let tasks = backlog();
    assert_eq!(filter_tasks(&tasks, &TaskFilter::default()), tasks);

    let sentinels = FilterCriteria {
        status: "all".into(),
        priority: "all".into(),
        assigned_to: "all".into(),
        created_by: "all".into(),
        ..Default::default()
    };
    assert_eq!(filter_tasks_with_criteria(&tasks, &sentinels), tasks);
}

#[test]
fn filtering_is_idempotent() {
    let tasks = backlog();
    let filter = TaskFilter::default()
        .with_search("auth")
        .with_status(TaskStatus::Pending);
    let once = filter_tasks(&tasks, &filter);
    let twice = filter_tasks(&once, &filter);
    assert_eq!(once, twice);
}

#[test]
fn fields_combine_with_and() {
    let tasks = backlog();
    let by_search = TaskFilter::default().with_search("auth");
    let by_assignee = TaskFilter::default().with_assignee(AssigneeFilter::User(10));
    let both = TaskFilter::default()
        .with_search("auth")
        .with_assignee(AssigneeFilter::User(10));

    let search_ids = ids(&filter_tasks(&tasks, &by_search));
    let assignee_ids = ids(&filter_tasks(&tasks, &by_assignee));
    let intersection: Vec<i64> = search_ids
        .iter()
        .copied()
        .filter(|id| assignee_ids.contains(id))
        .collect();

    assert_eq!(search_ids, vec![1, 2]);
    assert_eq!(assignee_ids, vec![1, 4]);
    assert_eq!(ids(&filter_tasks(&tasks, &both)), intersection);
    assert_eq!(intersection, vec![1]);
}

#[test]
fn result_keeps_input_order() {
    let mut tasks = backlog();
    tasks.reverse();
    let pending = TaskFilter::default().with_status(TaskStatus::Pending);
    assert_eq!(ids(&filter_tasks(&tasks, &pending)), vec![3, 2]);
}

#[test]
fn search_is_case_insensitive_over_title_and_description() {
    let tasks = backlog();
    let result = filter_tasks(&tasks, &TaskFilter::default().with_search("AUTH"));
    // Title match and description match
    assert_eq!(ids(&result), vec![1, 2]);

    let criteria = FilterCriteria {
        search: "auth".into(),
        ..Default::default()
    };
    assert_eq!(ids(&filter_tasks_with_criteria(&tasks, &criteria)), vec![1, 2]);
}

#[test]
fn search_tolerates_missing_description() {
    let tasks = backlog();
    let result = filter_tasks(&tasks, &TaskFilter::default().with_search("archive"));
    assert_eq!(ids(&result), vec![5]);
}

#[test]
fn priority_filter() {
    let tasks = backlog();
    let criteria = FilterCriteria {
        priority: "urgent".into(),
        ..Default::default()
    };
    assert_eq!(ids(&filter_tasks_with_criteria(&tasks, &criteria)), vec![3]);
}

#[test]
fn unassigned_sentinel() {
    let tasks = backlog();
    let unassigned = FilterCriteria {
        assigned_to: "unassigned".into(),
        ..Default::default()
    };
    assert_eq!(ids(&filter_tasks_with_criteria(&tasks, &unassigned)), vec![3, 5]);

    for assignee in [10, 11] {
        let concrete = TaskFilter::default().with_assignee(AssigneeFilter::User(assignee));
        let result = filter_tasks(&tasks, &concrete);
        assert!(result.iter().all(|t| t.assigned_to == Some(assignee)));
        assert!(!ids(&result).contains(&3));
    }
}

#[test]
fn creator_filter() {
    let tasks = backlog();
    let criteria = FilterCriteria {
        created_by: "10".into(),
        ..Default::default()
    };
    assert_eq!(ids(&filter_tasks_with_criteria(&tasks, &criteria)), vec![1, 2]);
}

#[test]
fn tasks_without_due_date_leave_once_a_bound_is_set() {
    let tasks = backlog();

    let from_only = FilterCriteria {
        date_from: "2000-01-01".into(),
        ..Default::default()
    };
    let to_only = FilterCriteria {
        date_to: "2100-01-01".into(),
        ..Default::default()
    };
    // Every dated task qualifies; undated 3 and 5 are dropped either way.
    assert_eq!(ids(&filter_tasks_with_criteria(&tasks, &from_only)), vec![1, 2, 4]);
    assert_eq!(ids(&filter_tasks_with_criteria(&tasks, &to_only)), vec![1, 2, 4]);
}

#[test]
fn date_range_is_inclusive_on_calendar_days() {
    let tasks = backlog();
    // Task 1 is due 2024-05-10 at 15:30; both bounds on the same day keep it.
    let same_day = TaskFilter::default().with_due_range(Some(date(2024, 5, 10)), Some(date(2024, 5, 10)));
    assert_eq!(ids(&filter_tasks(&tasks, &same_day)), vec![1]);

    let may = TaskFilter::default().with_due_range(Some(date(2024, 5, 1)), Some(date(2024, 5, 31)));
    assert_eq!(ids(&filter_tasks(&tasks, &may)), vec![1, 2]);

    let through_april = TaskFilter::default().with_due_range(None, Some(date(2024, 4, 30)));
    assert_eq!(ids(&filter_tasks(&tasks, &through_april)), vec![4]);
}

#[test]
fn malformed_date_input_is_ignored() {
    let tasks = backlog();
    let criteria = FilterCriteria {
        date_from: "not-a-date".into(),
        ..Default::default()
    };
    assert_eq!(filter_tasks_with_criteria(&tasks, &criteria), tasks);
}

#[test]
fn scenario_search_task_one() {
    let tasks = scenario_tasks();
    let criteria = FilterCriteria {
        search: "Task 1".into(),
        ..Default::default()
    };
    let result = filter_tasks_with_criteria(&tasks, &criteria);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].title, "Test Task 1");
}

#[test]
fn scenario_status_pending() {
    let tasks = scenario_tasks();
    let criteria = FilterCriteria {
        status: "pending".into(),
        ..Default::default()
    };
    let result = filter_tasks_with_criteria(&tasks, &criteria);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].status, TaskStatus::Pending);
    assert_eq!(result[0].title, "Test Task 1");
}

#[test]
fn input_collection_is_untouched() {
    let tasks = backlog();
    let before = tasks.clone();
    let _ = filter_tasks(&tasks, &TaskFilter::default().with_status(TaskStatus::Completed));
    assert_eq!(tasks, before);
}

// ============================================================================
// Stats
// ============================================================================

#[test]
fn stats_ignore_active_filters() {
    let tasks = vec![
        task(1, "A", TaskStatus::Completed),
        task(2, "B", TaskStatus::Pending),
        task(3, "C", TaskStatus::Completed),
    ];
    let filter = TaskFilter::default()
        .with_search("A")
        .with_status(TaskStatus::Completed);
    let visible = filter_tasks(&tasks, &filter);
    assert_eq!(visible.len(), 1);

    let stats = compute_stats(&tasks, None);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.in_progress, 0);
}

#[test]
fn stats_count_assigned_to_current_user() {
    let stats = compute_stats(&backlog(), Some(10));
    assert_eq!(stats.total, 5);
    assert_eq!(stats.assigned_to_me, 2);
    assert_eq!(stats.cancelled, 1);
}

// ============================================================================
// Facets
// ============================================================================

#[test]
fn facets_deduplicate_assignees_and_drop_nulls() {
    let assignees = [Some(1), Some(1), Some(2), None];
    let tasks: Vec<Task> = assignees
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let mut t = task(i as i64 + 1, "T", TaskStatus::Pending);
            t.assigned_to = *a;
            t
        })
        .collect();

    let facets = extract_facets(&tasks, &[]);
    let ids: Vec<UserId> = facets.assignees.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn facets_resolve_against_roster() {
    let users = vec![
        user(10, "ana", Some("Ana Diaz")),
        user(11, "bo", None),
    ];
    let facets = extract_facets(&backlog(), &users);

    let creators: Vec<&str> = facets.creators.iter().map(|f| f.display_name.as_str()).collect();
    assert_eq!(creators, vec!["Ana Diaz", "bo", "12", "1"]);

    let assignees: Vec<&str> = facets.assignees.iter().map(|f| f.display_name.as_str()).collect();
    assert_eq!(assignees, vec!["Ana Diaz", "bo"]);
}
