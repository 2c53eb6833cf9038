//! Distinct creators and assignees for populating filter selectors.

use crate::types::{Task, User, UserId, user_initials};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One selectable user in a filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub id: UserId,
    pub display_name: String,
    /// Username when the id resolved against the roster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Avatar initials for the selector entry.
    pub initials: String,
}

impl Facet {
    fn resolve(id: UserId, roster: &HashMap<UserId, &User>) -> Self {
        match roster.get(&id) {
            Some(user) => Facet {
                id,
                display_name: user.display_name().to_string(),
                username: Some(user.username.clone()),
                initials: user_initials(user.full_name.as_deref(), &user.username),
            },
            None => {
                let raw = id.to_string();
                Facet {
                    id,
                    initials: user_initials(None, &raw),
                    display_name: raw,
                    username: None,
                }
            }
        }
    }
}

/// Creator and assignee options present in a task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub creators: Vec<Facet>,
    pub assignees: Vec<Facet>,
}

/// Collect distinct, non-null creators and assignees in first-seen order.
pub fn extract_facets(tasks: &[Task], users: &[User]) -> Facets {
    let roster: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();

    Facets {
        creators: distinct(tasks.iter().filter_map(|t| t.created_by))
            .map(|id| Facet::resolve(id, &roster))
            .collect(),
        assignees: distinct(tasks.iter().filter_map(|t| t.assigned_to))
            .map(|id| Facet::resolve(id, &roster))
            .collect(),
    }
}

fn distinct(ids: impl Iterator<Item = UserId>) -> impl Iterator<Item = UserId> {
    let mut seen = HashSet::new();
    ids.filter(move |id| seen.insert(*id))
}
