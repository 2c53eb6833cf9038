//! CLI command definitions for taskboard.
//!
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::engine::FilterCriteria;
use crate::types::UserId;
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Task dashboard: filter, summarize and serve a task backlog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file with tasks and users (.json, .yaml, .yml; overrides config)
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Id of the user viewing the dashboard (overrides config and snapshot)
    #[arg(short = 'u', long, global = true)]
    pub current_user: Option<UserId>,

    /// Output format: json or markdown (overrides config)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the tasks matching the given filters
    Filter(FilterArgs),

    /// Print one task in full
    Show(ShowArgs),

    /// Print summary counts over the whole backlog
    Stats,

    /// Print the creators and assignees present in the backlog
    Facets,

    /// Serve the dashboard API (default if no subcommand given)
    Serve(ServeArgs),
}

/// Filter form fields. Omitted, empty and "all" all mean unconstrained.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Case-insensitive text searched in title and description
    #[arg(long)]
    pub search: Option<String>,

    /// pending, hold, in_progress, completed or cancelled
    #[arg(long)]
    pub status: Option<String>,

    /// low, medium, high or urgent
    #[arg(long)]
    pub priority: Option<String>,

    /// Assignee user id, or "unassigned"
    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Creator user id
    #[arg(long)]
    pub created_by: Option<String>,

    /// Earliest due date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub date_from: Option<String>,

    /// Latest due date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub date_to: Option<String>,
}

impl FilterArgs {
    pub fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            assigned_to: self.assigned_to.unwrap_or_default(),
            created_by: self.created_by.unwrap_or_default(),
            date_from: self.date_from.unwrap_or_default(),
            date_to: self.date_to.unwrap_or_default(),
        }
    }
}

/// Task selection for `show`.
#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Task id
    pub id: i64,
}

/// Dashboard API options.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long)]
    pub bind: Option<IpAddr>,
}
