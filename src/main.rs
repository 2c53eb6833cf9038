//! taskboard
//!
//! Filters, summarizes and serves a task backlog loaded from a snapshot.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use taskboard::cli::{Cli, Command, ServeArgs};
use taskboard::config::{Config, ConfigLoader};
use taskboard::dashboard::{DashboardSession, start_server};
use taskboard::error::TaskboardError;
use taskboard::engine::{compute_stats, extract_facets, filter_tasks_with_criteria};
use taskboard::format::{
    OutputFormat, format_facets_markdown, format_stats_markdown, format_task_markdown,
    format_tasks_markdown,
};
use taskboard::logging::{self, LogTarget};
use taskboard::snapshot::Snapshot;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::load(cli.config.as_deref())?;
    logging::init(
        &LogTarget::parse(&cli.log),
        &loader.config().logging.level,
        cli.verbose,
    )?;
    for (layer, path) in loader.sources() {
        debug!(%layer, path = %path.display(), "Using config file");
    }

    // CLI arguments take precedence over every config tier
    let config = loader.config_mut();
    if let Some(snapshot) = &cli.snapshot {
        config.dashboard.snapshot = Some(snapshot.clone());
    }
    if let Some(user) = cli.current_user {
        config.dashboard.current_user = Some(user);
    }
    if let Some(format) = &cli.format {
        config.dashboard.default_format = OutputFormat::from_str(format)
            .ok_or_else(|| {
                TaskboardError::Config(format!("unknown output format '{}'", format))
            })?;
    }
    let config = loader.into_config();

    let snapshot = load_snapshot(&config)?;
    let current_user = config.dashboard.current_user.or(snapshot.current_user);
    let format = config.dashboard.default_format;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Filter(args) => {
            let criteria = args.into_criteria();
            let tasks = filter_tasks_with_criteria(&snapshot.tasks, &criteria);
            info!(
                matched = tasks.len(),
                total = snapshot.tasks.len(),
                "Filtered tasks"
            );
            emit(format, &tasks, || {
                format_tasks_markdown(&tasks, &snapshot.users, Utc::now())
            })?;
        }
        Command::Show(args) => {
            let task = snapshot
                .tasks
                .iter()
                .find(|t| t.id == args.id)
                .ok_or(TaskboardError::TaskNotFound(args.id))?;
            emit(format, task, || {
                format_task_markdown(task, &snapshot.users, Utc::now())
            })?;
        }
        Command::Stats => {
            let stats = compute_stats(&snapshot.tasks, current_user);
            emit(format, &stats, || format_stats_markdown(&stats))?;
        }
        Command::Facets => {
            let facets = extract_facets(&snapshot.tasks, &snapshot.users);
            emit(format, &facets, || format_facets_markdown(&facets))?;
        }
        Command::Serve(args) => {
            let bind = args.bind.unwrap_or(config.server.bind);
            let port = args.port.unwrap_or(config.server.port);
            let session = Arc::new(DashboardSession::new(
                snapshot.tasks,
                snapshot.users,
                current_user,
            ));

            let server = start_server(session, SocketAddr::new(bind, port)).await?;
            info!("Dashboard view at http://{}/api/view", server.addr);

            tokio::signal::ctrl_c().await?;
            info!("Received Ctrl-C, stopping");
            server.stop().await;
        }
    }

    Ok(())
}

fn load_snapshot(config: &Config) -> Result<Snapshot> {
    match &config.dashboard.snapshot {
        Some(path) => Ok(Snapshot::load(path)?),
        None => {
            warn!("No snapshot configured; starting with an empty task collection");
            Ok(Snapshot::default())
        }
    }
}

fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    markdown: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Markdown => print!("{}", markdown()),
    }
    Ok(())
}
