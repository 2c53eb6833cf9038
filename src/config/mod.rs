//! Layered configuration.
//!
//! Each layer overrides only the settings it names, bottom to top:
//! 1. **Built-in** defaults
//! 2. **Project** `./taskboard/config.yaml`
//! 3. **Home** `~/.taskboard/config.yaml`
//! 4. **Env** `TASKBOARD_*` variables
//!
//! ## Environment Variables
//! - `TASKBOARD_CONFIG_PATH` - Explicit config file (replaces the project and home layers)
//! - `TASKBOARD_PROJECT_DIR` - Project config dir (default: `./taskboard`)
//! - `TASKBOARD_USER_DIR` - User config dir (default: `~/.taskboard`)
//! - `TASKBOARD_PORT`, `TASKBOARD_BIND` - Dashboard API address
//! - `TASKBOARD_SNAPSHOT` - Snapshot file with tasks and users
//! - `TASKBOARD_CURRENT_USER` - Id of the user viewing the dashboard
//! - `TASKBOARD_LOG_LEVEL` - `tracing` filter directive

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLayer, ConfigLoader, ConfigPaths};
pub use merge::{merge_layers, overlay};
pub use types::*;
