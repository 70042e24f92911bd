//! Configuration.
//!
//! Tiers, lowest to highest priority, merged field by field:
//! 1. **Defaults** - built in (`db/tasks.json`, pretty JSON, table output)
//! 2. **Project** - `$CWD/task-tracker/config.yaml`
//! 3. **User** - `~/.task-tracker/config.yaml`
//! 4. **Environment** - see below
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `TASK_TRACKER_CONFIG_PATH` - Explicit config file (replaces tiers 1-3)
//! - `TASK_TRACKER_STORE_PATH` - Store file path
//! - `TASK_TRACKER_FORMAT` - Default output format (`table`, `markdown`, `json`)
//! - `TASK_TRACKER_USER_DIR` - User config dir (default: `~/.task-tracker`)
//! - `TASK_TRACKER_PROJECT_DIR` - Project config dir (default: `./task-tracker`)

mod loader;
mod merge;
mod types;

pub use loader::{
    ConfigLoader, ConfigPaths, ConfigTier, ENV_CONFIG_PATH, ENV_FORMAT, ENV_PROJECT_DIR,
    ENV_STORE_PATH, ENV_USER_DIR,
};
pub use merge::{merge_into, merge_tiers};
pub use types::*;
