pub mod ack;
pub mod feedback;
pub mod push;
pub mod question;
pub mod serve;
pub mod status;
pub mod sync;

use anyhow::{anyhow, Result};
use collab_core::config::Config;
use std::path::PathBuf;

/// Resolve the plan path argument, falling back to the active plan recorded
/// in `~/.plan-collab/config.json`.
pub(crate) fn resolve_target(path: Option<&str>) -> Result<PathBuf> {
    match path {
        Some(raw) => Ok(collab_core::paths::resolve_plan_path(raw)),
        None => {
            let config = Config::load();
            config
                .active_plan
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("no plan given and no active plan recorded"))
        }
    }
}
