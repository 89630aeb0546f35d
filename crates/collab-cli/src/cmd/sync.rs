use crate::client::Client;
use crate::output::print_json;
use anyhow::{anyhow, Result};
use collab_core::config::Config;

pub fn run(path: Option<&str>) -> Result<()> {
    let plan_path = super::resolve_target(path)?;
    let content = std::fs::read_to_string(&plan_path)
        .map_err(|_| anyhow!("Plan file not found: {}", plan_path.display()))?;

    let client = Client::from_config();
    let synced = client.post(
        "/api/plans/sync",
        &serde_json::json!({
            "planPath": plan_path.to_string_lossy(),
            "content": content,
            "contentHash": collab_core::hash::content_hash(&content),
        }),
    )?;

    let mut config = Config::load();
    config.active_plan = Some(plan_path.to_string_lossy().to_string());
    config.last_sync = Some(chrono::Utc::now());
    if let Err(e) = config.save() {
        tracing::warn!("could not record sync time: {e}");
    }

    print_json(&synced)
}
