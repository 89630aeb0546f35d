use crate::client::Client;
use crate::output::print_json;
use anyhow::Result;
use collab_core::config::Config;
use collab_core::feedback;

pub fn run() -> Result<()> {
    let config = Config::load();
    let client = Client::from_config();

    let server = match client.get("/api/health") {
        Ok(health) => serde_json::json!({
            "running": true,
            "url": client.base_url(),
            "activePlan": health["activePlan"],
            "queueSize": health["queueSize"],
            "sseClients": health["sseClients"],
        }),
        Err(e) => serde_json::json!({
            "running": false,
            "url": client.base_url(),
            "error": format!("{e:#}"),
        }),
    };

    let plan = match config.active_plan.as_deref() {
        Some(path) => {
            let plan_path = std::path::Path::new(path);
            let exists = plan_path.is_file();
            let summary = exists.then(|| {
                let sidecar = feedback::load(plan_path);
                feedback::summarize(&sidecar)
            });
            serde_json::json!({
                "active": true,
                "path": path,
                "exists": exists,
                "lastSync": config.last_sync,
                "feedback": summary,
            })
        }
        None => serde_json::json!({ "active": false }),
    };

    print_json(&serde_json::json!({ "server": server, "plan": plan }))
}
