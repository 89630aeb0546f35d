use crate::client::Client;
use crate::output::print_json;
use anyhow::Result;
use collab_core::hash;

pub fn run(path: Option<&str>, all: bool) -> Result<()> {
    let plan_path = super::resolve_target(path)?;
    let plan_id = hash::plan_id(&plan_path);

    let client = Client::from_config();
    let response = if all {
        client.get(&format!("/api/plans/{plan_id}/feedback"))?
    } else {
        client.get(&format!("/api/plans/{plan_id}/feedback/pending"))?
    };

    print_json(&response)
}
