use crate::client::Client;
use crate::output::print_json;
use anyhow::{anyhow, Context, Result};
use collab_core::feedback::QuestionOption;
use collab_core::hash;

pub fn run(
    path: &str,
    text: &str,
    context: Option<&str>,
    options: Option<&str>,
    multi: bool,
) -> Result<()> {
    if text.trim().is_empty() {
        return Err(anyhow!("question text must not be empty"));
    }

    let plan_path = collab_core::paths::resolve_plan_path(path);
    let plan_id = hash::plan_id(&plan_path);

    let options: Option<Vec<QuestionOption>> = options
        .map(|raw| serde_json::from_str(raw).context("invalid --options JSON"))
        .transpose()?;

    let client = Client::from_config();
    let response = client.post(
        &format!("/api/plans/{plan_id}/questions"),
        &serde_json::json!({
            "questionText": text,
            "context": context.unwrap_or_default(),
            "options": options,
            "multiSelect": multi,
        }),
    )?;

    print_json(&response)
}
