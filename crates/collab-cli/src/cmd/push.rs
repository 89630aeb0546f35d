use crate::client::Client;
use crate::output::print_json;
use anyhow::{anyhow, Result};
use collab_core::config::Config;

pub fn run(path: &str, session: Option<&str>, no_browser: bool) -> Result<()> {
    let plan_path = collab_core::paths::resolve_plan_path(path);
    if !plan_path.is_file() {
        return Err(anyhow!("Plan file not found: {}", plan_path.display()));
    }

    let client = Client::from_config();

    let registered = client.post(
        "/api/plans",
        &serde_json::json!({
            "planPath": plan_path.to_string_lossy(),
            "sessionId": session,
        }),
    )?;
    let plan_id = registered["plan"]["id"]
        .as_str()
        .ok_or_else(|| anyhow!("malformed server response: missing plan id"))?
        .to_string();
    let is_update = registered["isUpdate"].as_bool().unwrap_or(false);

    // Remember this plan as the terminal's active one.
    let mut config = Config::load();
    config.active_plan = Some(plan_path.to_string_lossy().to_string());
    config.last_sync = Some(chrono::Utc::now());
    if let Err(e) = config.save() {
        tracing::warn!("could not record active plan: {e}");
    }

    let filed = file_embedded_questions(&client, &plan_id, &plan_path);

    let url = format!(
        "{}?plan={}&sessionId={}",
        client.base_url(),
        encode_query(&plan_path.to_string_lossy()),
        encode_query(session.unwrap_or("anonymous")),
    );
    if !no_browser && !is_update {
        let _ = open::that(&url);
    }

    print_json(&serde_json::json!({
        "status": "opened",
        "planPath": plan_path.to_string_lossy(),
        "planId": plan_id,
        "isUpdate": is_update,
        "questionsFiled": filed,
        "url": url,
    }))
}

/// Extract `[!QUESTION]` blocks from the plan markdown and file any the
/// server doesn't already have. Failures are non-fatal.
fn file_embedded_questions(
    client: &Client,
    plan_id: &str,
    plan_path: &std::path::Path,
) -> usize {
    let content = match std::fs::read_to_string(plan_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("could not re-read plan for question extraction: {e}");
            return 0;
        }
    };

    let drafts = collab_core::extract::questions_from_markdown(&content);
    if drafts.is_empty() {
        return 0;
    }

    let existing: std::collections::HashSet<String> = client
        .get(&format!("/api/plans/{plan_id}/questions"))
        .ok()
        .and_then(|v| {
            v["questions"].as_array().map(|qs| {
                qs.iter()
                    .filter_map(|q| q["questionText"].as_str())
                    .map(|t| t.to_lowercase())
                    .collect()
            })
        })
        .unwrap_or_default();

    let mut filed = 0;
    for draft in drafts {
        if existing.contains(&draft.question_text.to_lowercase()) {
            continue;
        }
        match client.post(&format!("/api/plans/{plan_id}/questions"), &draft) {
            Ok(_) => filed += 1,
            Err(e) => tracing::warn!("could not file extracted question: {e}"),
        }
    }
    filed
}

/// Percent-encode a query-string value.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_path_separators() {
        assert_eq!(encode_query("/tmp/my plan.md"), "%2Ftmp%2Fmy%20plan.md");
    }

    #[test]
    fn passes_unreserved_through() {
        assert_eq!(encode_query("session-1.2_x~"), "session-1.2_x~");
    }
}
