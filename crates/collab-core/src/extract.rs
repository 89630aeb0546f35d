//! Pull embedded questions out of a plan's markdown so they land in the
//! Questions panel without the author re-typing them.
//!
//! Recognized forms (a leading `>` blockquote marker is tolerated):
//!
//!   [!QUESTION] Should we use REST?
//!   [!QUESTION:MULTI] Which targets do we support?
//!   - Option A
//!   - Option B - with a description
//!
//! Options are the `-`/`*` list items immediately below the marker; a blank
//! line ends the list.

use crate::feedback::{QuestionDraft, QuestionOption};
use regex::Regex;
use std::sync::OnceLock;

static MARKER_RE: OnceLock<Regex> = OnceLock::new();
static OPTION_SPLIT_RE: OnceLock<Regex> = OnceLock::new();

fn marker_re() -> &'static Regex {
    MARKER_RE.get_or_init(|| Regex::new(r"(?i)^>?\s*\[!QUESTION(?::MULTI)?\]\s*(.*)$").unwrap())
}

fn option_split_re() -> &'static Regex {
    OPTION_SPLIT_RE.get_or_init(|| Regex::new(r"^([^-]+)\s+-\s+(.+)$").unwrap())
}

/// Extract all `[!QUESTION]` blocks from markdown, in document order.
pub fn questions_from_markdown(content: &str) -> Vec<QuestionDraft> {
    let lines: Vec<&str> = content.lines().collect();
    let mut questions = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = marker_re().captures(line) else {
            continue;
        };
        let question_text = caps[1].trim().to_string();
        if question_text.is_empty() {
            continue;
        }
        let multi_select = line.to_uppercase().contains(":MULTI]");

        let mut options = Vec::new();
        for next in &lines[i + 1..] {
            let trimmed = next.trim();
            if trimmed.is_empty() {
                break;
            }
            let Some(body) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            else {
                break;
            };
            let body = body.trim();
            if let Some(split) = option_split_re().captures(body) {
                options.push(QuestionOption {
                    label: split[1].trim().to_string(),
                    description: split[2].trim().to_string(),
                });
            } else {
                options.push(QuestionOption {
                    label: body.to_string(),
                    description: String::new(),
                });
            }
        }

        questions.push(QuestionDraft {
            question_text,
            context: format!("Extracted from markdown at line {}", i + 1),
            options: if options.is_empty() {
                None
            } else {
                Some(options)
            },
            multi_select,
        });
    }

    questions
}
