//! Summarize skill - first sentence or a truncated prefix

use async_trait::async_trait;

use super::traits::{goal_payload, ActionResult, Skill};

const NAME: &str = "summarize";

/// First sentences shorter than this (in chars) are returned whole
const SENTENCE_LIMIT: usize = 200;
/// Length of the truncated prefix for long text without an early sentence end
const PREFIX_CHARS: usize = 120;

pub struct SummarizeSkill;

/// Reduce `text` to its first sentence, or a 120 char prefix when it is long
pub fn summarize(text: &str) -> String {
    let period = text.chars().position(|c| c == '.');
    if let Some(idx) = period.filter(|&i| i > 0 && i < SENTENCE_LIMIT) {
        let sentence: String = text.chars().take(idx + 1).collect();
        return sentence.trim().to_string();
    }

    if text.chars().count() > PREFIX_CHARS {
        let prefix: String = text.chars().take(PREFIX_CHARS).collect();
        format!("{}...", prefix.trim())
    } else {
        text.to_string()
    }
}

#[async_trait]
impl Skill for SummarizeSkill {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Summarize a piece of text. Example: 'summarize: <text>'"
    }

    fn can_handle(&self, goal: &str) -> bool {
        let g = goal.to_lowercase();
        g.contains("summarize") || g.contains("summary") || g.contains("summarise")
    }

    async fn execute(&self, goal: &str) -> ActionResult {
        let text = goal_payload(goal);
        if text.is_empty() {
            return ActionResult::failure(NAME, "No text to summarize");
        }
        ActionResult::success(NAME, summarize(text))
    }
}
