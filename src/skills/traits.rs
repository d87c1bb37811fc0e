//! Core skill traits
//!
//! A Skill offers a yes/no match test against a goal string and an
//! execution that always produces exactly one [`ActionResult`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A capability provider the dispatcher can route goals to
#[async_trait]
pub trait Skill: Send + Sync {
    /// Skill name (used as the producer identity in results)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Whether this skill accepts the goal. Must not panic on any input.
    fn can_handle(&self, goal: &str) -> bool;

    /// Execute the goal. Failures are reported in the result, never raised.
    async fn execute(&self, goal: &str) -> ActionResult;
}

/// Outcome of one skill execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    /// Whether the skill succeeded
    pub success: bool,
    /// Name of the producing skill
    pub skill_name: String,
    /// Output text
    pub output: String,
}

impl ActionResult {
    /// Create a successful result
    pub fn success(skill_name: impl Into<String>, output: impl Into<String>) -> Self {
        ActionResult {
            success: true,
            skill_name: skill_name.into(),
            output: output.into(),
        }
    }

    /// Create a failed result
    pub fn failure(skill_name: impl Into<String>, output: impl Into<String>) -> Self {
        ActionResult {
            success: false,
            skill_name: skill_name.into(),
            output: output.into(),
        }
    }
}

/// The part of a goal after its first `:`, trimmed; the whole goal otherwise.
///
/// `"calculate: 2 + 3"` yields `"2 + 3"`.
pub fn goal_payload(goal: &str) -> &str {
    match goal.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => goal,
    }
}
