//! Skill dispatcher - first-match routing of goals to skills

use serde::Serialize;
use tracing::{debug, info};

use super::traits::{ActionResult, Skill};

/// Producer name used when no skill matches
pub const NO_SKILL: &str = "none";

/// Ordered record of outcomes produced while resolving one goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExecutionTrace {
    steps: Vec<ActionResult>,
}

impl ExecutionTrace {
    fn single(result: ActionResult) -> Self {
        ExecutionTrace {
            steps: vec![result],
        }
    }

    pub fn steps(&self) -> &[ActionResult] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Last entry; a trace produced by the dispatcher is never empty
    pub fn last(&self) -> Option<&ActionResult> {
        self.steps.last()
    }

    /// Output of the last entry
    pub fn final_output(&self) -> &str {
        self.last().map(|r| r.output.as_str()).unwrap_or_default()
    }
}

/// Skills in fixed registration order
pub struct SkillDispatcher {
    skills: Vec<Box<dyn Skill>>,
}

impl Default for SkillDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillDispatcher {
    /// Create a new empty dispatcher
    pub fn new() -> Self {
        SkillDispatcher { skills: Vec::new() }
    }

    /// Register a skill after all previously registered ones
    pub fn register<S: Skill + 'static>(&mut self, skill: S) {
        self.skills.push(Box::new(skill));
    }

    /// Get a skill by name
    pub fn get(&self, name: &str) -> Option<&dyn Skill> {
        self.skills
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Skill names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name()).collect()
    }

    /// Get skill count
    pub fn count(&self) -> usize {
        self.skills.len()
    }

    /// Route a goal to the first skill that accepts it.
    ///
    /// Later skills are never consulted once one matches. A blank goal, or
    /// one nobody accepts, yields a single failed entry from `none`.
    pub async fn execute_goal(&self, goal: &str) -> ExecutionTrace {
        if !goal.trim().is_empty() {
            for skill in &self.skills {
                if skill.can_handle(goal) {
                    debug!(skill = skill.name(), "Skill accepted goal");
                    return ExecutionTrace::single(skill.execute(goal).await);
                }
            }
        }

        info!("No skill found to handle goal");
        ExecutionTrace::single(ActionResult::failure(
            NO_SKILL,
            format!("No skill found to handle goal: {}", goal),
        ))
    }
}
