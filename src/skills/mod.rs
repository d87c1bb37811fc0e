//! Skills module - goal-level capabilities and first-match dispatch
//!
//! A skill decides whether it accepts a free-text goal and, if so, turns it
//! into exactly one [`ActionResult`]. The [`SkillDispatcher`] asks skills in
//! registration order and runs only the first that accepts.
//!
//! ## Adding a New Skill
//!
//! 1. Create a new file in `src/skills/` (e.g., `my_skill.rs`)
//! 2. Implement the `Skill` trait
//! 3. Add `mod my_skill;` and `pub use` in this file
//! 4. Register it in `AgentRuntime::start`

mod calculator;
mod dispatcher;
pub mod osquery;
mod search;
mod summarize;
mod traits;
mod weather;

pub use calculator::CalculatorSkill;
pub use dispatcher::{ExecutionTrace, SkillDispatcher, NO_SKILL};
pub use osquery::osquery_skill;
pub use search::MockSearchSkill;
pub use summarize::SummarizeSkill;
pub use traits::{goal_payload, ActionResult, Skill};
pub use weather::WeatherSkill;
