//! Mock search skill

use async_trait::async_trait;

use super::traits::{goal_payload, ActionResult, Skill};

const NAME: &str = "search";

/// Returns canned results for any query
pub struct MockSearchSkill;

#[async_trait]
impl Skill for MockSearchSkill {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Mock web search. Example: 'search: rust async'"
    }

    fn can_handle(&self, goal: &str) -> bool {
        let g = goal.to_lowercase();
        g.contains("search") || g.contains("find") || g.contains("lookup")
    }

    async fn execute(&self, goal: &str) -> ActionResult {
        let query = goal_payload(goal);
        let output = format!(
            "Mock search results for '{}':\n\
             1) Example result A - short description\n\
             2) Example result B - short description\n\
             3) Example result C - short description",
            query
        );
        ActionResult::success(NAME, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_results_echo_query() {
        let result = MockSearchSkill.execute("search: rust traits").await;
        assert!(result.success);
        assert!(result.output.starts_with("Mock search results for 'rust traits':"));
        assert_eq!(result.output.lines().count(), 4);
    }

    #[test]
    fn test_can_handle() {
        assert!(MockSearchSkill.can_handle("Find me a cafe"));
        assert!(MockSearchSkill.can_handle("LOOKUP: tokio"));
        assert!(!MockSearchSkill.can_handle("weather in Paris"));
    }
}
