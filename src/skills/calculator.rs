//! Calculator skill
//!
//! Evaluates a single binary arithmetic expression such as `10 + 5`.

use async_trait::async_trait;
use regex::Regex;

use super::traits::{goal_payload, ActionResult, Skill};

const NAME: &str = "calculator";

/// Skill for simple `<number> <op> <number>` arithmetic
pub struct CalculatorSkill {
    expression: Regex,
    digit_plus: Regex,
}

impl CalculatorSkill {
    pub fn new() -> Self {
        CalculatorSkill {
            expression: Regex::new(
                r"([-+]?[0-9]*\.?[0-9]+)\s*([+\-*/])\s*([-+]?[0-9]*\.?[0-9]+)",
            )
            .expect("static regex"),
            digit_plus: Regex::new(r"\d\+").expect("static regex"),
        }
    }

    fn evaluate(&self, expr: &str) -> Option<Result<f64, String>> {
        let caps = self.expression.captures(expr)?;
        Some(apply(&caps[1], &caps[2], &caps[3]))
    }
}

fn parse_operand(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|e| format!("invalid number '{}': {}", text, e))
}

fn apply(left: &str, op: &str, right: &str) -> Result<f64, String> {
    let a = parse_operand(left)?;
    let b = parse_operand(right)?;
    Ok(match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        _ if b == 0.0 => f64::NAN,
        _ => a / b,
    })
}

impl Default for CalculatorSkill {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a double: integral values of any magnitude keep one decimal
/// (`15.0`, `10000000.0`), others print their shortest round-trip form
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[async_trait]
impl Skill for CalculatorSkill {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Evaluate a simple arithmetic expression (+, -, *, /). Example: 'calculate: 10 + 5'"
    }

    fn can_handle(&self, goal: &str) -> bool {
        let g = goal.to_lowercase();
        g.contains("calculate")
            || g.contains("compute")
            || (g.contains("sum") && !g.contains("summarize") && !g.contains("summarise"))
            || self.digit_plus.is_match(&g)
    }

    async fn execute(&self, goal: &str) -> ActionResult {
        match self.evaluate(goal_payload(goal)) {
            Some(Ok(value)) => ActionResult::success(NAME, format_number(value)),
            Some(Err(e)) => ActionResult::failure(NAME, format!("Error evaluating expression: {}", e)),
            None => ActionResult::failure(NAME, format!("No simple expression found in: {}", goal)),
        }
    }
}
