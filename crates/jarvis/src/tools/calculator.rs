use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ToolError, ToolResult};
use super::Tool;

lazy_static! {
    static ref SAFE_EXPRESSION: Regex = Regex::new(r"^[0-9+\-*/%^().,\sA-Za-z_]*$").unwrap();
}

/// Evaluates arithmetic expressions such as `(2 + 3) * 4 / 5` or `sqrt(16)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    pub fn evaluate(expression: &str) -> ToolResult<String> {
        // Models like to wrap the expression in quotes or backticks
        let expression = expression.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
        if expression.trim().is_empty() {
            return Err(ToolError::InvalidParameters(
                "an expression is required".to_string(),
            ));
        }
        if !SAFE_EXPRESSION.is_match(expression) {
            return Err(ToolError::InvalidParameters(format!(
                "'{}' contains unsupported characters",
                expression
            )));
        }

        let value = meval::eval_str(expression)
            .map_err(|e| ToolError::ExecutionError(format!("could not evaluate '{}': {}", expression, e)))?;
        format_number(value)
    }
}

fn format_number(value: f64) -> ToolResult<String> {
    if !value.is_finite() {
        return Err(ToolError::ExecutionError(format!(
            "the result is not a finite number ({})",
            value
        )));
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Ok(format!("{}", value as i64))
    } else {
        Ok(value.to_string())
    }
}

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Useful for getting the result of a math expression. The input to this tool should be a valid mathematical expression that could be executed by a simple calculator."
    }

    async fn invoke(&self, input: &str) -> ToolResult<String> {
        Self::evaluate(input)
    }
}
