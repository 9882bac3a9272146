//! Seat availability lookup

use super::{parse_date, Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Reports how many seats are still free on a date
pub struct CheckAvailabilityTool;

#[derive(Debug, Deserialize)]
struct CheckAvailabilityInput {
    date: String,
}

#[async_trait]
impl Tool for CheckAvailabilityTool {
    fn name(&self) -> &'static str {
        "check_availability"
    }

    fn description(&self) -> String {
        "Get the number of available reservable seats on that date".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["date"],
            "properties": {
                "date": {
                    "type": "string",
                    "description": "Date on which the customer wants to make a reservation, formatted YYYY-MM-DD"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> ToolOutput {
        let input: CheckAvailabilityInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };
        let date = match parse_date("date", &input.date) {
            Ok(date) => date,
            Err(e) => return ToolOutput::error(e),
        };

        let seats = ctx.inventory().available(date);
        ToolOutput::success(json!({ "date": date.to_string(), "available_seats": seats }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::context_with_capacity;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_reports_remaining_seats() {
        let ctx = context_with_capacity(15);
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        ctx.inventory().reserve(date, 5, "Sam").unwrap();

        let result = CheckAvailabilityTool
            .run(json!({"date": "2026-10-20"}), &ctx)
            .await;
        assert!(result.success);
        let parsed: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(parsed["available_seats"], 10);
    }

    #[tokio::test]
    async fn test_bad_date_is_error_result() {
        let ctx = context_with_capacity(15);
        let result = CheckAvailabilityTool.run(json!({"date": "next friday"}), &ctx).await;
        assert!(!result.success);

        let result = CheckAvailabilityTool.run(json!({}), &ctx).await;
        assert!(!result.success);
        assert!(result.output.starts_with("Invalid input"));
    }
}
