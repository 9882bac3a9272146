//! Functions the model can call from inside a branch
//!
//! Tools are stateless singletons; the inventory they act on is handed in
//! through [`ToolContext`] on every call.

mod availability;
mod reservation;

pub use availability::CheckAvailabilityTool;
pub use reservation::{CancelReservationTool, CreateReservationTool, EditReservationTool};

use crate::inventory::SeatInventory;
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Everything a tool invocation may touch
#[derive(Clone)]
pub struct ToolContext {
    pub session_id: String,
    inventory: Arc<SeatInventory>,
}

impl ToolContext {
    pub fn new(session_id: impl Into<String>, inventory: Arc<SeatInventory>) -> Self {
        Self {
            session_id: session_id.into(),
            inventory,
        }
    }

    pub fn inventory(&self) -> &SeatInventory {
        &self.inventory
    }
}

/// Trait for functions exposed to the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &'static str;

    /// Tool description for the model
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Whether a successful run changes the reservation book
    fn mutates(&self) -> bool {
        false
    }

    /// Execute the tool. Failures are reported in the output, never raised.
    async fn run(&self, input: Value, ctx: &ToolContext) -> ToolOutput;
}

/// Parse an ISO-8601 calendar date argument
pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{field} must be a date formatted YYYY-MM-DD, got '{value}'"))
}

/// Tools available to one branch
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// No functions: the branch only talks
    pub fn empty() -> Self {
        Self::default()
    }

    /// Availability lookup and booking (new reservations)
    pub fn booking() -> Self {
        Self::new(vec![
            Arc::new(CheckAvailabilityTool),
            Arc::new(CreateReservationTool),
        ])
    }

    /// Availability lookup and moving a booking (edits)
    pub fn editing() -> Self {
        Self::new(vec![
            Arc::new(CheckAvailabilityTool),
            Arc::new(EditReservationTool),
        ])
    }

    /// Cancelling a booking
    pub fn cancelling() -> Self {
        Self::new(vec![Arc::new(CancelReservationTool)])
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get all tool definitions for the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Whether `name` is a tool in this set that changes reservations
    pub fn mutates(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name && t.mutates())
    }

    /// Execute a tool by name; `None` when this branch has no such tool
    pub async fn execute(&self, name: &str, input: Value, ctx: &ToolContext) -> Option<ToolOutput> {
        for tool in &self.tools {
            if tool.name() == name {
                tracing::debug!(tool = name, session = %ctx.session_id, "Executing tool");
                return Some(tool.run(input, ctx).await);
            }
        }
        None
    }
}
