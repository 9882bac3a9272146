//! Booking, changing and cancelling reservations

use super::{parse_date, Tool, ToolContext, ToolOutput};
use crate::inventory::{InventoryError, Reservation};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolOutput> {
    serde_json::from_value(input).map_err(|e| ToolOutput::error(format!("Invalid input: {e}")))
}

fn confirmed(status: &str, reservation: &Reservation) -> ToolOutput {
    ToolOutput::success(
        json!({
            "status": status,
            "reservation_id": reservation.id,
            "name": reservation.name,
            "date": reservation.date.to_string(),
            "seats": reservation.seats,
        })
        .to_string(),
    )
}

fn refused(err: &InventoryError) -> ToolOutput {
    tracing::info!(reason = %err, "Reservation request refused");
    ToolOutput::error(err.to_string())
}

// ============================================================================
// create_reservation
// ============================================================================

/// Books seats on a date for a named customer
pub struct CreateReservationTool;

#[derive(Debug, Deserialize)]
struct CreateReservationInput {
    date: String,
    seats: u32,
    name: String,
}

#[async_trait]
impl Tool for CreateReservationTool {
    fn name(&self) -> &'static str {
        "create_reservation"
    }

    fn description(&self) -> String {
        "Make a new reservation using the date, number of seats and name of customer".to_string()
    }

    fn mutates(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["date", "seats", "name"],
            "properties": {
                "date": {
                    "type": "string",
                    "description": "Date on which the customer wants to make a reservation, formatted YYYY-MM-DD"
                },
                "seats": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Number of seats to be reserved on the specified date"
                },
                "name": {
                    "type": "string",
                    "description": "Name of the customer making a reservation"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> ToolOutput {
        let input: CreateReservationInput = match parse_input(input) {
            Ok(input) => input,
            Err(output) => return output,
        };
        let date = match parse_date("date", &input.date) {
            Ok(date) => date,
            Err(e) => return ToolOutput::error(e),
        };

        match ctx.inventory().reserve(date, input.seats, &input.name) {
            Ok(reservation) => confirmed("booked", &reservation),
            Err(e) => refused(&e),
        }
    }
}

// ============================================================================
// edit_reservation
// ============================================================================

/// Moves an existing reservation to another date and/or party size
pub struct EditReservationTool;

#[derive(Debug, Deserialize)]
struct EditReservationInput {
    name: String,
    old_date: String,
    new_date: String,
    seats: u32,
}

#[async_trait]
impl Tool for EditReservationTool {
    fn name(&self) -> &'static str {
        "edit_reservation"
    }

    fn description(&self) -> String {
        "Modify an existing reservation, found by name and current date, to a new date and number of seats".to_string()
    }

    fn mutates(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["name", "old_date", "new_date", "seats"],
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name on which the reservation is"
                },
                "old_date": {
                    "type": "string",
                    "description": "The date of the current reservation, formatted YYYY-MM-DD"
                },
                "new_date": {
                    "type": "string",
                    "description": "The date on which the reservation will be, formatted YYYY-MM-DD"
                },
                "seats": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "The number of seats to reserve"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> ToolOutput {
        let input: EditReservationInput = match parse_input(input) {
            Ok(input) => input,
            Err(output) => return output,
        };
        let dates = parse_date("old_date", &input.old_date)
            .and_then(|old| parse_date("new_date", &input.new_date).map(|new| (old, new)));
        let (old_date, new_date) = match dates {
            Ok(dates) => dates,
            Err(e) => return ToolOutput::error(e),
        };

        match ctx
            .inventory()
            .modify(&input.name, old_date, new_date, input.seats)
        {
            Ok(reservation) => confirmed("modified", &reservation),
            Err(e) => refused(&e),
        }
    }
}

// ============================================================================
// cancel_reservation
// ============================================================================

/// Cancels a reservation found by name and date
pub struct CancelReservationTool;

#[derive(Debug, Deserialize)]
struct CancelReservationInput {
    name: String,
    date: String,
}

#[async_trait]
impl Tool for CancelReservationTool {
    fn name(&self) -> &'static str {
        "cancel_reservation"
    }

    fn description(&self) -> String {
        "Cancel an existing reservation using the name of the customer and the date".to_string()
    }

    fn mutates(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["name", "date"],
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name on which the reservation is"
                },
                "date": {
                    "type": "string",
                    "description": "The date of the reservation, formatted YYYY-MM-DD"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> ToolOutput {
        let input: CancelReservationInput = match parse_input(input) {
            Ok(input) => input,
            Err(output) => return output,
        };
        let date = match parse_date("date", &input.date) {
            Ok(date) => date,
            Err(e) => return ToolOutput::error(e),
        };

        match ctx.inventory().cancel(&input.name, date) {
            Ok(reservation) => confirmed("cancelled", &reservation),
            Err(e) => refused(&e),
        }
    }
}
