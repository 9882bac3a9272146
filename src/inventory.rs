//! In-memory seat inventory
//!
//! Each calendar date starts with the same capacity. Every booking, change and
//! cancellation is a single check-and-update under one lock, so the remaining
//! count of a date can never drop below zero.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Seats per date when no capacity is configured
pub const DEFAULT_CAPACITY: u32 = 15;

/// A confirmed booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub seats: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("A reservation needs at least one seat")]
    NoSeats,
    #[error("A reservation needs a name")]
    MissingName,
    #[error("Only {remaining} seats left on {date}, cannot book {requested}")]
    InsufficientSeats {
        date: NaiveDate,
        requested: u32,
        remaining: u32,
    },
    #[error("No reservation for {name} on {date}")]
    NotFound { name: String, date: NaiveDate },
}

#[derive(Debug, Default)]
struct Ledger {
    booked: HashMap<NaiveDate, u32>,
    reservations: Vec<Reservation>,
}

impl Ledger {
    fn remaining(&self, capacity: u32, date: NaiveDate) -> u32 {
        capacity.saturating_sub(self.booked.get(&date).copied().unwrap_or(0))
    }

    fn position(&self, name: &str, date: NaiveDate) -> Option<usize> {
        let wanted = normalize_name(name);
        self.reservations
            .iter()
            .position(|r| r.date == date && normalize_name(&r.name) == wanted)
    }

    fn release(&mut self, date: NaiveDate, seats: u32) {
        if let Some(booked) = self.booked.get_mut(&date) {
            *booked = booked.saturating_sub(seats);
            if *booked == 0 {
                self.booked.remove(&date);
            }
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Per-date seat counter shared by the reservation tools
#[derive(Debug)]
pub struct SeatInventory {
    capacity: u32,
    ledger: Mutex<Ledger>,
}

impl SeatInventory {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        // Mutations only happen after all checks pass
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seats still free on `date`
    pub fn available(&self, date: NaiveDate) -> u32 {
        self.ledger().remaining(self.capacity, date)
    }

    /// Book `seats` on `date` for `name`
    pub fn reserve(
        &self,
        date: NaiveDate,
        seats: u32,
        name: &str,
    ) -> Result<Reservation, InventoryError> {
        let name = name.trim();
        if seats == 0 {
            return Err(InventoryError::NoSeats);
        }
        if name.is_empty() {
            return Err(InventoryError::MissingName);
        }

        let mut ledger = self.ledger();
        let remaining = ledger.remaining(self.capacity, date);
        if seats > remaining {
            return Err(InventoryError::InsufficientSeats {
                date,
                requested: seats,
                remaining,
            });
        }

        *ledger.booked.entry(date).or_insert(0) += seats;
        let reservation = Reservation {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            date,
            seats,
        };
        ledger.reservations.push(reservation.clone());

        tracing::info!(
            id = %reservation.id,
            %date,
            seats,
            remaining = remaining - seats,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Cancel the reservation held by `name` on `date`
    pub fn cancel(&self, name: &str, date: NaiveDate) -> Result<Reservation, InventoryError> {
        let mut ledger = self.ledger();
        let index = ledger
            .position(name, date)
            .ok_or_else(|| InventoryError::NotFound {
                name: name.trim().to_string(),
                date,
            })?;

        let reservation = ledger.reservations.remove(index);
        ledger.release(date, reservation.seats);

        tracing::info!(id = %reservation.id, %date, seats = reservation.seats, "Reservation cancelled");
        Ok(reservation)
    }

    /// Move the reservation held by `name` on `old_date` to `new_date` with
    /// `seats` seats. Nothing changes when the new date cannot take it.
    pub fn modify(
        &self,
        name: &str,
        old_date: NaiveDate,
        new_date: NaiveDate,
        seats: u32,
    ) -> Result<Reservation, InventoryError> {
        if seats == 0 {
            return Err(InventoryError::NoSeats);
        }

        let mut ledger = self.ledger();
        let index = ledger
            .position(name, old_date)
            .ok_or_else(|| InventoryError::NotFound {
                name: name.trim().to_string(),
                date: old_date,
            })?;

        let held = ledger.reservations[index].seats;
        let mut remaining = ledger.remaining(self.capacity, new_date);
        if new_date == old_date {
            remaining += held;
        }
        if seats > remaining {
            return Err(InventoryError::InsufficientSeats {
                date: new_date,
                requested: seats,
                remaining,
            });
        }

        ledger.release(old_date, held);
        *ledger.booked.entry(new_date).or_insert(0) += seats;
        let reservation = &mut ledger.reservations[index];
        reservation.date = new_date;
        reservation.seats = seats;
        let updated = reservation.clone();

        tracing::info!(
            id = %updated.id,
            %old_date,
            %new_date,
            seats,
            "Reservation modified"
        );
        Ok(updated)
    }
}

#[cfg(test)]
impl SeatInventory {
    /// Snapshot of current reservations in booking order
    pub fn reservations(&self) -> Vec<Reservation> {
        self.ledger().reservations.clone()
    }
}

impl Default for SeatInventory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
