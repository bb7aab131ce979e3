use std::collections::BTreeMap;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Occupancy state of a single seat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Free,
    Occupied,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SeatError {
    #[error("unknown seat label: {0}")]
    InvalidSeat(String),

    #[error("seat already occupied: {0}")]
    AlreadyOccupied(String),
}

/// Per-flight seat occupancy map.
///
/// Cardinality is fixed at creation; labels are unique within a flight.
/// Mutation is only reachable through the flight's exclusive section
/// ([`Flight::lock_seats`]), so callers cannot reserve or release a seat
/// without holding the lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMap {
    seats: BTreeMap<String, SeatState>,
}

impl SeatMap {
    /// Build a seat map from explicit labels, all free.
    pub fn from_labels(labels: impl IntoIterator<Item = String>) -> Self {
        Self {
            seats: labels
                .into_iter()
                .map(|label| (label, SeatState::Free))
                .collect(),
        }
    }

    /// Build a cabin grid, e.g. `grid(4, &['A', 'B', 'C', 'D'])` yields
    /// seats 1A through 4D.
    pub fn grid(rows: u32, letters: &[char]) -> Self {
        Self::from_labels(
            (1..=rows).flat_map(|row| letters.iter().map(move |letter| format!("{row}{letter}"))),
        )
    }

    /// Total number of seats on the flight.
    pub fn total(&self) -> usize {
        self.seats.len()
    }

    /// Number of currently free seats.
    pub fn available(&self) -> usize {
        self.seats
            .values()
            .filter(|state| **state == SeatState::Free)
            .count()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.seats.contains_key(label)
    }

    pub fn state(&self, label: &str) -> Option<SeatState> {
        self.seats.get(label).copied()
    }

    /// Iterate seats in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SeatState)> {
        self.seats.iter().map(|(label, state)| (label.as_str(), *state))
    }

    /// Mark a free seat occupied.
    pub fn try_reserve(&mut self, label: &str) -> Result<(), SeatError> {
        match self.seats.get_mut(label) {
            None => Err(SeatError::InvalidSeat(label.to_string())),
            Some(state @ SeatState::Free) => {
                *state = SeatState::Occupied;
                Ok(())
            }
            Some(SeatState::Occupied) => Err(SeatError::AlreadyOccupied(label.to_string())),
        }
    }

    /// Mark a seat free. Idempotent for seats that are already free;
    /// cancelling an already-cancelled booking is rejected upstream, not here.
    pub fn release(&mut self, label: &str) -> Result<(), SeatError> {
        match self.seats.get_mut(label) {
            None => Err(SeatError::InvalidSeat(label.to_string())),
            Some(state) => {
                *state = SeatState::Free;
                Ok(())
            }
        }
    }
}

/// A scheduled flight and its seat inventory.
///
/// Created at seeding, never deleted. The seat map is guarded by the
/// flight's own mutex — the exclusive section all booking and cancellation
/// work for this flight serializes on.
#[derive(Debug)]
pub struct Flight {
    pub id: Uuid,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    /// Scheduled date as `YYYY-MM-DD`. Kept raw: an unparseable date
    /// degrades to the pricing fallback instead of failing the flight.
    pub departure_date: String,
    pub base_fare: f64,
    seats: Mutex<SeatMap>,
}

impl Flight {
    pub fn new(
        airline: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: impl Into<String>,
        base_fare: f64,
        seats: SeatMap,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            airline: airline.into(),
            origin: origin.into(),
            destination: destination.into(),
            departure_date: departure_date.into(),
            base_fare,
            seats: Mutex::new(seats),
        }
    }

    /// Enter the flight's exclusive section.
    ///
    /// Held only for bounded local computation — no I/O while locked.
    pub fn lock_seats(&self) -> MutexGuard<'_, SeatMap> {
        self.seats.lock()
    }

    /// Current free-seat count.
    pub fn seats_available(&self) -> usize {
        self.seats.lock().available()
    }
}
