use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::{Booking, BookingStatus};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("booking not found: {0}")]
    NotFound(String),

    #[error("duplicate PNR: {0}")]
    DuplicatePnr(String),
}

/// Append-only booking store keyed by PNR.
///
/// Bookings are never physically deleted; listing preserves insertion
/// order. The ledger guards itself — callers do not need to hold any
/// flight lock to read it.
pub struct BookingLedger {
    inner: RwLock<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    order: Vec<String>,
    bookings: HashMap<String, Booking>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerInner::default()),
        }
    }

    /// Insert a new booking. A duplicate PNR is surfaced, never silently
    /// overwritten.
    pub fn record(&self, booking: Booking) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        if inner.bookings.contains_key(&booking.pnr) {
            return Err(LedgerError::DuplicatePnr(booking.pnr.clone()));
        }
        inner.order.push(booking.pnr.clone());
        inner.bookings.insert(booking.pnr.clone(), booking);
        Ok(())
    }

    pub fn get(&self, pnr: &str) -> Result<Booking, LedgerError> {
        self.inner
            .read()
            .bookings
            .get(pnr)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(pnr.to_string()))
    }

    /// Full booking history, insertion order, all statuses.
    pub fn list(&self) -> Vec<Booking> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .map(|pnr| inner.bookings[pnr].clone())
            .collect()
    }

    /// Transition a booking's status in place. Legality of the transition
    /// is the caller's responsibility.
    pub fn update_status(&self, pnr: &str, status: BookingStatus) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        let booking = inner
            .bookings
            .get_mut(pnr)
            .ok_or_else(|| LedgerError::NotFound(pnr.to_string()))?;
        booking.status = status;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}
