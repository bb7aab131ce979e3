pub mod ledger;
pub mod models;
pub mod service;

pub use ledger::{BookingLedger, LedgerError};
pub use models::{Booking, BookingStatus, Passenger};
pub use service::{BookingError, BookingRequest, BookingService, FlightSummary};
