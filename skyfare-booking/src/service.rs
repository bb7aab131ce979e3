use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skyfare_catalog::flight::{SeatError, SeatState};
use skyfare_catalog::inventory::FlightInventory;
use skyfare_catalog::pricing::PricingEngine;
use skyfare_core::payment::{PaymentGateway, PaymentOutcome, SimulatedGateway};
use skyfare_core::pnr;
use skyfare_core::random::{RandomSource, ThreadRandom};
use skyfare_core::DEFAULT_FAILURE_PROBABILITY;

use crate::ledger::{BookingLedger, LedgerError};
use crate::models::{Booking, BookingStatus, Passenger};

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum BookingError {
    #[error("flight not found: {0}")]
    FlightNotFound(Uuid),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("invalid seat {seat} for flight {flight_id}")]
    InvalidSeat { flight_id: Uuid, seat: String },

    #[error("seat {seat} on flight {flight_id} is already booked")]
    SeatAlreadyOccupied { flight_id: Uuid, seat: String },

    #[error("booking {0} is not confirmed and cannot be cancelled")]
    NotConfirmed(String),

    #[error("PNR collision: {0}")]
    DuplicatePnr(String),
}

impl BookingError {
    fn from_seat(flight_id: Uuid, error: SeatError) -> Self {
        match error {
            SeatError::InvalidSeat(seat) => Self::InvalidSeat { flight_id, seat },
            SeatError::AlreadyOccupied(seat) => Self::SeatAlreadyOccupied { flight_id, seat },
        }
    }
}

/// A booking attempt as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub flight_id: Uuid,
    pub seat: String,
    pub passenger: Passenger,
    /// Test/demo hook: forces the payment simulation to decline.
    #[serde(default)]
    pub force_payment_failure: bool,
}

/// Flight listing entry with live availability and a fresh dynamic quote.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub id: Uuid,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub base_fare: f64,
    pub available_seats: usize,
    pub dynamic_price: f64,
}

/// Orchestrates inventory, pricing, payment and the ledger.
///
/// Holds no state of its own beyond handles to the two stores. All seat
/// observation and mutation for a flight happens inside that flight's
/// exclusive section, so requests for different flights never contend.
pub struct BookingService {
    inventory: Arc<FlightInventory>,
    ledger: Arc<BookingLedger>,
    pricing: PricingEngine,
    payment: Arc<dyn PaymentGateway>,
    random: Arc<dyn RandomSource>,
}

impl BookingService {
    pub fn new(
        inventory: Arc<FlightInventory>,
        ledger: Arc<BookingLedger>,
        pricing: PricingEngine,
        payment: Arc<dyn PaymentGateway>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            inventory,
            ledger,
            pricing,
            payment,
            random,
        }
    }

    /// Service wired with thread-local randomness and the default simulated
    /// payment gateway.
    pub fn with_simulated_payment(inventory: Arc<FlightInventory>) -> Self {
        let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);
        let payment = Arc::new(SimulatedGateway::new(
            DEFAULT_FAILURE_PROBABILITY,
            random.clone(),
        ));
        Self::new(
            inventory,
            Arc::new(BookingLedger::new()),
            PricingEngine::default(),
            payment,
            random,
        )
    }

    pub fn inventory(&self) -> &Arc<FlightInventory> {
        &self.inventory
    }

    pub fn ledger(&self) -> &Arc<BookingLedger> {
        &self.ledger
    }

    /// Attempt a booking. A payment decline is a normal outcome: the
    /// booking is returned with Failed status and the seat stays free.
    pub fn create_booking(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        let flight = self
            .inventory
            .get(&request.flight_id)
            .ok_or(BookingError::FlightNotFound(request.flight_id))?;

        let mut seats = flight.lock_seats();

        match seats.state(&request.seat) {
            None => {
                return Err(BookingError::InvalidSeat {
                    flight_id: flight.id,
                    seat: request.seat,
                })
            }
            Some(SeatState::Occupied) => {
                return Err(BookingError::SeatAlreadyOccupied {
                    flight_id: flight.id,
                    seat: request.seat,
                })
            }
            Some(SeatState::Free) => {}
        }

        // Price is locked in against the availability observed inside the
        // exclusive section; later seat changes never alter it.
        let demand = self.pricing.sample_demand(self.random.as_ref());
        let days_left = self
            .pricing
            .days_until_departure(&flight.departure_date, Utc::now().date_naive());
        let price = self.pricing.price(
            flight.base_fare,
            seats.total(),
            seats.available(),
            days_left,
            demand,
        );

        let mut booking = Booking::new(
            pnr::generate(),
            flight.id,
            request.seat.clone(),
            request.passenger,
            price,
        );

        // The simulated charge is a local draw, safe inside the section. A
        // real gateway must move outside or carry a timeout.
        let outcome = if request.force_payment_failure {
            PaymentOutcome::Declined
        } else {
            self.payment.charge(&booking.pnr, price)
        };

        match outcome {
            PaymentOutcome::Approved => {
                seats
                    .try_reserve(&request.seat)
                    .map_err(|e| BookingError::from_seat(flight.id, e))?;
                booking.status = BookingStatus::Confirmed;
            }
            PaymentOutcome::Declined => {
                booking.status = BookingStatus::Failed;
            }
        }

        // Recorded before the section is released so a Confirmed ledger
        // entry always has its seat marked occupied.
        self.ledger.record(booking.clone()).map_err(|e| match e {
            LedgerError::DuplicatePnr(pnr) => BookingError::DuplicatePnr(pnr),
            LedgerError::NotFound(pnr) => BookingError::BookingNotFound(pnr),
        })?;
        drop(seats);

        tracing::info!(
            pnr = %booking.pnr,
            flight_id = %booking.flight_id,
            seat = %booking.seat,
            price = booking.price,
            status = ?booking.status,
            "booking recorded"
        );
        Ok(booking)
    }

    /// Cancel a confirmed booking, freeing its seat.
    pub fn cancel_booking(&self, pnr: &str) -> Result<Booking, BookingError> {
        let booking = self
            .ledger
            .get(pnr)
            .map_err(|_| BookingError::BookingNotFound(pnr.to_string()))?;
        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(BookingError::NotConfirmed(pnr.to_string()));
        }

        // Flights are never deleted after seeding; missing here is defensive.
        let flight = self
            .inventory
            .get(&booking.flight_id)
            .ok_or(BookingError::FlightNotFound(booking.flight_id))?;

        let mut seats = flight.lock_seats();

        // Re-check under the flight's section: every status change for this
        // booking happens while the section is held, so a racing cancel
        // cannot release the seat twice out from under a new booking.
        let mut booking = self
            .ledger
            .get(pnr)
            .map_err(|_| BookingError::BookingNotFound(pnr.to_string()))?;
        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(BookingError::NotConfirmed(pnr.to_string()));
        }

        seats
            .release(&booking.seat)
            .map_err(|e| BookingError::from_seat(flight.id, e))?;
        self.ledger
            .update_status(pnr, BookingStatus::Cancelled)
            .map_err(|_| BookingError::BookingNotFound(pnr.to_string()))?;
        drop(seats);

        booking.status = BookingStatus::Cancelled;
        tracing::info!(pnr = %booking.pnr, seat = %booking.seat, "booking cancelled");
        Ok(booking)
    }

    /// Full booking history, insertion order, all statuses.
    pub fn list_bookings(&self) -> Vec<Booking> {
        self.ledger.list()
    }

    /// All flights with live availability and a freshly sampled dynamic
    /// price, in seeding order.
    pub fn list_flights(&self) -> Vec<FlightSummary> {
        let today = Utc::now().date_naive();
        self.inventory
            .list()
            .iter()
            .map(|flight| {
                let seats = flight.lock_seats();
                let available = seats.available();
                let demand = self.pricing.sample_demand(self.random.as_ref());
                let days_left = self
                    .pricing
                    .days_until_departure(&flight.departure_date, today);
                let dynamic_price = self.pricing.price(
                    flight.base_fare,
                    seats.total(),
                    available,
                    days_left,
                    demand,
                );
                FlightSummary {
                    id: flight.id,
                    airline: flight.airline.clone(),
                    origin: flight.origin.clone(),
                    destination: flight.destination.clone(),
                    date: flight.departure_date.clone(),
                    base_fare: flight.base_fare,
                    available_seats: available,
                    dynamic_price,
                }
            })
            .collect()
    }

    /// Seat label → is-free view of a flight's cabin.
    pub fn get_seat_map(&self, flight_id: &Uuid) -> Result<BTreeMap<String, bool>, BookingError> {
        let flight = self
            .inventory
            .get(flight_id)
            .ok_or(BookingError::FlightNotFound(*flight_id))?;
        let seats = flight.lock_seats();
        Ok(seats
            .iter()
            .map(|(label, state)| (label.to_string(), state == SeatState::Free))
            .collect())
    }
}
