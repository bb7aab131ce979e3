use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle status.
///
/// Pending resolves to Confirmed or Failed within the creating request;
/// Confirmed may later become Cancelled. Failed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
    Cancelled,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Failed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

/// Passenger details embedded in a booking. No identity of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passenger {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Passenger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }
}

/// A booking attempt, retained for history regardless of outcome.
///
/// The price is locked in when the booking is created and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub pnr: String,
    pub flight_id: Uuid,
    pub seat: String,
    pub passenger: Passenger,
    pub price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        pnr: String,
        flight_id: Uuid,
        seat: String,
        passenger: Passenger,
        price: f64,
    ) -> Self {
        Self {
            pnr,
            flight_id,
            seat,
            passenger,
            price,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Failed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for next in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Failed,
            BookingStatus::Cancelled,
        ] {
            assert!(!BookingStatus::Failed.can_transition_to(next));
            assert!(!BookingStatus::Cancelled.can_transition_to(next));
        }
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Failed));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Confirmed).unwrap(),
            "\"CONFIRMED\""
        );
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
    }

    #[test]
    fn test_optional_contact_fields_omitted() {
        let passenger = Passenger::new("Asha Rao");
        let json = serde_json::to_value(&passenger).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Asha Rao" }));
    }
}
