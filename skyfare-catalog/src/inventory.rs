use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::flight::Flight;

/// Owns all flight records and their seat maps.
///
/// The flight set is fixed at construction (seeded once at process start);
/// only seat occupancy mutates afterwards, and only through each flight's
/// exclusive section.
pub struct FlightInventory {
    flights: Vec<Arc<Flight>>,
    by_id: HashMap<Uuid, usize>,
}

impl FlightInventory {
    pub fn new(flights: Vec<Flight>) -> Self {
        let flights: Vec<Arc<Flight>> = flights.into_iter().map(Arc::new).collect();
        let by_id = flights
            .iter()
            .enumerate()
            .map(|(index, flight)| (flight.id, index))
            .collect();
        Self { flights, by_id }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Arc<Flight>> {
        self.by_id.get(id).map(|index| &self.flights[*index])
    }

    /// All flights in insertion order.
    pub fn list(&self) -> &[Arc<Flight>] {
        &self.flights
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
