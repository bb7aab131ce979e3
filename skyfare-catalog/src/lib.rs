pub mod flight;
pub mod inventory;
pub mod pricing;

pub use flight::{Flight, SeatError, SeatMap, SeatState};
pub use inventory::FlightInventory;
pub use pricing::{PricingConfig, PricingEngine};
