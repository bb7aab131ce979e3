pub mod payment;
pub mod pnr;
pub mod random;

pub use payment::{PaymentGateway, PaymentOutcome, SimulatedGateway, DEFAULT_FAILURE_PROBABILITY};
pub use random::{RandomSource, ScriptedRandom, ThreadRandom};
