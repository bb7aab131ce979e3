use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Fraction of charges the simulated gateway declines at random.
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Approved,
    Declined,
}

/// Payment collaborator boundary.
///
/// A decline is a normal outcome, not an error. A real provider adapter can
/// replace [`SimulatedGateway`] behind this trait; if it performs network
/// I/O it must be invoked outside any flight's exclusive section.
pub trait PaymentGateway: Send + Sync {
    /// Attempt to collect `amount` for the given booking reference.
    fn charge(&self, reference: &str, amount: f64) -> PaymentOutcome;
}

/// Local payment simulation: declines a fixed fraction of charges.
pub struct SimulatedGateway {
    failure_probability: f64,
    random: Arc<dyn RandomSource>,
}

impl SimulatedGateway {
    pub fn new(failure_probability: f64, random: Arc<dyn RandomSource>) -> Self {
        Self {
            failure_probability,
            random,
        }
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(&self, reference: &str, amount: f64) -> PaymentOutcome {
        if self.random.unit() < self.failure_probability {
            tracing::warn!(reference, amount, "simulated payment declined");
            PaymentOutcome::Declined
        } else {
            tracing::info!(reference, amount, "simulated payment approved");
            PaymentOutcome::Approved
        }
    }
}
