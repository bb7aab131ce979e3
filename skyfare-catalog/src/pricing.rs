use chrono::NaiveDate;

use skyfare_core::random::RandomSource;

/// Tier thresholds and multipliers for the dynamic fare formula.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Free-seat ratio at or below which the scarcity tier applies.
    pub scarce_ratio: f64,
    pub scarce_factor: f64,

    /// Free-seat ratio at or below which the filling-up tier applies.
    pub filling_ratio: f64,
    pub filling_factor: f64,

    /// Days-to-departure at or below which the imminent tier applies.
    pub imminent_days: i64,
    pub imminent_factor: f64,

    /// Days-to-departure at or below which the approaching tier applies.
    pub approaching_days: i64,
    pub approaching_factor: f64,

    /// Days-left assumed when the departure date cannot be parsed.
    pub fallback_days_left: i64,

    /// Demand sample range, applied as `1.0 + sample`.
    pub demand_min: f64,
    pub demand_max: f64,

    /// Final fares are rounded to the nearest multiple of this step.
    pub rounding_step: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            scarce_ratio: 0.2,
            scarce_factor: 1.5,
            filling_ratio: 0.5,
            filling_factor: 1.2,
            imminent_days: 3,
            imminent_factor: 1.6,
            approaching_days: 10,
            approaching_factor: 1.2,
            fallback_days_left: 30,
            demand_min: -0.05,
            demand_max: 0.15,
            rounding_step: 10.0,
        }
    }
}

/// Dynamic fare calculator.
///
/// Pure: for fixed inputs, including the injected demand sample, the output
/// is deterministic. Randomness stays with the caller via [`RandomSource`].
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Scarcity multiplier from the free-seat ratio.
    ///
    /// `total_seats` must be positive; a zero-seat flight is a caller
    /// contract violation and fails fast.
    pub fn seat_factor(&self, total_seats: usize, seats_available: usize) -> f64 {
        assert!(total_seats > 0, "seat_factor requires a non-empty seat map");
        let ratio = seats_available as f64 / total_seats as f64;
        if ratio <= self.config.scarce_ratio {
            self.config.scarce_factor
        } else if ratio <= self.config.filling_ratio {
            self.config.filling_factor
        } else {
            1.0
        }
    }

    /// Urgency multiplier from days until departure.
    pub fn time_factor(&self, days_left: i64) -> f64 {
        if days_left <= self.config.imminent_days {
            self.config.imminent_factor
        } else if days_left <= self.config.approaching_days {
            self.config.approaching_factor
        } else {
            1.0
        }
    }

    /// Days between `today` and a `YYYY-MM-DD` departure date, clamped at
    /// zero. An unparseable date degrades to the configured fallback rather
    /// than failing the quote.
    pub fn days_until_departure(&self, departure_date: &str, today: NaiveDate) -> i64 {
        match NaiveDate::parse_from_str(departure_date, "%Y-%m-%d") {
            Ok(departure) => (departure - today).num_days().max(0),
            Err(_) => self.config.fallback_days_left,
        }
    }

    /// Draw a demand sample from the configured range.
    pub fn sample_demand(&self, random: &dyn RandomSource) -> f64 {
        random.uniform(self.config.demand_min, self.config.demand_max)
    }

    /// Compute the dynamic fare, rounded to the nearest configured step.
    pub fn price(
        &self,
        base_fare: f64,
        total_seats: usize,
        seats_available: usize,
        days_left: i64,
        demand_sample: f64,
    ) -> f64 {
        let seat = self.seat_factor(total_seats, seats_available);
        let time = self.time_factor(days_left);
        let demand = 1.0 + demand_sample;
        let raw = base_fare * seat * time * demand;
        (raw / self.config.rounding_step).round() * self.config.rounding_step
    }
}
