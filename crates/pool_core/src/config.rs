//! Engine configuration.

use std::time::Duration;

use rust_decimal::Decimal;

/// Maximum pickup-to-pickup distance for two requests to share a ride.
const DEFAULT_MAX_PICKUP_DISTANCE_KM: f64 = 2.0;

/// Maximum destination-to-destination distance for two requests to share a ride.
const DEFAULT_MAX_DESTINATION_DISTANCE_KM: f64 = 2.0;

/// Maximum requested-pickup-time difference for two requests to share a ride.
const DEFAULT_MAX_TIME_DIFFERENCE_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max passengers per trip must be at least 2, got {0}")]
    GroupSizeTooSmall(u32),
    #[error("distance thresholds must be positive")]
    NonPositiveDistance,
    #[error("time difference window must be positive")]
    NonPositiveTimeWindow,
}

/// Tunables for a matchmaking deployment.
#[derive(Debug, Clone)]
pub struct MatchmakingConfig {
    /// Capacity bound for a formed group (members per shared trip).
    pub max_passengers_per_trip: u32,
    /// Flat fare charged per shared trip, split across members.
    pub cost_per_shared_trip: Decimal,
    /// Estimated cost stamped on a request at intake, before any pooling.
    pub single_rider_estimated_cost: Decimal,
    /// Base URL of the downstream real-time dispatch service.
    pub realtime_endpoint: String,
    pub max_pickup_distance_km: f64,
    pub max_destination_distance_km: f64,
    pub max_time_difference_minutes: i64,
    /// Period of the recurring timer trigger.
    pub run_interval: Duration,
    /// Bound on the outbound notification request.
    pub notify_timeout: Duration,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            max_passengers_per_trip: 4,
            cost_per_shared_trip: Decimal::new(650, 0),
            single_rider_estimated_cost: Decimal::new(650, 0),
            realtime_endpoint: "http://localhost:3001".to_string(),
            max_pickup_distance_km: DEFAULT_MAX_PICKUP_DISTANCE_KM,
            max_destination_distance_km: DEFAULT_MAX_DESTINATION_DISTANCE_KM,
            max_time_difference_minutes: DEFAULT_MAX_TIME_DIFFERENCE_MINUTES,
            run_interval: Duration::from_secs(60),
            notify_timeout: Duration::from_secs(3),
        }
    }
}

impl MatchmakingConfig {
    pub fn with_max_passengers(mut self, max: u32) -> Self {
        self.max_passengers_per_trip = max;
        self
    }

    pub fn with_cost_per_shared_trip(mut self, cost: Decimal) -> Self {
        self.cost_per_shared_trip = cost;
        self
    }

    pub fn with_realtime_endpoint(mut self, endpoint: &str) -> Self {
        self.realtime_endpoint = endpoint.to_string();
        self
    }

    pub fn with_run_interval(mut self, interval: Duration) -> Self {
        self.run_interval = interval;
        self
    }

    pub fn with_time_difference_minutes(mut self, minutes: i64) -> Self {
        self.max_time_difference_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_passengers_per_trip < 2 {
            return Err(ConfigError::GroupSizeTooSmall(self.max_passengers_per_trip));
        }
        if self.max_pickup_distance_km <= 0.0 || self.max_destination_distance_km <= 0.0 {
            return Err(ConfigError::NonPositiveDistance);
        }
        if self.max_time_difference_minutes <= 0 {
            return Err(ConfigError::NonPositiveTimeWindow);
        }
        Ok(())
    }
}
