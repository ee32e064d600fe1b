//! Engine configuration
//!
//! All tunables are plain immutable structs handed to the pure functions
//! that need them; there is no ambient global state. Environment overrides,
//! when wanted, belong to the binary edge.

use serde::{Deserialize, Serialize};

/// Pricing constants, in integer currency units unless noted.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Base price per cubic metre of cargo.
    pub fixed_volume_price: f64,
    /// Fuel price per litre; the per-km rate is derived from it.
    pub fuel_price_per_liter: f64,
    /// Marketplace margin applied to both price components (0.2 = 20%).
    pub margin: f64,
}

impl PricingConfig {
    /// Per-kilometre rate: 10% of the fuel price per litre.
    #[must_use]
    pub fn distance_price_per_km(&self) -> f64 {
        self.fuel_price_per_liter * 0.1
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fixed_volume_price: 10_000.0,
            fuel_price_per_liter: 1_500.0,
            margin: 0.2,
        }
    }
}

/// Limits governing who may pool into a shipment.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolingLimits {
    /// Maximum number of participants sharing one vehicle trip.
    pub max_participants: usize,
    /// A joiner's addresses must be within this range of an existing
    /// participant's, in kilometres.
    pub max_distance_range_km: f64,
    /// Minimum accepted package dimension, in centimetres.
    pub min_package_dimension_cm: f64,
}

impl Default for PoolingLimits {
    fn default() -> Self {
        Self {
            max_participants: 3,
            max_distance_range_km: 20.0,
            min_package_dimension_cm: 1.0,
        }
    }
}

/// Complete engine configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pricing constants.
    pub pricing: PricingConfig,
    /// Pooling limits.
    pub limits: PoolingLimits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_rate_derives_from_fuel_price() {
        let pricing = PricingConfig::default();

        assert_eq!(pricing.distance_price_per_km(), 150.0);
    }

    #[test]
    fn default_limits() {
        let limits = PoolingLimits::default();

        assert_eq!(limits.max_participants, 3);
        assert_eq!(limits.max_distance_range_km, 20.0);
        assert_eq!(limits.min_package_dimension_cm, 1.0);
    }
}
