//! Package pricing

use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;

/// Price of a single package, broken down by component.
///
/// Each component is rounded to the nearest integer currency unit
/// independently; `total_price` is the rounded sum of the unrounded
/// components, so it can differ from `volume_price + distance_price` by one
/// unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Volume component in integer currency units.
    pub volume_price: u64,
    /// Distance component in integer currency units.
    pub distance_price: u64,
    /// Total in integer currency units.
    pub total_price: u64,
}

/// Prices a package from its volume and its point-to-point distance.
#[must_use]
pub fn package_price(volume_m3: f64, distance_km: f64, config: &PricingConfig) -> PriceBreakdown {
    let volume_price = volume_m3 * config.fixed_volume_price * (1.0 + config.margin);
    let distance_price = distance_km * config.distance_price_per_km() * (1.0 + config.margin);
    let total_price = volume_price + distance_price;

    PriceBreakdown {
        volume_price: to_currency(volume_price),
        distance_price: to_currency(distance_price),
        total_price: to_currency(total_price),
    }
}

/// Rounds a non-negative amount to the nearest integer currency unit.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "bounds checked before the cast"
)]
fn to_currency(amount: f64) -> u64 {
    let rounded = amount.round();

    if rounded.is_finite() && rounded > 0.0 {
        rounded as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_volume_and_distance_with_margin() {
        let breakdown = package_price(0.25, 6.4, &PricingConfig::default());

        // 0.25m³ * 10_000 * 1.2 and 6.4km * 150 * 1.2
        assert_eq!(breakdown.volume_price, 3000);
        assert_eq!(breakdown.distance_price, 1152);
        assert_eq!(breakdown.total_price, 4152);
    }

    #[test]
    fn components_round_independently() {
        let config = PricingConfig {
            fixed_volume_price: 1.0,
            fuel_price_per_liter: 10.0,
            margin: 0.0,
        };

        // both components land on .5 and round half-up, while their exact
        // sum is a whole unit already
        let breakdown = package_price(0.5, 0.5, &config);

        assert_eq!(breakdown.volume_price, 1);
        assert_eq!(breakdown.distance_price, 1);
        assert_eq!(breakdown.total_price, 1);
    }

    #[test]
    fn zero_inputs_price_to_zero() {
        let breakdown = package_price(0.0, 0.0, &PricingConfig::default());

        assert_eq!(breakdown.total_price, 0);
    }
}
