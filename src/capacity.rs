//! Vehicle capacity ledger

use serde::{Deserialize, Serialize};

use crate::geo::round3;

/// Outcome of a capacity check.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityCheck {
    /// Whether the package fits in the remaining space.
    pub can_fit: bool,
    /// Remaining space in cubic metres, rounded to three decimals.
    pub available_volume_m3: f64,
    /// The candidate package volume in cubic metres.
    pub required_volume_m3: f64,
}

/// Remaining cargo volume given an optionally assigned vehicle.
///
/// A shipment without a vehicle has no evaluable capacity, which this models
/// as zero availability.
#[must_use]
pub fn available_volume_m3(vehicle_total_m3: Option<f64>, used_m3: f64) -> f64 {
    vehicle_total_m3.map_or(0.0, |total| total - used_m3)
}

/// Checks whether a package volume fits in the vehicle's remaining space.
///
/// Pure derivation; callers apply the resulting deltas to the shipment and
/// persist them together with the regenerated route.
#[must_use]
pub fn can_fit(package_m3: f64, used_m3: f64, vehicle_total_m3: f64) -> CapacityCheck {
    let available = vehicle_total_m3 - used_m3;

    CapacityCheck {
        can_fit: package_m3 <= available,
        available_volume_m3: round3(available),
        required_volume_m3: package_m3,
    }
}
