//! Postal addresses

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// A geocoded postal address.
///
/// Immutable once attached to a shipment participant; route stops carry
/// copies, never references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Street name.
    pub street: String,
    /// Street number, when known.
    pub number: Option<String>,
    /// City, when known.
    pub city: Option<String>,
    /// State or province, when known.
    pub state: Option<String>,
    /// Country name.
    pub country: String,
    /// Postal code, when known.
    pub postal_code: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Display string as produced by the geocoder.
    pub formatted_address: String,
    /// Neighborhood, when known.
    pub neighborhood: Option<String>,
}

impl Address {
    /// The geocoded position of the address.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
