//! Package and cargo-box dimensions

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::round3;

/// cm³ per m³.
const VOLUME_CONVERSION_FACTOR: f64 = 1_000_000.0;

/// Outer dimensions of a package or a vehicle cargo box, in centimetres.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Length in centimetres.
    pub length: f64,
    /// Width in centimetres.
    pub width: f64,
    /// Height in centimetres.
    pub height: f64,
}

impl Dimensions {
    /// Creates dimensions from centimetre measurements.
    #[must_use]
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Volume in cubic metres, rounded to three decimals.
    #[must_use]
    pub fn volume_m3(&self) -> f64 {
        round3(self.length * self.width * self.height / VOLUME_CONVERSION_FACTOR)
    }

    /// Checks every dimension against the configured minimum.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDimensions`] listing **every** dimension below the
    /// minimum, not just the first one found.
    pub fn validate(&self, min_cm: f64) -> Result<(), InvalidDimensions> {
        let mut below_minimum = Vec::new();

        if self.length < min_cm {
            below_minimum.push(Axis::Length);
        }

        if self.width < min_cm {
            below_minimum.push(Axis::Width);
        }

        if self.height < min_cm {
            below_minimum.push(Axis::Height);
        }

        if below_minimum.is_empty() {
            Ok(())
        } else {
            Err(InvalidDimensions {
                min_cm,
                below_minimum,
            })
        }
    }
}

/// One axis of a [`Dimensions`] value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// The length measurement.
    Length,
    /// The width measurement.
    Width,
    /// The height measurement.
    Height,
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Length => f.write_str("length"),
            Self::Width => f.write_str("width"),
            Self::Height => f.write_str("height"),
        }
    }
}

/// One or more dimensions fell below the configured minimum.
#[derive(Debug, Error, PartialEq)]
#[error("dimensions below the {min_cm}cm minimum: {}", format_axes(.below_minimum))]
pub struct InvalidDimensions {
    /// The minimum each dimension was checked against, in centimetres.
    pub min_cm: f64,
    /// Every failing dimension, in length/width/height order.
    pub below_minimum: Vec<Axis>,
}

fn format_axes(axes: &[Axis]) -> String {
    axes.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
