//! Join eligibility rules
//!
//! Every rule is evaluated; violations accumulate so a caller can present
//! all of them at once rather than one per attempt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    capacity,
    config::PoolingLimits,
    geo::{self, Coordinates, round3},
    lifecycle::ShipmentStatus,
};

/// Pickup and delivery positions of one existing participant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStops {
    /// Where the participant's package is collected.
    pub pickup: Coordinates,
    /// Where the participant's package is dropped off.
    pub delivery: Coordinates,
}

/// The slice of shipment state the eligibility rules look at.
#[derive(Clone, Debug)]
pub struct PoolSnapshot<'a> {
    /// Current lifecycle status.
    pub status: ShipmentStatus,
    /// Whether a transporter has been assigned.
    pub transporter_assigned: bool,
    /// Total volume of the assigned vehicle, when one exists.
    pub vehicle_volume_m3: Option<f64>,
    /// Volume already committed by current participants.
    pub used_volume_m3: f64,
    /// Stops of every current participant, in join order.
    pub participants: &'a [ParticipantStops],
}

/// A package that wants to join the shipment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JoinCandidate {
    /// Requested pickup position.
    pub pickup: Coordinates,
    /// Requested delivery position.
    pub delivery: Coordinates,
    /// Volume of the candidate package in cubic metres.
    pub volume_m3: f64,
}

/// A single violated join rule.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum JoinRefusal {
    /// The participant cap is already reached.
    #[error("the shipment already has the maximum number of participants")]
    MaxParticipantsReached,

    /// The shipment is past the point where joins are accepted.
    #[error("the shipment is not open to new participants")]
    NotOpen,

    /// No transporter has been assigned yet.
    #[error("the shipment must have a transporter assigned")]
    TransporterNotAssigned,

    /// The package volume exceeds the vehicle's remaining space.
    #[error("the package does not fit in the vehicle's available space")]
    InsufficientCapacity,

    /// Capacity cannot be evaluated without vehicle information.
    #[error("no vehicle information is available for the shipment")]
    VehicleNotAssigned,

    /// Neither pickup nor delivery pairs up with an existing participant.
    #[error("both addresses must be within {max_km}km of an existing participant")]
    OutOfRange {
        /// The configured proximity limit in kilometres.
        max_km: f64,
    },
}

/// Outcome of an eligibility assessment.
///
/// `can_join` is true exactly when `reasons` is empty.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinAssessment {
    /// Whether the candidate may join.
    pub can_join: bool,
    /// Every violated rule, in evaluation order.
    pub reasons: Vec<JoinRefusal>,
    /// Remaining vehicle space in cubic metres (0 without a vehicle),
    /// rounded to three decimals.
    pub available_volume_m3: f64,
}

/// Evaluates every join rule for a candidate package.
///
/// Rules, in evaluation order: participant cap, lifecycle status, transporter
/// assignment, vehicle capacity, and proximity. The candidate must lie within
/// range of **both** the pickup and the delivery of at least one existing
/// participant.
#[must_use]
pub fn assess_join(
    pool: &PoolSnapshot<'_>,
    candidate: &JoinCandidate,
    limits: &PoolingLimits,
) -> JoinAssessment {
    let mut reasons = Vec::new();

    if pool.participants.len() >= limits.max_participants {
        reasons.push(JoinRefusal::MaxParticipantsReached);
    }

    if !matches!(
        pool.status,
        ShipmentStatus::Requested | ShipmentStatus::Taken
    ) {
        reasons.push(JoinRefusal::NotOpen);
    }

    if !pool.transporter_assigned {
        reasons.push(JoinRefusal::TransporterNotAssigned);
    }

    let mut available_volume_m3 = 0.0;

    if let Some(vehicle_volume) = pool.vehicle_volume_m3 {
        let check = capacity::can_fit(candidate.volume_m3, pool.used_volume_m3, vehicle_volume);
        available_volume_m3 = check.available_volume_m3;

        if !check.can_fit {
            reasons.push(JoinRefusal::InsufficientCapacity);
        }
    } else {
        reasons.push(JoinRefusal::VehicleNotAssigned);
    }

    let within_range = pool.participants.iter().any(|participant| {
        geo::distance_km(candidate.pickup, participant.pickup) <= limits.max_distance_range_km
            && geo::distance_km(candidate.delivery, participant.delivery)
                <= limits.max_distance_range_km
    });

    if !within_range {
        reasons.push(JoinRefusal::OutOfRange {
            max_km: limits.max_distance_range_km,
        });
    }

    JoinAssessment {
        can_join: reasons.is_empty(),
        reasons,
        available_volume_m3: round3(available_volume_m3),
    }
}
