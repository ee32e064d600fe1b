//! Route planning
//!
//! Plans the multi-stop pickup/delivery sequence for a pooled shipment with
//! a greedy nearest-neighbour heuristic under one hard constraint: a
//! participant's package can only be delivered after it was picked up. The
//! result is deliberately approximate; an exact solver is out of scope.

use std::fmt::{Display, Formatter, Result as FmtResult};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    address::Address,
    geo::{self, round2},
};

/// Assumed average speed while executing a route.
const AVERAGE_SPEED_KMH: f64 = 25.0;

/// Assumed handling time per stop, in minutes.
const STOP_DWELL_MINUTES: f64 = 30.0;

/// Stable identity of a shipment participant, assigned when they join.
///
/// Route stops reference participants through this id rather than their
/// position in the participant list, so a participant leaving does not
/// reshuffle the identity of everyone else's stops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Generates a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing uuid.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying uuid.
    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Whether a stop collects a package or drops it off.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopKind {
    /// Collect the participant's package.
    Pickup,
    /// Drop the participant's package off.
    Delivery,
}

/// A single stop in the planned sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    /// The participant whose package is handled at this stop.
    pub participant: ParticipantId,
    /// Pickup or delivery.
    pub kind: StopKind,
    /// Snapshot of the address; not a reference into the participant list.
    pub address: Address,
    /// Whether the transporter has completed this stop.
    pub visited: bool,
    /// Great-circle distance from the previous stop in kilometres
    /// (0 for the first stop).
    pub distance_from_previous: f64,
}

/// The planned multi-stop route for a shipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestedRoute {
    /// Stops in execution order.
    pub stops: Vec<RouteStop>,
    /// Sum of the per-leg distances in kilometres, rounded to two decimals.
    pub total_distance: f64,
    /// Number of stops (2 per participant).
    pub total_stops: usize,
    /// Rough duration estimate in minutes, from a fixed average speed plus a
    /// fixed dwell time per stop.
    pub estimated_duration_minutes: f64,
}

/// Pickup and delivery addresses of one participant, input to the planner.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantWaypoints {
    /// The participant the pair of stops belongs to.
    pub id: ParticipantId,
    /// Pickup address.
    pub pickup: Address,
    /// Delivery address.
    pub delivery: Address,
}

/// Route planning failures.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The planner was invoked with no participants.
    #[error("cannot plan a route without participants")]
    NoParticipants,

    /// The produced sequence did not cover every pickup and delivery.
    #[error("could not generate a valid route")]
    Incomplete,
}

struct CandidateStop<'a> {
    participant: ParticipantId,
    kind: StopKind,
    address: &'a Address,
}

/// Plans the full stop sequence for the given participants.
///
/// Greedy nearest-neighbour: starting from the first participant's pickup,
/// repeatedly take the closest remaining stop, excluding deliveries whose
/// pickup has not happened yet. Ties keep the earliest candidate in input
/// order (participants in list order, pickup before delivery), which makes
/// the plan deterministic for a fixed input.
///
/// An unvisited pickup is always selectable, so the loop provably places all
/// `2N` stops; the completeness check at the end is a defensive invariant,
/// not an expected path.
///
/// # Errors
///
/// - [`RouteError::NoParticipants`] when `waypoints` is empty.
/// - [`RouteError::Incomplete`] if the sequence somehow failed to cover
///   every stop.
pub fn plan_route(waypoints: &[ParticipantWaypoints]) -> Result<SuggestedRoute, RouteError> {
    let first = waypoints.first().ok_or(RouteError::NoParticipants)?;

    let mut remaining: SmallVec<[CandidateStop<'_>; 6]> = SmallVec::new();

    for waypoint in waypoints {
        remaining.push(CandidateStop {
            participant: waypoint.id,
            kind: StopKind::Pickup,
            address: &waypoint.pickup,
        });
        remaining.push(CandidateStop {
            participant: waypoint.id,
            kind: StopKind::Delivery,
            address: &waypoint.delivery,
        });
    }

    let mut picked_up: FxHashSet<ParticipantId> = FxHashSet::default();
    let mut stops = Vec::with_capacity(remaining.len());
    let mut position = first.pickup.coordinates();

    while !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;

        for (index, candidate) in remaining.iter().enumerate() {
            if candidate.kind == StopKind::Delivery && !picked_up.contains(&candidate.participant)
            {
                continue;
            }

            let distance = geo::distance_km(position, candidate.address.coordinates());

            // strictly-less keeps the earliest candidate on ties
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }

        let Some((index, distance)) = best else {
            break;
        };

        let chosen = remaining.remove(index);

        if chosen.kind == StopKind::Pickup {
            picked_up.insert(chosen.participant);
        }

        position = chosen.address.coordinates();
        stops.push(RouteStop {
            participant: chosen.participant,
            kind: chosen.kind,
            address: chosen.address.clone(),
            visited: false,
            distance_from_previous: distance,
        });
    }

    if stops.len() != waypoints.len() * 2 {
        return Err(RouteError::Incomplete);
    }

    let total_distance = round2(stops.iter().map(|stop| stop.distance_from_previous).sum());

    Ok(SuggestedRoute {
        total_stops: stops.len(),
        estimated_duration_minutes: estimate_duration(total_distance, stops.len()),
        total_distance,
        stops,
    })
}

/// Re-applies visited flags from a previous plan onto a freshly generated
/// one.
///
/// Regeneration is always wholesale; this carries execution state over for
/// stops whose `(participant, kind)` pair still exists. Stops of departed
/// participants simply have no counterpart and are dropped with them.
pub fn carry_visited(previous: &SuggestedRoute, fresh: &mut SuggestedRoute) {
    let flags: FxHashMap<(ParticipantId, StopKind), bool> = previous
        .stops
        .iter()
        .map(|stop| ((stop.participant, stop.kind), stop.visited))
        .collect();

    for stop in &mut fresh.stops {
        if let Some(visited) = flags.get(&(stop.participant, stop.kind)) {
            stop.visited = *visited;
        }
    }
}

fn estimate_duration(total_distance_km: f64, stop_count: usize) -> f64 {
    #[allow(
        clippy::cast_precision_loss,
        reason = "stop counts are tiny"
    )]
    let dwell = stop_count as f64 * STOP_DWELL_MINUTES;

    (total_distance_km / AVERAGE_SPEED_KMH) * 60.0 + dwell
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(latitude: f64, longitude: f64) -> Address {
        Address {
            street: "Test St".to_owned(),
            number: None,
            city: None,
            state: None,
            country: "Argentina".to_owned(),
            postal_code: None,
            latitude,
            longitude,
            formatted_address: format!("Test St ({latitude}, {longitude})"),
            neighborhood: None,
        }
    }

    fn waypoints(points: &[((f64, f64), (f64, f64))]) -> Vec<ParticipantWaypoints> {
        points
            .iter()
            .map(|&((p_lat, p_lng), (d_lat, d_lng))| ParticipantWaypoints {
                id: ParticipantId::new(),
                pickup: address(p_lat, p_lng),
                delivery: address(d_lat, d_lng),
            })
            .collect()
    }

    fn position_of(route: &SuggestedRoute, participant: ParticipantId, kind: StopKind) -> usize {
        route
            .stops
            .iter()
            .position(|stop| stop.participant == participant && stop.kind == kind)
            .unwrap_or_else(|| panic!("missing {kind:?} stop"))
    }

    #[test]
    fn single_participant_is_pickup_then_delivery() {
        let input = waypoints(&[((-34.60, -58.40), (-34.55, -58.45))]);

        let route = plan_route(&input).unwrap();

        assert_eq!(route.total_stops, 2);
        assert_eq!(route.stops[0].kind, StopKind::Pickup);
        assert_eq!(route.stops[1].kind, StopKind::Delivery);
        assert_eq!(route.stops[0].distance_from_previous, 0.0);
        assert!(route.total_distance > 0.0);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(plan_route(&[]), Err(RouteError::NoParticipants));
    }

    #[test]
    fn pickup_always_precedes_delivery() {
        let input = waypoints(&[
            ((-34.60, -58.40), (-34.55, -58.45)),
            ((-34.61, -58.39), (-34.58, -58.44)),
            ((-34.59, -58.41), (-34.62, -58.38)),
        ]);

        let route = plan_route(&input).unwrap();

        assert_eq!(route.total_stops, 6);

        for waypoint in &input {
            let pickup = position_of(&route, waypoint.id, StopKind::Pickup);
            let delivery = position_of(&route, waypoint.id, StopKind::Delivery);

            assert!(pickup < delivery, "pickup must precede delivery");
        }
    }

    #[test]
    fn covers_every_stop_even_with_far_apart_participants() {
        let input = waypoints(&[
            ((-34.60, -58.40), (-34.55, -58.45)),
            ((-31.42, -64.18), (-31.40, -64.20)),
        ]);

        let route = plan_route(&input).unwrap();

        assert_eq!(route.total_stops, 4);
    }

    #[test]
    fn plan_is_deterministic() {
        let input = waypoints(&[
            ((-34.60, -58.40), (-34.55, -58.45)),
            ((-34.61, -58.39), (-34.58, -58.44)),
        ]);

        let first = plan_route(&input).unwrap();
        let second = plan_route(&input).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn starts_at_the_first_participants_pickup() {
        let input = waypoints(&[
            ((-34.60, -58.40), (-34.55, -58.45)),
            ((-34.61, -58.39), (-34.58, -58.44)),
        ]);

        let route = plan_route(&input).unwrap();

        assert_eq!(
            route.stops[0].address.coordinates(),
            input[0].pickup.coordinates()
        );
        assert_eq!(route.stops[0].kind, StopKind::Pickup);
        assert_eq!(route.stops[0].participant, input[0].id);
    }

    #[test]
    fn total_distance_is_the_sum_of_legs() {
        let input = waypoints(&[
            ((-34.60, -58.40), (-34.55, -58.45)),
            ((-34.61, -58.39), (-34.58, -58.44)),
        ]);

        let route = plan_route(&input).unwrap();
        let legs: f64 = route
            .stops
            .iter()
            .map(|stop| stop.distance_from_previous)
            .sum();

        assert!((route.total_distance - legs).abs() < 0.01);
    }

    #[test]
    fn duration_uses_fixed_speed_and_dwell_time() {
        let input = waypoints(&[((-34.60, -58.40), (-34.55, -58.45))]);

        let route = plan_route(&input).unwrap();
        let expected = (route.total_distance / 25.0) * 60.0 + 2.0 * 30.0;

        assert!((route.estimated_duration_minutes - expected).abs() < 1e-9);
    }

    #[test]
    fn carry_visited_preserves_surviving_stops() {
        let input = waypoints(&[
            ((-34.60, -58.40), (-34.55, -58.45)),
            ((-34.61, -58.39), (-34.58, -58.44)),
        ]);

        let mut previous = plan_route(&input).unwrap();
        for stop in &mut previous.stops {
            stop.visited = true;
        }

        // second participant leaves; regenerate for the remainder
        let remainder = vec![input[0].clone()];
        let mut fresh = plan_route(&remainder).unwrap();
        carry_visited(&previous, &mut fresh);

        assert_eq!(fresh.total_stops, 2);
        assert!(fresh.stops.iter().all(|stop| stop.visited));
        assert!(
            fresh
                .stops
                .iter()
                .all(|stop| stop.participant == input[0].id)
        );
    }

    #[test]
    fn carry_visited_leaves_new_stops_unvisited() {
        let input = waypoints(&[((-34.60, -58.40), (-34.55, -58.45))]);

        let mut previous = plan_route(&input).unwrap();
        for stop in &mut previous.stops {
            stop.visited = true;
        }

        let mut joined = input.clone();
        joined.push(ParticipantWaypoints {
            id: ParticipantId::new(),
            pickup: address(-34.61, -58.39),
            delivery: address(-34.58, -58.44),
        });

        let mut fresh = plan_route(&joined).unwrap();
        carry_visited(&previous, &mut fresh);

        for stop in &fresh.stops {
            assert_eq!(stop.visited, stop.participant == input[0].id);
        }
    }
}
