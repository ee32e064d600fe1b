//! Execution progress over a planned route
//!
//! Stops are completed strictly in sequence order; a visited flag never
//! reverts. Who is allowed to mark a stop, and in which shipment status, is
//! the caller's concern.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::route::{ParticipantId, RouteStop, StopKind, SuggestedRoute};

/// Completion counters for a route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteProgress {
    /// Stops already visited.
    pub completed: usize,
    /// Total stops in the route.
    pub total: usize,
    /// `completed / total`, rounded to the nearest whole percent
    /// (0 without a route).
    pub percentage: u8,
}

/// Violations of the strict stop-completion order.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    /// The requested stop is not part of the current route.
    #[error("the stop is not part of the current route")]
    UnknownStop,

    /// An earlier stop in the sequence is still unvisited.
    #[error("earlier stops in the route must be visited first")]
    OutOfOrder,

    /// The stop was already marked visited.
    #[error("the stop has already been visited")]
    AlreadyVisited,
}

/// Completion counters for an optional route.
#[must_use]
pub fn route_progress(route: Option<&SuggestedRoute>) -> RouteProgress {
    let Some(route) = route else {
        return RouteProgress {
            completed: 0,
            total: 0,
            percentage: 0,
        };
    };

    let total = route.stops.len();
    let completed = route.stops.iter().filter(|stop| stop.visited).count();

    RouteProgress {
        completed,
        total,
        percentage: percentage(completed, total),
    }
}

/// The first unvisited stop, if any remain.
#[must_use]
pub fn next_destination(route: &SuggestedRoute) -> Option<&RouteStop> {
    route.stops.iter().find(|stop| !stop.visited)
}

/// Whether every stop of the route has been visited.
#[must_use]
pub fn is_complete(route: &SuggestedRoute) -> bool {
    route.stops.iter().all(|stop| stop.visited)
}

/// Marks one stop visited, enforcing strict sequential completion.
///
/// # Errors
///
/// - [`ProgressError::UnknownStop`] when no stop matches the participant and
///   kind.
/// - [`ProgressError::OutOfOrder`] when any earlier stop is unvisited.
/// - [`ProgressError::AlreadyVisited`] when the stop was completed before.
pub fn mark_visited(
    route: &mut SuggestedRoute,
    participant: ParticipantId,
    kind: StopKind,
) -> Result<(), ProgressError> {
    let position = route
        .stops
        .iter()
        .position(|stop| stop.participant == participant && stop.kind == kind)
        .ok_or(ProgressError::UnknownStop)?;

    if !route
        .stops
        .iter()
        .take(position)
        .all(|stop| stop.visited)
    {
        return Err(ProgressError::OutOfOrder);
    }

    let Some(stop) = route.stops.get_mut(position) else {
        return Err(ProgressError::UnknownStop);
    };

    if stop.visited {
        return Err(ProgressError::AlreadyVisited);
    }

    stop.visited = true;

    Ok(())
}

fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }

    // integer half-up rounding; the result never exceeds 100
    u8::try_from((completed * 100 + total / 2) / total).unwrap_or(100)
}
