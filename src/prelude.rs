//! Haulpool prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    address::Address,
    capacity::{CapacityCheck, available_volume_m3, can_fit},
    config::{EngineConfig, PoolingLimits, PricingConfig},
    dimensions::{Dimensions, InvalidDimensions},
    eligibility::{JoinAssessment, JoinCandidate, JoinRefusal, ParticipantStops, PoolSnapshot, assess_join},
    geo::{Coordinates, distance_km},
    lifecycle::{ShipmentStatus, TransitionError, ensure_transition},
    pricing::{PriceBreakdown, package_price},
    progress::{ProgressError, RouteProgress, is_complete, mark_visited, next_destination, route_progress},
    route::{
        ParticipantId, ParticipantWaypoints, RouteError, RouteStop, StopKind, SuggestedRoute,
        carry_visited, plan_route,
    },
};
