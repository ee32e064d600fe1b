//! Shipment Models

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

use haulpool::{
    address::Address,
    dimensions::Dimensions,
    lifecycle::ShipmentStatus,
    route::{ParticipantId, SuggestedRoute},
};

use crate::{domain::users::UserUuid, uuids::TypedUuid};

/// Shipment UUID
pub type ShipmentUuid = TypedUuid<Shipment>;

/// Pooled shipment aggregate.
///
/// Persisted as one document; every mutation loads it fresh, rewrites it
/// wholesale, and bumps `version` so concurrent writers lose cleanly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Shipment {
    /// Document id.
    pub uuid: ShipmentUuid,
    /// The customer who created the shipment.
    pub created_by: UserUuid,
    /// 1 to 3 participants, in join order.
    pub participants: Vec<Participant>,
    /// The assigned transporter, once one took the shipment.
    pub transporter: Option<UserUuid>,
    /// Lifecycle status.
    pub status: ShipmentStatus,
    /// Vehicle details frozen at assignment time; later profile edits do not
    /// propagate here.
    pub assigned_vehicle: Option<VehicleSnapshot>,
    /// Sum of participant prices, in integer currency units.
    pub total_price: u64,
    /// Sum of participant package volumes in cubic metres.
    pub used_volume_m3: f64,
    /// Vehicle volume minus used volume; 0 while no vehicle is assigned.
    pub available_volume_m3: f64,
    /// Agreed execution date, stored at noon UTC.
    pub scheduled_date: Timestamp,
    /// Set when the transporter starts the route.
    pub started_at: Option<Timestamp>,
    /// Set when the shipment finishes.
    pub completed_at: Option<Timestamp>,
    /// Set when the shipment is canceled.
    pub cancelled_at: Option<Timestamp>,
    /// Free-text reason given on cancellation, when any.
    pub cancellation_reason: Option<String>,
    /// Current planned route; regenerated wholesale on membership or
    /// assignment changes.
    pub suggested_route: Option<SuggestedRoute>,
    /// Monotonic write version; the store rejects stale updates.
    pub version: u64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last mutation time.
    pub updated_at: Timestamp,
}

impl Shipment {
    /// The participant entry owned by `user`, if any.
    #[must_use]
    pub fn participant_of(&self, user: UserUuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user == user)
    }

    /// The participant with the given stable id, if any.
    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Whether `user` owns one of the packages.
    #[must_use]
    pub fn is_participant(&self, user: UserUuid) -> bool {
        self.participant_of(user).is_some()
    }
}

/// One customer's package and addresses within a shipment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participant {
    /// Stable id assigned at join time; route stops reference it.
    pub id: ParticipantId,
    /// The owning customer.
    pub user: UserUuid,
    /// Where the package is collected.
    pub pickup_address: Address,
    /// Where the package is dropped off.
    pub delivery_address: Address,
    /// Package dimensions in centimetres.
    pub package_dimensions: Dimensions,
    /// Derived package volume in cubic metres.
    pub package_volume_m3: f64,
    /// Price charged for this package, in integer currency units.
    pub price: u64,
    /// Point-to-point pickup/delivery distance in kilometres.
    pub distance_km: f64,
    /// When the customer joined the pool.
    pub joined_at: Timestamp,
}

/// Vehicle details copied from the transporter's profile at assignment time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// License plate.
    pub plate: String,
    /// Cargo box dimensions in centimetres.
    pub dimensions: Dimensions,
    /// Derived cargo volume in cubic metres.
    pub total_volume_m3: f64,
}

/// Data to create a new shipment.
#[derive(Clone, Debug, PartialEq)]
pub struct NewShipment {
    /// Client-supplied document id.
    pub uuid: ShipmentUuid,
    /// Pickup address of the first package.
    pub pickup_address: Address,
    /// Delivery address of the first package.
    pub delivery_address: Address,
    /// Dimensions of the first package, in centimetres.
    pub package_dimensions: Dimensions,
    /// Requested execution date.
    pub scheduled_date: Date,
}

/// Data to join an existing shipment.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinShipment {
    /// Pickup address of the joining package.
    pub pickup_address: Address,
    /// Delivery address of the joining package.
    pub delivery_address: Address,
    /// Dimensions of the joining package, in centimetres.
    pub package_dimensions: Dimensions,
}

/// Filters for shipment listings.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipmentQuery {
    /// Only these statuses; empty means any.
    pub statuses: Vec<ShipmentStatus>,
    /// Only shipments where this user participates or transports.
    pub member: Option<UserUuid>,
    /// Skip shipments where this user already participates.
    pub exclude_participant: Option<UserUuid>,
    /// Only shipments with no transporter yet.
    pub unassigned_only: bool,
    /// Only shipments scheduled at or after this instant.
    pub scheduled_from: Option<Timestamp>,
    /// Only shipments scheduled at or before this instant.
    pub scheduled_to: Option<Timestamp>,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
}

impl Default for ShipmentQuery {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            member: None,
            exclude_participant: None,
            unassigned_only: false,
            scheduled_from: None,
            scheduled_to: None,
            page: 1,
            limit: 10,
        }
    }
}

/// One page of shipments plus the total match count.
#[derive(Clone, Debug)]
pub struct ShipmentPage {
    /// The shipments on this page, newest first.
    pub shipments: Vec<Shipment>,
    /// Total matches across all pages.
    pub total: usize,
}
