//! Notification dispatch collaborator.
//!
//! The shipments service emits semantic events; rendering and delivering
//! them (push, mail, in-app) is entirely the external dispatcher's job. A
//! failed dispatch is logged by the caller and never fails the mutation that
//! produced it.

use async_trait::async_trait;
use mockall::automock;
use smallvec::SmallVec;
use thiserror::Error;

use haulpool::{
    lifecycle::ShipmentStatus,
    route::{ParticipantId, StopKind},
};

use crate::domain::{shipments::models::ShipmentUuid, users::UserUuid};

/// Users a single event is addressed to.
pub type Recipients = SmallVec<[UserUuid; 4]>;

/// What happened to a shipment.
#[derive(Clone, Debug, PartialEq)]
pub enum ShipmentEventKind {
    /// A shipment was created.
    Created,
    /// A customer joined the pool.
    ParticipantJoined,
    /// A customer left the pool.
    ParticipantLeft,
    /// A transporter took the shipment.
    TransporterAssigned,
    /// The transporter stepped away and the shipment is open again.
    TransporterLeft,
    /// The lifecycle status changed.
    StatusChanged {
        /// The status entered.
        status: ShipmentStatus,
        /// Free-text cancellation reason, when one was given.
        reason: Option<String>,
    },
    /// A route stop was completed.
    StopVisited {
        /// Whose package was handled.
        participant: ParticipantId,
        /// Pickup or delivery.
        kind: StopKind,
    },
}

impl ShipmentEventKind {
    /// Stable key the dispatcher maps to a message template.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::Created => "shipment.created",
            Self::ParticipantJoined => "shipment.participant_joined",
            Self::ParticipantLeft => "shipment.participant_left",
            Self::TransporterAssigned => "shipment.transporter_assigned",
            Self::TransporterLeft => "shipment.transporter_left",
            Self::StatusChanged {
                status: ShipmentStatus::Started,
                ..
            } => "shipment.status.started",
            Self::StatusChanged {
                status: ShipmentStatus::Finished,
                ..
            } => "shipment.status.finished",
            Self::StatusChanged {
                status: ShipmentStatus::Canceled,
                ..
            } => "shipment.status.canceled",
            Self::StatusChanged { .. } => "shipment.status.changed",
            Self::StopVisited { .. } => "shipment.stop_visited",
        }
    }
}

/// A notification request emitted by the shipments service.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipmentEvent {
    /// The shipment the event concerns.
    pub shipment: ShipmentUuid,
    /// Affected users.
    pub recipients: Recipients,
    /// What happened.
    pub kind: ShipmentEventKind,
}

/// Dispatch failures; delivery problems stay on the dispatcher's side.
#[derive(Debug, Error)]
#[error("notification dispatch failed")]
pub struct DispatchError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

/// External notification dispatcher.
#[automock]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Hand one event over for delivery.
    async fn dispatch(&self, event: ShipmentEvent) -> Result<(), DispatchError>;
}
