//! Shipment lifecycle state machine

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a shipment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    /// Created by a customer, waiting for a transporter.
    Requested,
    /// A transporter has been assigned.
    Taken,
    /// The transporter is executing the route.
    Started,
    /// All stops completed. Terminal.
    Finished,
    /// Canceled by a participant or the transporter. Terminal.
    Canceled,
}

impl ShipmentStatus {
    /// Statuses reachable from this one.
    #[must_use]
    pub const fn transitions(self) -> &'static [ShipmentStatus] {
        match self {
            Self::Requested => &[Self::Taken, Self::Canceled],
            Self::Taken => &[Self::Started, Self::Canceled],
            Self::Started => &[Self::Finished, Self::Canceled],
            Self::Finished | Self::Canceled => &[],
        }
    }

    /// Whether `next` is a legal direct transition from this status.
    #[must_use]
    pub fn can_transition_to(self, next: ShipmentStatus) -> bool {
        self.transitions().contains(&next)
    }

    /// Whether the status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Canceled)
    }

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Taken => "taken",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Canceled => "canceled",
        }
    }
}

impl Display for ShipmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// The requested status change is not in the transition table.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot change status from '{from}' to '{to}'")]
pub struct TransitionError {
    /// Status the shipment is currently in.
    pub from: ShipmentStatus,
    /// Status that was requested.
    pub to: ShipmentStatus,
}

/// Validates a status change against the transition table.
///
/// Permission rules (who may trigger which transition) are the caller's
/// concern; this checks the table only.
///
/// # Errors
///
/// Returns [`TransitionError`] when `to` is not directly reachable from
/// `from`.
pub fn ensure_transition(from: ShipmentStatus, to: ShipmentStatus) -> Result<(), TransitionError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}
