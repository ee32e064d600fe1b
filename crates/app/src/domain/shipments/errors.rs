//! Shipments service errors.

use thiserror::Error;

use haulpool::{
    dimensions::InvalidDimensions,
    eligibility::JoinRefusal,
    lifecycle::TransitionError,
    progress::ProgressError,
    route::RouteError,
};

use crate::domain::users::UserDirectoryError;

/// Storage-seam errors for the shipment document store.
#[derive(Debug, Error)]
pub enum ShipmentStoreError {
    /// No document with the given id.
    #[error("shipment not found")]
    NotFound,

    /// A document with the given id already exists.
    #[error("shipment already exists")]
    AlreadyExists,

    /// The stored version no longer matches the caller's.
    #[error("stale shipment version")]
    VersionConflict,

    /// The backing store failed.
    #[error("storage error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Why a transporter cannot take a shipment.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum TransporterRefusal {
    /// The user is not a transporter.
    #[error("not a transporter")]
    NotATransporter,

    /// Onboarding is unfinished.
    #[error("profile must be completed")]
    ProfileIncomplete,

    /// The driver license was not approved.
    #[error("license must be approved")]
    LicenseNotApproved,

    /// No vehicle is configured on the profile.
    #[error("no vehicle configured")]
    NoVehicle,

    /// Another shipment is already taken or underway.
    #[error("another shipment is already active")]
    AlreadyBusy,
}

/// Failures surfaced by the shipments service.
///
/// Every variant stems from a business-rule violation; none is retried.
#[derive(Debug, Error)]
pub enum ShipmentsServiceError {
    /// No shipment with the given id.
    #[error("shipment not found")]
    NotFound,

    /// The acting user does not exist in the directory.
    #[error("user not found")]
    UserNotFound,

    /// The acting user may not perform this operation on the shipment.
    #[error("not allowed to perform this operation on the shipment")]
    NotAuthorized,

    /// Only customers create or join shipments.
    #[error("only customers can create or join shipments")]
    NotACustomer,

    /// The acting user has not completed their profile.
    #[error("profile must be completed first")]
    ProfileIncomplete,

    /// One or more package dimensions are below the minimum.
    #[error(transparent)]
    InvalidDimensions(#[from] InvalidDimensions),

    /// The join was refused; carries **every** violated rule.
    #[error("cannot join the shipment: {}", format_refusals(.0))]
    Ineligible(Vec<JoinRefusal>),

    /// The pooled volume does not fit the vehicle.
    #[error("insufficient capacity: {available_volume_m3}m³ available, {required_volume_m3}m³ required")]
    CapacityExceeded {
        /// Space the vehicle offers, in cubic metres.
        available_volume_m3: f64,
        /// Space the cargo needs, in cubic metres.
        required_volume_m3: f64,
    },

    /// The requested status change is not in the transition table.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// Stop-completion order was violated.
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Route generation failed outright.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The user already has a package on this shipment.
    #[error("already participating in this shipment")]
    AlreadyParticipating,

    /// A shipment with this id already exists.
    #[error("shipment already exists")]
    AlreadyExists,

    /// The candidate transporter is not eligible.
    #[error("transporter is not eligible: {0}")]
    TransporterUnavailable(TransporterRefusal),

    /// The shipment already has a transporter.
    #[error("the shipment already has a transporter assigned")]
    TransporterAlreadyAssigned,

    /// A transporter must be assigned for a shipment to become taken.
    #[error("a transporter must be assigned to take a shipment")]
    AssignmentRequired,

    /// Participants can only leave while the shipment is requested or taken.
    #[error("the shipment cannot be left in its current status")]
    LeaveNotAllowed,

    /// A sole participant cancels instead of leaving.
    #[error("the sole participant must cancel the shipment instead of leaving")]
    SoleParticipant,

    /// Stops can only be visited while the shipment is started.
    #[error("stops can only be visited while the shipment is started")]
    NotStarted,

    /// Finishing requires the whole route to be visited.
    #[error("the route has unvisited stops")]
    UnvisitedStops,

    /// The scheduled date is out of range.
    #[error("invalid scheduled date")]
    InvalidDate(#[from] jiff::Error),

    /// A concurrent mutation won; the caller should reload and retry.
    #[error("the shipment was modified concurrently")]
    Conflict,

    /// The backing store or a collaborator failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn format_refusals(refusals: &[JoinRefusal]) -> String {
    refusals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ShipmentStoreError> for ShipmentsServiceError {
    fn from(error: ShipmentStoreError) -> Self {
        match error {
            ShipmentStoreError::NotFound => Self::NotFound,
            ShipmentStoreError::AlreadyExists => Self::AlreadyExists,
            ShipmentStoreError::VersionConflict => Self::Conflict,
            ShipmentStoreError::Backend(source) => Self::Storage(source),
        }
    }
}

impl From<UserDirectoryError> for ShipmentsServiceError {
    fn from(error: UserDirectoryError) -> Self {
        match error {
            UserDirectoryError::NotFound => Self::UserNotFound,
            UserDirectoryError::Unavailable(source) => Self::Storage(source),
        }
    }
}
