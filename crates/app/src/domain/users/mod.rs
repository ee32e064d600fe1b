//! User directory collaborator.
//!
//! The marketplace core reads user profiles from an external directory and
//! never writes them; everything it needs to know about a user fits in
//! [`UserProfile`].

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use haulpool::dimensions::Dimensions;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserProfile>;

/// Role of a directory user.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform operator.
    Admin,
    /// Ships packages.
    Customer,
    /// Drives pooled shipments.
    Transporter,
}

/// Driver-license review state for transporters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Not reviewed yet.
    Pending,
    /// Cleared to transport.
    Approved,
    /// Review failed.
    Rejected,
}

/// Vehicle as configured on a transporter's profile.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleProfile {
    /// License plate.
    pub plate: String,
    /// Cargo box dimensions in centimetres.
    pub dimensions: Dimensions,
}

/// Directory view of a user.
#[derive(Clone, Debug)]
pub struct UserProfile {
    /// Directory id.
    pub uuid: UserUuid,
    /// Role on the platform.
    pub role: UserRole,
    /// Whether the user finished onboarding.
    pub is_profile_completed: bool,
    /// License review state; only meaningful for transporters.
    pub license_status: LicenseStatus,
    /// Configured vehicle; only transporters have one.
    pub vehicle: Option<VehicleProfile>,
}

/// User directory failures.
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    /// No user with the given id.
    #[error("user not found")]
    NotFound,

    /// The directory could not be reached.
    #[error("user directory unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Read-only access to the external user directory.
#[automock]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user profile by id.
    async fn get(&self, uuid: UserUuid) -> Result<UserProfile, UserDirectoryError>;
}
