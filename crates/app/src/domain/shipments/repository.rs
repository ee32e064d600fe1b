//! Shipment document store seam.
//!
//! The aggregate is persisted as a single document; which store backs it is
//! an external concern. Updates are compare-and-swap on the version the
//! caller loaded, so interleaved mutations of the same shipment fail instead
//! of silently losing writes.

use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    shipments::{
        errors::ShipmentStoreError,
        models::{Shipment, ShipmentPage, ShipmentQuery, ShipmentUuid},
    },
    users::UserUuid,
};

/// Document store for shipment aggregates.
#[automock]
#[async_trait]
pub trait ShipmentsRepository: Send + Sync {
    /// Load one shipment.
    async fn get(&self, uuid: ShipmentUuid) -> Result<Shipment, ShipmentStoreError>;

    /// Insert a new shipment document.
    async fn insert(&self, shipment: Shipment) -> Result<(), ShipmentStoreError>;

    /// Replace a shipment document.
    ///
    /// `expected_version` is the version the caller loaded; the stored
    /// document must still carry it or the update fails with
    /// [`ShipmentStoreError::VersionConflict`].
    async fn update(
        &self,
        shipment: Shipment,
        expected_version: u64,
    ) -> Result<(), ShipmentStoreError>;

    /// The transporter's shipment currently taken or started, if any.
    async fn find_active_for_transporter(
        &self,
        transporter: UserUuid,
    ) -> Result<Option<Shipment>, ShipmentStoreError>;

    /// Filtered, paginated listing, newest first.
    async fn list(&self, query: ShipmentQuery) -> Result<ShipmentPage, ShipmentStoreError>;
}
