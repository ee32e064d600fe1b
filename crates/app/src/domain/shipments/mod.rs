//! Shipments

pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::{ShipmentStoreError, ShipmentsServiceError, TransporterRefusal};
pub use service::*;
