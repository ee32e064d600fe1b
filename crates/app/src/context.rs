//! App Context

use std::sync::Arc;

use haulpool::config::EngineConfig;

use crate::domain::{
    notifications::NotificationDispatcher,
    shipments::{PoolShipmentsService, ShipmentsService, repository::ShipmentsRepository},
    users::UserDirectory,
};

/// Wired application services, ready to hand to a transport layer.
#[derive(Clone)]
pub struct AppContext {
    /// Shipment marketplace operations.
    pub shipments: Arc<dyn ShipmentsService>,
}

impl AppContext {
    /// Builds the context from the external collaborators.
    ///
    /// The document store, user directory, and notification dispatcher are
    /// provided by the surrounding platform; this crate only defines their
    /// seams.
    #[must_use]
    pub fn new(
        shipments: Arc<dyn ShipmentsRepository>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationDispatcher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            shipments: Arc::new(PoolShipmentsService::new(shipments, users, notifier, config)),
        }
    }
}
