//! Test context for service-level integration tests.

use std::sync::Arc;

use uuid::Uuid;

use haulpool::{config::EngineConfig, dimensions::Dimensions};

use crate::{
    domain::{
        shipments::PoolShipmentsService,
        users::{LicenseStatus, UserProfile, UserRole, UserUuid, VehicleProfile},
    },
    test::fakes::{InMemoryShipmentsRepository, RecordingDispatcher, StaticUserDirectory},
};

pub(crate) struct TestContext {
    pub store: Arc<InMemoryShipmentsRepository>,
    pub directory: Arc<StaticUserDirectory>,
    pub notifier: Arc<RecordingDispatcher>,
    pub shipments: PoolShipmentsService,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        let store = Arc::new(InMemoryShipmentsRepository::default());
        let directory = Arc::new(StaticUserDirectory::default());
        let notifier = Arc::new(RecordingDispatcher::default());

        let shipments = PoolShipmentsService::new(
            store.clone(),
            directory.clone(),
            notifier.clone(),
            EngineConfig::default(),
        );

        Self {
            store,
            directory,
            notifier,
            shipments,
        }
    }

    fn register(&self, role: UserRole, completed: bool, vehicle: Option<VehicleProfile>) -> UserUuid {
        let uuid = UserUuid::from_uuid(Uuid::now_v7());

        let license_status = match role {
            UserRole::Transporter => LicenseStatus::Approved,
            UserRole::Admin | UserRole::Customer => LicenseStatus::Pending,
        };

        self.directory.add(UserProfile {
            uuid,
            role,
            is_profile_completed: completed,
            license_status,
            vehicle,
        });

        uuid
    }

    pub(crate) fn customer(&self) -> UserUuid {
        self.register(UserRole::Customer, true, None)
    }

    pub(crate) fn incomplete_customer(&self) -> UserUuid {
        self.register(UserRole::Customer, false, None)
    }

    pub(crate) fn admin(&self) -> UserUuid {
        self.register(UserRole::Admin, true, None)
    }

    /// A transporter with an approved license and a 1m³ vehicle.
    pub(crate) fn transporter(&self) -> UserUuid {
        self.transporter_with_vehicle(Dimensions::new(200.0, 100.0, 50.0))
    }

    pub(crate) fn transporter_with_vehicle(&self, dimensions: Dimensions) -> UserUuid {
        self.register(
            UserRole::Transporter,
            true,
            Some(VehicleProfile {
                plate: "AB123CD".to_owned(),
                dimensions,
            }),
        )
    }

    /// A transporter profile that fails one of the assignment guards.
    pub(crate) fn transporter_where(
        &self,
        completed: bool,
        license_status: LicenseStatus,
        vehicle: Option<VehicleProfile>,
    ) -> UserUuid {
        let uuid = UserUuid::from_uuid(Uuid::now_v7());

        self.directory.add(UserProfile {
            uuid,
            role: UserRole::Transporter,
            is_profile_completed: completed,
            license_status,
            vehicle,
        });

        uuid
    }
}
