//! Shipments service.
//!
//! Orchestrates the pooling engine against the document store, the user
//! directory, and the notification dispatcher. Every operation is one
//! read-modify-write cycle over a single shipment aggregate; concurrent
//! writers are fenced by the document version, not by locks.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use smallvec::smallvec;
use tracing::warn;

use haulpool::{
    capacity,
    config::EngineConfig,
    eligibility::{self, JoinCandidate, ParticipantStops, PoolSnapshot},
    geo,
    lifecycle::{self, ShipmentStatus, TransitionError},
    pricing,
    progress::{self, ProgressError, RouteProgress},
    route::{self, ParticipantId, ParticipantWaypoints, RouteStop, StopKind},
};

use crate::{
    domain::{
        notifications::{NotificationDispatcher, Recipients, ShipmentEvent, ShipmentEventKind},
        shipments::{
            errors::{ShipmentsServiceError, TransporterRefusal},
            models::{
                JoinShipment, NewShipment, Participant, Shipment, ShipmentPage, ShipmentQuery,
                ShipmentUuid, VehicleSnapshot,
            },
            repository::ShipmentsRepository,
        },
        users::{LicenseStatus, UserDirectory, UserDirectoryError, UserProfile, UserRole, UserUuid},
    },
    time,
};

/// Shipments service over a document store and the external collaborators.
#[derive(Clone)]
pub struct PoolShipmentsService {
    shipments: Arc<dyn ShipmentsRepository>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn NotificationDispatcher>,
    config: EngineConfig,
}

impl PoolShipmentsService {
    /// Wires the service to its collaborators.
    #[must_use]
    pub fn new(
        shipments: Arc<dyn ShipmentsRepository>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationDispatcher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            shipments,
            users,
            notifier,
            config,
        }
    }

    async fn require_customer(&self, user: UserUuid) -> Result<UserProfile, ShipmentsServiceError> {
        let profile = self.users.get(user).await?;

        if profile.role != UserRole::Customer {
            return Err(ShipmentsServiceError::NotACustomer);
        }

        if !profile.is_profile_completed {
            return Err(ShipmentsServiceError::ProfileIncomplete);
        }

        Ok(profile)
    }

    async fn ensure_can_view(
        &self,
        user: UserUuid,
        shipment: &Shipment,
    ) -> Result<(), ShipmentsServiceError> {
        if shipment.transporter == Some(user) || shipment.is_participant(user) {
            return Ok(());
        }

        match self.users.get(user).await {
            Ok(profile) if profile.role == UserRole::Admin => Ok(()),
            Ok(_) | Err(UserDirectoryError::NotFound) => Err(ShipmentsServiceError::NotAuthorized),
            Err(error) => Err(error.into()),
        }
    }

    /// Bumps the version, stamps the mutation time, and CAS-writes the
    /// document.
    async fn persist(&self, mut shipment: Shipment) -> Result<Shipment, ShipmentsServiceError> {
        let expected = shipment.version;

        shipment.version += 1;
        shipment.updated_at = Timestamp::now();

        self.shipments.update(shipment.clone(), expected).await?;

        Ok(shipment)
    }

    async fn notify(
        &self,
        shipment: ShipmentUuid,
        recipients: Recipients,
        kind: ShipmentEventKind,
    ) {
        let event = ShipmentEvent {
            shipment,
            recipients,
            kind,
        };

        // delivery is the dispatcher's problem; a failed handover must not
        // fail the mutation that produced the event
        if let Err(error) = self.notifier.dispatch(event).await {
            warn!(%shipment, %error, "notification dispatch failed");
        }
    }
}

#[async_trait]
impl ShipmentsService for PoolShipmentsService {
    #[tracing::instrument(name = "shipments.service.create", skip(self, data), err)]
    async fn create_shipment(
        &self,
        user: UserUuid,
        data: NewShipment,
    ) -> Result<Shipment, ShipmentsServiceError> {
        self.require_customer(user).await?;

        data.package_dimensions
            .validate(self.config.limits.min_package_dimension_cm)?;

        let volume_m3 = data.package_dimensions.volume_m3();
        let distance_km = geo::distance_km(
            data.pickup_address.coordinates(),
            data.delivery_address.coordinates(),
        );
        let price = pricing::package_price(volume_m3, distance_km, &self.config.pricing);

        let now = Timestamp::now();
        let participant = Participant {
            id: ParticipantId::new(),
            user,
            pickup_address: data.pickup_address,
            delivery_address: data.delivery_address,
            package_dimensions: data.package_dimensions,
            package_volume_m3: volume_m3,
            price: price.total_price,
            distance_km,
            joined_at: now,
        };

        let mut shipment = Shipment {
            uuid: data.uuid,
            created_by: user,
            participants: vec![participant],
            transporter: None,
            status: ShipmentStatus::Requested,
            assigned_vehicle: None,
            total_price: price.total_price,
            used_volume_m3: volume_m3,
            available_volume_m3: 0.0,
            scheduled_date: time::date_at_noon_utc(data.scheduled_date)?,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            suggested_route: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        regenerate_route(&mut shipment)?;

        self.shipments.insert(shipment.clone()).await?;

        self.notify(shipment.uuid, smallvec![user], ShipmentEventKind::Created)
            .await;

        Ok(shipment)
    }

    #[tracing::instrument(name = "shipments.service.join", skip(self, data), err)]
    async fn join_shipment(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
        data: JoinShipment,
    ) -> Result<Shipment, ShipmentsServiceError> {
        self.require_customer(user).await?;

        let mut shipment = self.shipments.get(uuid).await?;

        if shipment.is_participant(user) {
            return Err(ShipmentsServiceError::AlreadyParticipating);
        }

        data.package_dimensions
            .validate(self.config.limits.min_package_dimension_cm)?;

        let volume_m3 = data.package_dimensions.volume_m3();
        let distance_km = geo::distance_km(
            data.pickup_address.coordinates(),
            data.delivery_address.coordinates(),
        );

        let assessment = {
            let stops = pool_stops(&shipment);
            let snapshot = PoolSnapshot {
                status: shipment.status,
                transporter_assigned: shipment.transporter.is_some(),
                vehicle_volume_m3: shipment
                    .assigned_vehicle
                    .as_ref()
                    .map(|vehicle| vehicle.total_volume_m3),
                used_volume_m3: shipment.used_volume_m3,
                participants: &stops,
            };
            let candidate = JoinCandidate {
                pickup: data.pickup_address.coordinates(),
                delivery: data.delivery_address.coordinates(),
                volume_m3,
            };

            eligibility::assess_join(&snapshot, &candidate, &self.config.limits)
        };

        if !assessment.can_join {
            return Err(ShipmentsServiceError::Ineligible(assessment.reasons));
        }

        let price = pricing::package_price(volume_m3, distance_km, &self.config.pricing);

        shipment.participants.push(Participant {
            id: ParticipantId::new(),
            user,
            pickup_address: data.pickup_address,
            delivery_address: data.delivery_address,
            package_dimensions: data.package_dimensions,
            package_volume_m3: volume_m3,
            price: price.total_price,
            distance_km,
            joined_at: Timestamp::now(),
        });
        shipment.total_price += price.total_price;
        shipment.used_volume_m3 += volume_m3;
        shipment.available_volume_m3 = capacity::available_volume_m3(
            shipment
                .assigned_vehicle
                .as_ref()
                .map(|vehicle| vehicle.total_volume_m3),
            shipment.used_volume_m3,
        );

        regenerate_route(&mut shipment)?;

        let updated = self.persist(shipment).await?;

        let mut recipients: Recipients = smallvec![updated.created_by];
        if let Some(transporter) = updated.transporter {
            recipients.push(transporter);
        }
        recipients.push(user);

        self.notify(updated.uuid, recipients, ShipmentEventKind::ParticipantJoined)
            .await;

        Ok(updated)
    }

    #[tracing::instrument(name = "shipments.service.leave", skip(self), err)]
    async fn leave_shipment(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError> {
        let mut shipment = self.shipments.get(uuid).await?;

        let (participant_id, price, volume_m3) = {
            let participant = shipment
                .participant_of(user)
                .ok_or(ShipmentsServiceError::NotAuthorized)?;

            (participant.id, participant.price, participant.package_volume_m3)
        };

        if !matches!(
            shipment.status,
            ShipmentStatus::Requested | ShipmentStatus::Taken
        ) {
            return Err(ShipmentsServiceError::LeaveNotAllowed);
        }

        if shipment.participants.len() <= 1 {
            return Err(ShipmentsServiceError::SoleParticipant);
        }

        shipment.participants.retain(|p| p.id != participant_id);
        shipment.total_price = shipment.total_price.saturating_sub(price);
        shipment.used_volume_m3 = (shipment.used_volume_m3 - volume_m3).max(0.0);
        shipment.available_volume_m3 = capacity::available_volume_m3(
            shipment
                .assigned_vehicle
                .as_ref()
                .map(|vehicle| vehicle.total_volume_m3),
            shipment.used_volume_m3,
        );

        regenerate_route(&mut shipment)?;

        let updated = self.persist(shipment).await?;

        let mut recipients = all_recipients(&updated);
        recipients.push(user);

        self.notify(updated.uuid, recipients, ShipmentEventKind::ParticipantLeft)
            .await;

        Ok(updated)
    }

    #[tracing::instrument(name = "shipments.service.assign", skip(self), err)]
    async fn assign_transporter(
        &self,
        transporter: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError> {
        let profile = self.users.get(transporter).await?;

        if profile.role != UserRole::Transporter {
            return Err(ShipmentsServiceError::TransporterUnavailable(
                TransporterRefusal::NotATransporter,
            ));
        }

        if !profile.is_profile_completed {
            return Err(ShipmentsServiceError::TransporterUnavailable(
                TransporterRefusal::ProfileIncomplete,
            ));
        }

        if profile.license_status != LicenseStatus::Approved {
            return Err(ShipmentsServiceError::TransporterUnavailable(
                TransporterRefusal::LicenseNotApproved,
            ));
        }

        let Some(vehicle) = profile.vehicle else {
            return Err(ShipmentsServiceError::TransporterUnavailable(
                TransporterRefusal::NoVehicle,
            ));
        };

        if self
            .shipments
            .find_active_for_transporter(transporter)
            .await?
            .is_some()
        {
            return Err(ShipmentsServiceError::TransporterUnavailable(
                TransporterRefusal::AlreadyBusy,
            ));
        }

        let mut shipment = self.shipments.get(uuid).await?;

        lifecycle::ensure_transition(shipment.status, ShipmentStatus::Taken)?;

        if shipment.transporter.is_some() {
            return Err(ShipmentsServiceError::TransporterAlreadyAssigned);
        }

        let vehicle_volume_m3 = vehicle.dimensions.volume_m3();

        if shipment.used_volume_m3 > vehicle_volume_m3 {
            return Err(ShipmentsServiceError::CapacityExceeded {
                available_volume_m3: vehicle_volume_m3,
                required_volume_m3: shipment.used_volume_m3,
            });
        }

        shipment.transporter = Some(transporter);
        shipment.status = ShipmentStatus::Taken;
        shipment.assigned_vehicle = Some(VehicleSnapshot {
            plate: vehicle.plate,
            dimensions: vehicle.dimensions,
            total_volume_m3: vehicle_volume_m3,
        });
        shipment.available_volume_m3 = vehicle_volume_m3 - shipment.used_volume_m3;

        regenerate_route(&mut shipment)?;

        let updated = self.persist(shipment).await?;

        self.notify(
            updated.uuid,
            all_recipients(&updated),
            ShipmentEventKind::TransporterAssigned,
        )
        .await;

        Ok(updated)
    }

    #[tracing::instrument(name = "shipments.service.leave_as_transporter", skip(self), err)]
    async fn leave_as_transporter(
        &self,
        transporter: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError> {
        let mut shipment = self.shipments.get(uuid).await?;

        if shipment.transporter != Some(transporter) {
            return Err(ShipmentsServiceError::NotAuthorized);
        }

        if shipment.status != ShipmentStatus::Taken {
            return Err(ShipmentsServiceError::LeaveNotAllowed);
        }

        // deliberate revert outside the transition table: the shipment goes
        // back on the market exactly as before the assignment
        shipment.status = ShipmentStatus::Requested;
        shipment.transporter = None;
        shipment.assigned_vehicle = None;
        shipment.available_volume_m3 = 0.0;

        regenerate_route(&mut shipment)?;

        let updated = self.persist(shipment).await?;

        let mut recipients = all_recipients(&updated);
        recipients.push(transporter);

        self.notify(updated.uuid, recipients, ShipmentEventKind::TransporterLeft)
            .await;

        Ok(updated)
    }

    #[tracing::instrument(name = "shipments.service.update_status", skip(self), err)]
    async fn update_status(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
        new_status: ShipmentStatus,
        reason: Option<String>,
    ) -> Result<Shipment, ShipmentsServiceError> {
        let mut shipment = self.shipments.get(uuid).await?;

        // the table is checked before any permission rule, so callers always
        // learn about an impossible transition first
        lifecycle::ensure_transition(shipment.status, new_status)?;

        let is_transporter = shipment.transporter == Some(user);

        match new_status {
            ShipmentStatus::Taken => return Err(ShipmentsServiceError::AssignmentRequired),
            ShipmentStatus::Requested => {
                return Err(ShipmentsServiceError::InvalidTransition(TransitionError {
                    from: shipment.status,
                    to: new_status,
                }));
            }
            ShipmentStatus::Started => {
                if !is_transporter {
                    return Err(ShipmentsServiceError::NotAuthorized);
                }

                shipment.started_at = Some(Timestamp::now());
            }
            ShipmentStatus::Finished => {
                if !is_transporter {
                    return Err(ShipmentsServiceError::NotAuthorized);
                }

                let route_complete = shipment
                    .suggested_route
                    .as_ref()
                    .is_some_and(progress::is_complete);

                if !route_complete {
                    return Err(ShipmentsServiceError::UnvisitedStops);
                }

                shipment.completed_at = Some(Timestamp::now());
            }
            ShipmentStatus::Canceled => {
                let allowed = if is_transporter {
                    shipment.status == ShipmentStatus::Started
                } else if shipment.is_participant(user) {
                    // a multi-participant shipment is never canceled by one
                    // member; they leave instead
                    shipment.participants.len() == 1
                        && matches!(
                            shipment.status,
                            ShipmentStatus::Requested | ShipmentStatus::Taken
                        )
                } else {
                    false
                };

                if !allowed {
                    return Err(ShipmentsServiceError::NotAuthorized);
                }

                shipment.cancelled_at = Some(Timestamp::now());
                shipment.cancellation_reason = reason.clone();
            }
        }

        shipment.status = new_status;

        let updated = self.persist(shipment).await?;

        let mut recipients: Recipients =
            updated.participants.iter().map(|p| p.user).collect();
        if let Some(transporter) = updated.transporter {
            if transporter != user {
                recipients.push(transporter);
            }
        }

        self.notify(
            updated.uuid,
            recipients,
            ShipmentEventKind::StatusChanged {
                status: new_status,
                reason,
            },
        )
        .await;

        Ok(updated)
    }

    #[tracing::instrument(name = "shipments.service.mark_stop_visited", skip(self), err)]
    async fn mark_stop_visited(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
        participant: ParticipantId,
        kind: StopKind,
    ) -> Result<Shipment, ShipmentsServiceError> {
        let mut shipment = self.shipments.get(uuid).await?;

        if shipment.status != ShipmentStatus::Started {
            return Err(ShipmentsServiceError::NotStarted);
        }

        let owns_stop = shipment
            .participant(participant)
            .is_some_and(|p| p.user == user);

        if !owns_stop {
            return Err(ShipmentsServiceError::NotAuthorized);
        }

        let route = shipment
            .suggested_route
            .as_mut()
            .ok_or(ShipmentsServiceError::Progress(ProgressError::UnknownStop))?;

        progress::mark_visited(route, participant, kind)?;

        let updated = self.persist(shipment).await?;

        self.notify(
            updated.uuid,
            all_recipients(&updated),
            ShipmentEventKind::StopVisited { participant, kind },
        )
        .await;

        Ok(updated)
    }

    #[tracing::instrument(name = "shipments.service.progress", skip(self), err)]
    async fn progress(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<RouteProgress, ShipmentsServiceError> {
        let shipment = self.get_shipment(user, uuid).await?;

        Ok(progress::route_progress(shipment.suggested_route.as_ref()))
    }

    #[tracing::instrument(name = "shipments.service.next_destination", skip(self), err)]
    async fn next_destination(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Option<RouteStop>, ShipmentsServiceError> {
        let shipment = self.get_shipment(user, uuid).await?;

        Ok(shipment
            .suggested_route
            .as_ref()
            .and_then(|route| progress::next_destination(route))
            .cloned())
    }

    #[tracing::instrument(name = "shipments.service.get", skip(self), err)]
    async fn get_shipment(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError> {
        let shipment = self.shipments.get(uuid).await?;

        self.ensure_can_view(user, &shipment).await?;

        Ok(shipment)
    }

    #[tracing::instrument(name = "shipments.service.list_open", skip(self), err)]
    async fn list_open_for_transporter(
        &self,
        _transporter: UserUuid,
        page: usize,
        limit: usize,
    ) -> Result<ShipmentPage, ShipmentsServiceError> {
        let today = time::start_of_date_utc(time::utc_date(Timestamp::now()))?;

        let page = self
            .shipments
            .list(ShipmentQuery {
                statuses: vec![ShipmentStatus::Requested],
                unassigned_only: true,
                scheduled_from: Some(today),
                page,
                limit,
                ..ShipmentQuery::default()
            })
            .await?;

        Ok(page)
    }

    #[tracing::instrument(name = "shipments.service.list_joinable", skip(self), err)]
    async fn list_joinable_for_customer(
        &self,
        user: UserUuid,
        page: usize,
        limit: usize,
    ) -> Result<ShipmentPage, ShipmentsServiceError> {
        let today = time::start_of_date_utc(time::utc_date(Timestamp::now()))?;

        let page = self
            .shipments
            .list(ShipmentQuery {
                statuses: vec![ShipmentStatus::Requested, ShipmentStatus::Taken],
                exclude_participant: Some(user),
                scheduled_from: Some(today),
                page,
                limit,
                ..ShipmentQuery::default()
            })
            .await?;

        Ok(page)
    }

    #[tracing::instrument(name = "shipments.service.list_for_user", skip(self, query), err)]
    async fn list_for_user(
        &self,
        user: UserUuid,
        query: ShipmentQuery,
    ) -> Result<ShipmentPage, ShipmentsServiceError> {
        let page = self
            .shipments
            .list(ShipmentQuery {
                member: Some(user),
                ..query
            })
            .await?;

        Ok(page)
    }
}

/// Rebuilds the route for the current participant list, carrying visited
/// flags over for stops that survived the change.
fn regenerate_route(shipment: &mut Shipment) -> Result<(), ShipmentsServiceError> {
    let input: Vec<ParticipantWaypoints> = shipment
        .participants
        .iter()
        .map(|p| ParticipantWaypoints {
            id: p.id,
            pickup: p.pickup_address.clone(),
            delivery: p.delivery_address.clone(),
        })
        .collect();

    let mut fresh = route::plan_route(&input)?;

    if let Some(previous) = &shipment.suggested_route {
        route::carry_visited(previous, &mut fresh);
    }

    shipment.suggested_route = Some(fresh);

    Ok(())
}

fn pool_stops(shipment: &Shipment) -> Vec<ParticipantStops> {
    shipment
        .participants
        .iter()
        .map(|p| ParticipantStops {
            pickup: p.pickup_address.coordinates(),
            delivery: p.delivery_address.coordinates(),
        })
        .collect()
}

fn all_recipients(shipment: &Shipment) -> Recipients {
    let mut recipients: Recipients = shipment.participants.iter().map(|p| p.user).collect();

    if let Some(transporter) = shipment.transporter {
        recipients.push(transporter);
    }

    recipients
}

/// Shipment marketplace operations.
#[automock]
#[async_trait]
pub trait ShipmentsService: Send + Sync {
    /// Create a shipment with the acting customer as first participant.
    async fn create_shipment(
        &self,
        user: UserUuid,
        data: NewShipment,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Join an existing shipment with another package.
    async fn join_shipment(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
        data: JoinShipment,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Leave a shipment; only valid for non-sole participants before the
    /// route starts.
    async fn leave_shipment(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Take a requested shipment as its transporter.
    async fn assign_transporter(
        &self,
        transporter: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Step away from a taken shipment, putting it back on the market.
    async fn leave_as_transporter(
        &self,
        transporter: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Move the shipment through its lifecycle (started, finished,
    /// canceled). Assignment is [`ShipmentsService::assign_transporter`]'s
    /// job.
    async fn update_status(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
        new_status: ShipmentStatus,
        reason: Option<String>,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Complete one stop of the started route, in strict sequence order.
    async fn mark_stop_visited(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
        participant: ParticipantId,
        kind: StopKind,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Completion counters for the shipment's route.
    async fn progress(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<RouteProgress, ShipmentsServiceError>;

    /// The first unvisited stop, if any.
    async fn next_destination(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Option<RouteStop>, ShipmentsServiceError>;

    /// Load one shipment; participants, the transporter and admins may look.
    async fn get_shipment(
        &self,
        user: UserUuid,
        uuid: ShipmentUuid,
    ) -> Result<Shipment, ShipmentsServiceError>;

    /// Requested, unassigned shipments scheduled today or later.
    async fn list_open_for_transporter(
        &self,
        transporter: UserUuid,
        page: usize,
        limit: usize,
    ) -> Result<ShipmentPage, ShipmentsServiceError>;

    /// Joinable shipments the customer is not already part of.
    async fn list_joinable_for_customer(
        &self,
        user: UserUuid,
        page: usize,
        limit: usize,
    ) -> Result<ShipmentPage, ShipmentsServiceError>;

    /// Shipments the user participates in or transports.
    async fn list_for_user(
        &self,
        user: UserUuid,
        query: ShipmentQuery,
    ) -> Result<ShipmentPage, ShipmentsServiceError>;
}
