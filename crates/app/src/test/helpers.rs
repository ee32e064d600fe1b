//! Test Helpers

use jiff::civil::{Date, date};
use uuid::Uuid;

use haulpool::{address::Address, dimensions::Dimensions};

use crate::domain::shipments::models::{JoinShipment, NewShipment, Shipment, ShipmentUuid};

/// A scheduled date safely in the future for "today or later" filters.
pub(crate) fn future_date() -> Date {
    date(2030, 6, 15)
}

pub(crate) fn address(latitude: f64, longitude: f64) -> Address {
    Address {
        street: "Av. Rivadavia".to_owned(),
        number: Some("2000".to_owned()),
        city: Some("Buenos Aires".to_owned()),
        state: None,
        country: "Argentina".to_owned(),
        postal_code: Some("C1033".to_owned()),
        latitude,
        longitude,
        formatted_address: format!("Av. Rivadavia 2000 ({latitude}, {longitude})"),
        neighborhood: None,
    }
}

/// 100×50×50cm, i.e. 0.25m³.
pub(crate) fn quarter_cubic_package() -> Dimensions {
    Dimensions::new(100.0, 50.0, 50.0)
}

/// A shipment from the Obelisco area to a point ~7km away.
pub(crate) fn new_shipment() -> NewShipment {
    NewShipment {
        uuid: ShipmentUuid::from_uuid(Uuid::now_v7()),
        pickup_address: address(-34.60, -58.40),
        delivery_address: address(-34.55, -58.45),
        package_dimensions: quarter_cubic_package(),
        scheduled_date: future_date(),
    }
}

/// A 0.1m³ join request a couple of kilometres from [`new_shipment`]'s
/// addresses.
pub(crate) fn nearby_join() -> JoinShipment {
    JoinShipment {
        pickup_address: address(-34.61, -58.41),
        delivery_address: address(-34.56, -58.46),
        package_dimensions: Dimensions::new(40.0, 50.0, 50.0),
    }
}

/// The `(user, participant id, kind)` triples of a route in stop order.
pub(crate) fn stop_sequence(
    shipment: &Shipment,
) -> Vec<(
    crate::domain::users::UserUuid,
    haulpool::route::ParticipantId,
    haulpool::route::StopKind,
)> {
    let route = shipment
        .suggested_route
        .as_ref()
        .expect("shipment has no route");

    route
        .stops
        .iter()
        .map(|stop| {
            let owner = shipment
                .participant(stop.participant)
                .expect("stop for unknown participant")
                .user;

            (owner, stop.participant, stop.kind)
        })
        .collect()
}
