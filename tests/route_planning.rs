//! Route planner properties across randomized-ish participant layouts

use haulpool::prelude::*;
use testresult::TestResult;

fn address(latitude: f64, longitude: f64) -> Address {
    Address {
        street: "Calle Falsa".to_owned(),
        number: None,
        city: None,
        state: None,
        country: "Argentina".to_owned(),
        postal_code: None,
        latitude,
        longitude,
        formatted_address: format!("Calle Falsa ({latitude}, {longitude})"),
        neighborhood: None,
    }
}

fn participant(pickup: (f64, f64), delivery: (f64, f64)) -> ParticipantWaypoints {
    ParticipantWaypoints {
        id: ParticipantId::new(),
        pickup: address(pickup.0, pickup.1),
        delivery: address(delivery.0, delivery.1),
    }
}

// A handful of two- and three-participant layouts, including clustered
// pickups, interleaved pairs, and one participant far from the others.
fn layouts() -> Vec<Vec<ParticipantWaypoints>> {
    vec![
        vec![participant((-34.60, -58.40), (-34.55, -58.45))],
        vec![
            participant((-34.60, -58.40), (-34.55, -58.45)),
            participant((-34.61, -58.39), (-34.58, -58.44)),
        ],
        vec![
            participant((-34.60, -58.40), (-34.55, -58.45)),
            participant((-34.61, -58.39), (-34.58, -58.44)),
            participant((-34.59, -58.41), (-34.62, -58.38)),
        ],
        vec![
            participant((-34.60, -58.40), (-34.60, -58.40)),
            participant((-34.60, -58.40), (-34.61, -58.41)),
        ],
        vec![
            participant((-34.60, -58.40), (-34.55, -58.45)),
            participant((-31.42, -64.18), (-31.40, -64.20)),
            participant((-34.90, -57.95), (-34.92, -57.96)),
        ],
    ]
}

#[test]
fn every_layout_covers_all_stops() -> TestResult {
    for layout in layouts() {
        let route = plan_route(&layout)?;

        assert_eq!(route.total_stops, layout.len() * 2);
        assert_eq!(route.stops.len(), route.total_stops);
    }

    Ok(())
}

#[test]
fn precedence_holds_in_every_layout() -> TestResult {
    for layout in layouts() {
        let route = plan_route(&layout)?;

        for waypoint in &layout {
            let pickup = route
                .stops
                .iter()
                .position(|s| s.participant == waypoint.id && s.kind == StopKind::Pickup)
                .ok_or("missing pickup stop")?;
            let delivery = route
                .stops
                .iter()
                .position(|s| s.participant == waypoint.id && s.kind == StopKind::Delivery)
                .ok_or("missing delivery stop")?;

            assert!(
                pickup < delivery,
                "pickup {pickup} must precede delivery {delivery}"
            );
        }
    }

    Ok(())
}

#[test]
fn first_leg_has_zero_distance() -> TestResult {
    for layout in layouts() {
        let route = plan_route(&layout)?;
        let first = route.stops.first().ok_or("route is empty")?;

        assert_eq!(first.distance_from_previous, 0.0);
    }

    Ok(())
}

#[test]
fn stop_addresses_are_snapshots_of_the_inputs() -> TestResult {
    let layout = layouts().remove(1);
    let route = plan_route(&layout)?;

    for stop in &route.stops {
        let waypoint = layout
            .iter()
            .find(|w| w.id == stop.participant)
            .ok_or("stop for unknown participant")?;

        let expected = match stop.kind {
            StopKind::Pickup => &waypoint.pickup,
            StopKind::Delivery => &waypoint.delivery,
        };

        assert_eq!(&stop.address, expected);
    }

    Ok(())
}

#[test]
fn greedy_picks_the_nearest_legal_stop_first() -> TestResult {
    // second participant's pickup sits right next to the first one's, while
    // the first delivery is far: the plan should collect both packages first
    let layout = vec![
        participant((-34.600, -58.400), (-34.400, -58.700)),
        participant((-34.601, -58.401), (-34.401, -58.701)),
    ];

    let route = plan_route(&layout)?;

    let kinds: Vec<_> = route.stops.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StopKind::Pickup,
            StopKind::Pickup,
            StopKind::Delivery,
            StopKind::Delivery,
        ]
    );

    Ok(())
}

#[test]
fn regeneration_after_a_leave_keeps_execution_state() -> TestResult {
    let mut layout = layouts().remove(2);
    let mut route = plan_route(&layout)?;

    // visit the first two stops in order
    let first_two: Vec<_> = route
        .stops
        .iter()
        .take(2)
        .map(|s| (s.participant, s.kind))
        .collect();

    for (participant, kind) in first_two {
        mark_visited(&mut route, participant, kind)?;
    }

    // the last joiner leaves; the route is rebuilt from scratch
    let departed = layout.pop().ok_or("layout is empty")?;
    let mut fresh = plan_route(&layout)?;
    carry_visited(&route, &mut fresh);

    for stop in &fresh.stops {
        assert_ne!(stop.participant, departed.id);

        let was_visited = route
            .stops
            .iter()
            .find(|s| s.participant == stop.participant && s.kind == stop.kind)
            .is_some_and(|s| s.visited);

        assert_eq!(stop.visited, was_visited);
    }

    Ok(())
}
