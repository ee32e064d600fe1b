//! Haulpool CLI
//!
//! Offline front-end to the pooling engine: price a package or preview the
//! multi-stop route for a set of participants, without any backing services.

use std::{fs, path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;
use tabled::{Table, Tabled};

use haulpool::{
    address::Address,
    config::{PoolingLimits, PricingConfig},
    dimensions::Dimensions,
    geo::{self, Coordinates},
    pricing,
    route::{self, ParticipantId, ParticipantWaypoints, StopKind},
};

#[derive(Debug, Parser)]
#[command(name = "haulpool", about = "Haulpool CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a package for a pickup/delivery pair.
    Quote(QuoteArgs),
    /// Plan the stop sequence for participants read from a JSON file.
    Route(RouteArgs),
}

#[derive(Debug, Args)]
struct PricingArgs {
    /// Base price per cubic metre
    #[arg(long, env = "FIXED_VOLUME_PRICE", default_value_t = 10_000.0)]
    fixed_volume_price: f64,

    /// Fuel price per litre; the per-km rate is 10% of it
    #[arg(long, env = "FUEL_PRICE_PER_LITER", default_value_t = 1_500.0)]
    fuel_price_per_liter: f64,

    /// Marketplace margin (0.2 = 20%)
    #[arg(long, env = "MARGIN_PERCENTAGE", default_value_t = 0.2)]
    margin: f64,
}

impl PricingArgs {
    fn config(&self) -> PricingConfig {
        PricingConfig {
            fixed_volume_price: self.fixed_volume_price,
            fuel_price_per_liter: self.fuel_price_per_liter,
            margin: self.margin,
        }
    }
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Package length in cm
    #[arg(long)]
    length: f64,

    /// Package width in cm
    #[arg(long)]
    width: f64,

    /// Package height in cm
    #[arg(long)]
    height: f64,

    /// Pickup latitude
    #[arg(long)]
    pickup_lat: f64,

    /// Pickup longitude
    #[arg(long)]
    pickup_lng: f64,

    /// Delivery latitude
    #[arg(long)]
    delivery_lat: f64,

    /// Delivery longitude
    #[arg(long)]
    delivery_lng: f64,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    pricing: PricingArgs,
}

#[derive(Debug, Args)]
struct RouteArgs {
    /// JSON file with an array of {"pickup": <address>, "delivery": <address>}
    file: PathBuf,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// One participant as read from the route input file.
#[derive(Debug, Deserialize)]
struct WaypointInput {
    pickup: Address,
    delivery: Address,
}

#[derive(Tabled)]
struct StopRow {
    #[tabled(rename = "#")]
    order: usize,
    #[tabled(rename = "type")]
    kind: &'static str,
    participant: usize,
    address: String,
    #[tabled(rename = "leg km")]
    leg_km: f64,
}

pub fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("{error}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Quote(args) => quote(&args),
        Commands::Route(args) => plan(&args),
    }
}

fn quote(args: &QuoteArgs) -> Result<(), String> {
    let package = Dimensions::new(args.length, args.width, args.height);

    package
        .validate(PoolingLimits::default().min_package_dimension_cm)
        .map_err(|error| error.to_string())?;

    let volume_m3 = package.volume_m3();
    let distance_km = geo::distance_km(
        Coordinates::new(args.pickup_lat, args.pickup_lng),
        Coordinates::new(args.delivery_lat, args.delivery_lng),
    );

    let price = pricing::package_price(volume_m3, distance_km, &args.pricing.config());

    if args.json {
        let output = json!({
            "volume_m3": volume_m3,
            "distance_km": distance_km,
            "volume_price": price.volume_price,
            "distance_price": price.distance_price,
            "total_price": price.total_price,
        });

        println!("{output:#}");
    } else {
        println!("volume: {volume_m3}m³");
        println!("distance: {distance_km}km");
        println!("volume price: {}", price.volume_price);
        println!("distance price: {}", price.distance_price);
        println!("total: {}", price.total_price);
    }

    Ok(())
}

fn plan(args: &RouteArgs) -> Result<(), String> {
    let raw = fs::read_to_string(&args.file)
        .map_err(|error| format!("failed to read {}: {error}", args.file.display()))?;

    let inputs: Vec<WaypointInput> =
        serde_json::from_str(&raw).map_err(|error| format!("invalid route input: {error}"))?;

    let waypoints: Vec<ParticipantWaypoints> = inputs
        .into_iter()
        .map(|input| ParticipantWaypoints {
            id: ParticipantId::new(),
            pickup: input.pickup,
            delivery: input.delivery,
        })
        .collect();

    let planned = route::plan_route(&waypoints).map_err(|error| error.to_string())?;

    if args.json {
        let output =
            serde_json::to_string_pretty(&planned).map_err(|error| error.to_string())?;

        println!("{output}");

        return Ok(());
    }

    let index_of = |participant: ParticipantId| {
        waypoints
            .iter()
            .position(|waypoint| waypoint.id == participant)
            .unwrap_or_default()
    };

    let rows: Vec<StopRow> = planned
        .stops
        .iter()
        .enumerate()
        .map(|(order, stop)| StopRow {
            order: order + 1,
            kind: match stop.kind {
                StopKind::Pickup => "pickup",
                StopKind::Delivery => "delivery",
            },
            participant: index_of(stop.participant) + 1,
            address: stop.address.formatted_address.clone(),
            leg_km: stop.distance_from_previous,
        })
        .collect();

    println!("{}", Table::new(rows));
    println!(
        "total: {}km over {} stops, roughly {} minutes",
        planned.total_distance,
        planned.total_stops,
        planned.estimated_duration_minutes.round()
    );

    Ok(())
}
