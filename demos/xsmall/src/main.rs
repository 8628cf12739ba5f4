//! xsmall — smallest end-to-end run of the taxi-rank logistics core.
//!
//! Seeds six Cape Town ranks from embedded CSV, then walks one parcel from
//! creation to receipt: shortest-hop trip, leg drivers, leg moves, status
//! updates and OTP verification.
//!
//! ```text
//! cargo run -p xsmall                      # default policy
//! cargo run -p xsmall -- dispatch.json     # DispatchConfig from JSON
//! RUST_LOG=debug cargo run -p xsmall       # include BFS and rejections
//! ```

mod network;

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use rank_core::{
    Contact, DispatchConfig, GeoPoint, NewDriver, NewParcel, PackageRef, PackageTypeId,
    ParcelStatus, RankId, Route,
};
use rank_dispatch::{DispatcherBuilder, ErrorKind, Population};
use rank_graph::BfsPathFinder;
use rank_store::{EntityStore, MemoryStore, load_ranks_reader, load_routes_reader};

use network::{RANKS_CSV, ROUTES_CSV};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED: u64 = 42;

const CBD:             RankId = RankId(1);
const MITCHELLS_PLAIN: RankId = RankId(3);
const KHAYELITSHA:     RankId = RankId(4);

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configuration.
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None       => DispatchConfig { code_seed: Some(SEED), ..Default::default() },
    };
    println!("=== xsmall — taxi-rank logistics ===");
    println!("Policy: parallel routes {}, otp {} digits", config.parallel_route_policy, config.otp_digits);
    println!();

    // 2. Seed the store.
    let store = MemoryStore::new();
    let ranks = load_ranks_reader(Cursor::new(RANKS_CSV), &store)?;
    let routes = load_routes_reader(Cursor::new(ROUTES_CSV), &store)?;
    println!("Seeded {ranks} ranks and {routes} routes");

    let dispatcher = DispatcherBuilder::new(store, BfsPathFinder).config(config).build()?;

    // 3. Where can a client at the station board?
    let near = dispatcher.nearest_ranks(GeoPoint::new(-33.9220, 18.4300), 2)?;
    let names: Vec<&str> = near.iter().map(|r| r.name.as_str()).collect();
    println!("Nearest ranks to the station: {}", names.join(", "));

    // 4. Trip CBD → Khayelitsha.
    let trip = dispatcher.create_trip(CBD, KHAYELITSHA)?;
    println!(
        "Trip {}: {} legs, {:.1} km, R{:.2}",
        trip.id(),
        trip.leg_count(),
        trip.full_distance(),
        trip.price()
    );

    match dispatcher.create_trip(KHAYELITSHA, MITCHELLS_PLAIN) {
        Err(e) if e.kind() == ErrorKind::Unreachable => println!("Khayelitsha → Mitchells Plain: {e}"),
        Err(e) => return Err(e.into()),
        Ok(t)  => println!("Khayelitsha → Mitchells Plain: trip {}", t.id()),
    }

    // 5. Drivers, one per departure rank.
    let association = dispatcher.create_association("Cape Amalgamated Taxi Association")?;
    let mut drivers = Vec::with_capacity(trip.leg_count());
    for leg in trip.legs() {
        let route_id = leg.details.context("leg without route")?;
        let route: Route = dispatcher.store().get(route_id)?.context("leg route vanished")?;
        dispatcher.link_association_to_rank(route.from_rank, association.id)?;

        let driver = dispatcher.register_driver(NewDriver {
            name:        format!("Driver {}", leg.leg),
            phone:       format!("08200000{:02}", leg.leg),
            association: Some(association.id),
            ..Default::default()
        })?;
        dispatcher.link_driver_to_rank(driver.id, route.from_rank)?;
        dispatcher.link_driver_to_leg(trip.id(), leg.leg, driver.id)?;
        drivers.push(driver.id);
    }
    println!("Linked {} drivers", drivers.len());

    if let Some(&first) = drivers.first() {
        if let Err(e) = dispatcher.link_driver_to_leg(trip.id(), trip.leg_count() as u32, first) {
            println!("Driver {first} on the last leg: {e} [{}]", e.kind());
        }
    }

    // 6. One parcel, end to end.
    let parcel = dispatcher.create_parcel(NewParcel {
        sender:    Contact { name: "Lerato M".into(), phone: "0710000001".into(), email: None },
        receiver:  Contact { name: "Sipho N".into(), phone: "0710000002".into(), email: None },
        package:   PackageRef { id: "BOX-0001".into(), package_type: PackageTypeId(1) },
        trip:      Some(trip.id()),
        leg_index: Some(0),
    })?;
    println!("Parcel {} tracking {}", parcel.id, parcel.tracking_number);

    dispatcher.update_parcel_status(parcel.id, ParcelStatus::InTransit)?;
    for leg_index in 1..trip.leg_count() as i64 {
        dispatcher.move_parcel_leg(parcel.id, leg_index, None)?;
    }
    dispatcher.update_parcel_status(parcel.id, ParcelStatus::Delivered)?;
    let received = dispatcher.verify_parcel_otp(parcel.id, &parcel.otp)?;
    let found = dispatcher.find_parcel_by_tracking(&parcel.tracking_number)?;
    println!("Parcel {} is {} (leg {:?})", found.id, received.status, found.leg_index());
    println!();

    // 7. Fully populated trip.
    let view = dispatcher.get_trip(trip.id(), Population::Deep)?;
    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}

fn load_config(path: &Path) -> Result<DispatchConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: DispatchConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}
