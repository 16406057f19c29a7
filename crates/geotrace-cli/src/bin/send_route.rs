//! Publish a circular planned route around a vehicle.

use anyhow::Result;
use clap::Parser;
use geotrace_cli::sim::{circular_route, GeotraceClient};
use geotrace_core::TrackedKind;

/// Send a 37-point circular route to the server
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Geotrace server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Vehicle that owns the route
    #[arg(long, default_value = "drone-1")]
    id: String,

    /// Circle center longitude
    #[arg(long, default_value_t = 10.3260)]
    lon: f64,

    /// Circle center latitude
    #[arg(long, default_value_t = 55.4725)]
    lat: f64,

    /// Base altitude; waypoints sit 50 m above it
    #[arg(long, default_value_t = 0.0)]
    alt: f64,

    /// Radius in degrees
    #[arg(long, default_value_t = 0.001)]
    radius: f64,

    /// Add the vehicle at the circle center if it does not exist yet
    #[arg(long)]
    create: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = GeotraceClient::new(&args.url);

    if args.create
        && client
            .add_object(&args.id, TrackedKind::Vehicle, args.lon, args.lat, args.alt)
            .await?
    {
        println!("Added vehicle {}", args.id);
    }

    let route = circular_route(args.lon, args.lat, args.alt, args.radius);
    println!(
        "Sending {} waypoints around ({}, {}) radius {}°",
        route.len(),
        args.lon,
        args.lat,
        args.radius
    );
    let accepted = client.set_route(&args.id, &route).await?;
    println!("Route accepted: {} waypoints", accepted);
    Ok(())
}
