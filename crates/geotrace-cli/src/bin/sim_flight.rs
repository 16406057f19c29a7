//! Feed a zig-zag vehicle flight with a random power reading to the server.

use anyhow::Result;
use clap::Parser;
use geotrace_cli::sim::{paths::STEP_MS, random_power, GeotraceClient, ZigZagFlight};
use geotrace_core::TrackedKind;
use tokio::time::{self, Duration};

/// Simulate one vehicle flying a zig-zag pattern
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Geotrace server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Vehicle identifier
    #[arg(long, default_value = "drone-1")]
    id: String,

    /// Start longitude
    #[arg(long, default_value_t = 10.3260)]
    lon: f64,

    /// Start latitude
    #[arg(long, default_value_t = 55.4725)]
    lat: f64,

    /// Start altitude above ground in meters
    #[arg(long, default_value_t = 100.0)]
    alt: f64,

    /// Stop after this many seconds (0 runs until interrupted)
    #[arg(long, default_value_t = 0)]
    duration: u64,

    /// Send positions without extending the live path
    #[arg(long)]
    no_path: bool,

    /// Ask viewers to follow the vehicle
    #[arg(long)]
    follow: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = GeotraceClient::new(&args.url);

    println!("Connecting to geotrace server at {}...", client.base_url());
    if client
        .add_object(&args.id, TrackedKind::Vehicle, args.lon, args.lat, args.alt)
        .await?
    {
        println!("Added vehicle {}", args.id);
    } else {
        println!("Vehicle {} already exists, reusing it", args.id);
    }
    if args.follow {
        client.follow(Some(&args.id)).await?;
    }

    let mut flight = ZigZagFlight::new(args.lon, args.lat, args.alt);
    let start = time::Instant::now();
    let mut interval = time::interval(Duration::from_millis(STEP_MS));
    let mut sent = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
        if args.duration > 0 && start.elapsed().as_secs() >= args.duration {
            break;
        }

        let (lon, lat, alt) = flight.step();
        let power = random_power(&mut rand::rng());
        match client
            .update_position(&args.id, lon, lat, alt, !args.no_path, Some(power))
            .await
        {
            Ok(()) => {
                sent += 1;
                println!(
                    "[{:4}] ({:.6}, {:.6}, {:.1}) power={:4} -> OK",
                    sent, lon, lat, alt, power
                );
            }
            Err(e) => eprintln!("Error sending position: {}", e),
        }
    }

    println!("\nSimulation stopped. Sent {} position updates.", sent);
    Ok(())
}
