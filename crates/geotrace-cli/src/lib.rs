//! Geotrace CLI - telemetry feeders for a running geotrace server.
//!
//! Binaries:
//! - sim_flight: zig-zag vehicle flight with a random power reading
//! - send_route: circular planned route around a vehicle

pub mod sim;
