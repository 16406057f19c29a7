//! Simulation helpers shared by the CLI binaries.

pub mod client;
pub mod paths;

pub use client::GeotraceClient;
pub use paths::{circular_route, random_power, FlightPhase, RoutePoints, ZigZagFlight};
