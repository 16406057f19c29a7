//! Elevation providers for the geotrace terrain resolver.
//!
//! The resolver only needs an [`ElevationProvider`](geotrace_core::ElevationProvider);
//! this crate supplies the Open-Meteo HTTP client, an in-memory grid and a
//! combinator that layers one over the other.

pub mod grid;
pub mod layered;
pub mod open_meteo;

pub use grid::{GridBounds, GridLayout, TerrainGrid};
pub use layered::LayeredElevation;
pub use open_meteo::{OpenMeteoElevation, DEFAULT_BASE_URL, MAX_POINTS_PER_REQUEST};
