//! Error types for the engine and its collaborators.

use thiserror::Error;

/// Recoverable failures of inbound engine operations.
///
/// None of these are fatal: the engine logs them, leaves its state untouched
/// and hands them back so an outer surface can report them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no tracked object with id `{0}`")]
    UnknownObject(String),

    #[error("tracked object `{0}` already exists")]
    DuplicateId(String),

    #[error("route arrays differ in length (lons={lons}, lats={lats}, alts={alts})")]
    RouteLengthMismatch { lons: usize, lats: usize, alts: usize },

    #[error("route has no waypoints")]
    EmptyRoute,

    #[error("no ground reference established for `{0}`")]
    NoGroundReference(String),

    #[error("`{0}` is a station and has no flight paths")]
    UnsupportedForStation(String),

    #[error("`{0}` cannot point its payload at itself")]
    SelfPointing(String),
}

/// Failures reported by an elevation provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElevationError {
    #[error("elevation request failed: {0}")]
    Request(String),

    #[error("elevation provider returned HTTP {0}")]
    Status(u16),

    #[error("elevation response could not be decoded: {0}")]
    Decode(String),
}
