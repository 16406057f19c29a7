//! Geotrace server library surface, shared by the binary and its tests.

pub mod api;
pub mod config;
pub mod loops;
pub mod scene;
pub mod state;
pub mod stream;
pub mod terrain;
