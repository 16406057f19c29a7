//! Background loops for continuous processing.

pub mod engine_loop;
pub mod terrain_prune_loop;
