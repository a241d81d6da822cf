//! Live world tracking: markers, world queries, divergence state

pub mod markers;
pub mod world;
pub mod divergence;

pub use divergence::{
    DivergenceTracker, Placement, REFRESH_INTERVAL_TICKS, REFRESH_RADIUS,
};
pub use markers::MarkerSet;
pub use world::{MapWorld, WorldQuery};
