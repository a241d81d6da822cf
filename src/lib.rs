//! Schemtools - schematic analysis and build tracking for voxel worlds

pub mod core;
pub mod schematic;
pub mod analysis;
pub mod tracker;
