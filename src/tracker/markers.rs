//! Shared set of divergence marker positions

use std::collections::HashSet;
use std::sync::Mutex;

use crate::schematic::position::BlockPos;

/// World positions currently flagged as diverging from the schematic.
///
/// The tracker owns one end and a renderer the other, shared via `Arc`;
/// the renderer takes point-in-time snapshots rather than holding the
/// lock across a frame.
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: Mutex<HashSet<BlockPos>>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a position; returns false if it was already flagged.
    pub fn add(&self, pos: BlockPos) -> bool {
        self.markers.lock().unwrap().insert(pos)
    }

    /// Unflag a position; returns false if it was not flagged.
    pub fn remove(&self, pos: &BlockPos) -> bool {
        self.markers.lock().unwrap().remove(pos)
    }

    pub fn clear(&self) {
        self.markers.lock().unwrap().clear();
    }

    pub fn contains(&self, pos: &BlockPos) -> bool {
        self.markers.lock().unwrap().contains(pos)
    }

    pub fn len(&self) -> usize {
        self.markers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.lock().unwrap().is_empty()
    }

    /// Copy of the current markers, for rendering
    pub fn snapshot(&self) -> Vec<BlockPos> {
        self.markers.lock().unwrap().iter().copied().collect()
    }
}
