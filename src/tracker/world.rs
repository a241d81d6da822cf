//! World point-query capability

use std::collections::HashMap;

use crate::schematic::block::{BlockCatalog, BlockKey};
use crate::schematic::position::BlockPos;

/// Point query into the live world.
///
/// Never fails: unloaded or out-of-world positions read as air, so
/// callers treat "not there yet" and "empty" identically.
pub trait WorldQuery {
    fn block_at(&self, pos: BlockPos) -> BlockKey;
}

/// Map-backed world for tests and offline verification
#[derive(Debug, Clone)]
pub struct MapWorld {
    air: BlockKey,
    blocks: HashMap<BlockPos, BlockKey>,
}

impl MapWorld {
    pub fn new(catalog: &BlockCatalog) -> Self {
        Self { air: catalog.air(), blocks: HashMap::new() }
    }

    pub fn set(&mut self, pos: BlockPos, key: BlockKey) {
        self.blocks.insert(pos, key);
    }

    pub fn remove(&mut self, pos: &BlockPos) {
        self.blocks.remove(pos);
    }
}

impl WorldQuery for MapWorld {
    fn block_at(&self, pos: BlockPos) -> BlockKey {
        self.blocks.get(&pos).cloned().unwrap_or_else(|| self.air.clone())
    }
}
