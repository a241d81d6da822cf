//! Schematic index: named regions and whole-volume queries

use std::collections::{BTreeMap, HashMap};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::schematic::block::BlockKey;
use crate::schematic::position::{BlockPos, ColumnKey, column_of};
use crate::schematic::region::{Region, RegionSize};

/// A decoded schematic: a set of uniquely named regions, each placed at
/// its own offset. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SchematicIndex {
    regions: BTreeMap<String, Region>,
}

impl SchematicIndex {
    /// Schematic with no regions (valid, contributes no blocks)
    pub fn empty() -> Self {
        Self { regions: BTreeMap::new() }
    }

    /// Assemble an index from named regions; region names must be unique.
    pub fn from_regions(regions: Vec<(String, Region)>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for (name, region) in regions {
            if map.insert(name.clone(), region).is_some() {
                return Err(Error::Decode(format!("duplicate region name: {name}")));
            }
        }
        Ok(Self { regions: map })
    }

    pub fn regions(&self) -> impl Iterator<Item = (&str, &Region)> {
        self.regions.iter().map(|(name, region)| (name.as_str(), region))
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Block at a region-local coordinate of a named region; unknown
    /// region, out of bounds, and air all read as `None`.
    pub fn get(&self, region: &str, x: i32, y: i32, z: i32) -> Option<&BlockKey> {
        self.regions.get(region)?.get(x, y, z)
    }

    pub fn size(&self, region: &str) -> Option<RegionSize> {
        self.regions.get(region).map(|r| r.size())
    }

    /// Iterate every solid block as (schematic-absolute position, key,
    /// owning region name). Absolute means region offset applied; the
    /// world placement origin is the caller's concern.
    pub fn iter_solid(&self) -> impl Iterator<Item = (BlockPos, &BlockKey, &str)> + '_ {
        self.regions.iter().flat_map(|(name, region)| {
            let offset = region.offset();
            region
                .iter_solid()
                .map(move |(local, key)| (offset + local, key, name.as_str()))
        })
    }

    /// Number of solid blocks across all regions
    pub fn solid_count(&self) -> u64 {
        self.regions.values().map(|r| r.iter_solid().count() as u64).sum()
    }

    /// Top-of-column projection: the highest solid block per (x, z)
    /// column. Each region contributes its own top-down first hit per
    /// column; where regions overlap in (x, z) the highest candidate
    /// across all of them wins.
    pub fn top_blocks(&self) -> HashMap<ColumnKey, (BlockPos, BlockKey)> {
        let mut tops: HashMap<ColumnKey, (BlockPos, BlockKey)> = HashMap::new();

        for region in self.regions.values() {
            let size = region.size();
            let offset = region.offset();
            for x in 0..size.width as i32 {
                for z in 0..size.depth as i32 {
                    for y in (0..size.height as i32).rev() {
                        if let Some(key) = region.get(x, y, z) {
                            let pos = offset + BlockPos::new(x, y, z);
                            tops.entry(column_of(pos))
                                .and_modify(|top| {
                                    if pos.y > top.0.y {
                                        *top = (pos, key.clone());
                                    }
                                })
                                .or_insert_with(|| (pos, key.clone()));
                            break;
                        }
                    }
                }
            }
        }

        tops
    }
}
