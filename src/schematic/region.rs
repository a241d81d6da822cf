//! Named sub-volume of a schematic: palette-compressed dense block storage

use crate::core::error::Error;
use crate::core::types::Result;
use crate::schematic::block::BlockKey;
use crate::schematic::position::BlockPos;

/// Integer dimensions of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSize {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl RegionSize {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }

    /// Number of cells in the region
    pub fn volume(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }
}

/// A named sub-volume with its own placement offset within the schematic.
///
/// Cells hold indices into the palette; a cell is non-solid when its
/// palette entry is air. Cell order is x-fastest, then z, then y.
#[derive(Debug, Clone)]
pub struct Region {
    size: RegionSize,
    offset: BlockPos,
    palette: Vec<BlockKey>,
    cells: Vec<u32>,
}

impl Region {
    /// Build a region, validating cell count and palette references up
    /// front so a constructed region can always be read safely.
    pub fn new(
        size: RegionSize,
        offset: BlockPos,
        palette: Vec<BlockKey>,
        cells: Vec<u32>,
    ) -> Result<Self> {
        if cells.len() as u64 != size.volume() {
            return Err(Error::Decode(format!(
                "cell count {} does not match region volume {}",
                cells.len(),
                size.volume()
            )));
        }
        if let Some(bad) = cells.iter().find(|&&c| c as usize >= palette.len()) {
            return Err(Error::Decode(format!(
                "cell palette index {} out of range (palette size {})",
                bad,
                palette.len()
            )));
        }
        Ok(Self { size, offset, palette, cells })
    }

    /// Build a region from explicit solid blocks; every other cell is air.
    /// Intended for programmatic construction and external decoders.
    pub fn from_blocks(
        size: RegionSize,
        offset: BlockPos,
        air: BlockKey,
        blocks: &[(BlockPos, BlockKey)],
    ) -> Result<Self> {
        let mut palette = vec![air];
        let mut cells = vec![0u32; size.volume() as usize];

        for (pos, key) in blocks {
            if pos.x < 0
                || pos.y < 0
                || pos.z < 0
                || pos.x as u32 >= size.width
                || pos.y as u32 >= size.height
                || pos.z as u32 >= size.depth
            {
                return Err(Error::Decode(format!(
                    "block position {pos} outside region size {}x{}x{}",
                    size.width, size.height, size.depth
                )));
            }
            let index = match palette.iter().position(|k| k == key) {
                Some(i) => i,
                None => {
                    palette.push(key.clone());
                    palette.len() - 1
                }
            };
            let cell = ((pos.y as u64 * size.depth as u64 + pos.z as u64)
                * size.width as u64
                + pos.x as u64) as usize;
            cells[cell] = index as u32;
        }

        Self::new(size, offset, palette, cells)
    }

    pub fn size(&self) -> RegionSize {
        self.size
    }

    /// Placement offset of this region within its schematic
    pub fn offset(&self) -> BlockPos {
        self.offset
    }

    fn cell_index(&self, x: u32, y: u32, z: u32) -> usize {
        ((y as u64 * self.size.depth as u64 + z as u64) * self.size.width as u64 + x as u64)
            as usize
    }

    /// Block at a region-local coordinate. Out of bounds and air both
    /// read as `None`.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<&BlockKey> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as u32, y as u32, z as u32);
        if x >= self.size.width || y >= self.size.height || z >= self.size.depth {
            return None;
        }
        let key = &self.palette[self.cells[self.cell_index(x, y, z)] as usize];
        if key.is_air() { None } else { Some(key) }
    }

    /// Iterate solid (non-air) cells as (local position, key)
    pub fn iter_solid(&self) -> impl Iterator<Item = (BlockPos, &BlockKey)> + '_ {
        let width = self.size.width as i64;
        let depth = self.size.depth as i64;
        self.cells.iter().enumerate().filter_map(move |(i, &cell)| {
            let key = &self.palette[cell as usize];
            if key.is_air() {
                return None;
            }
            let i = i as i64;
            let x = i % width;
            let z = (i / width) % depth;
            let y = i / (width * depth);
            Some((BlockPos::new(x as i32, y as i32, z as i32), key))
        })
    }
}
