//! Material requirement tallies and block-occurrence ranking

use std::collections::HashMap;

use crate::core::types::Result;
use crate::schematic::block::{BlockCatalog, BlockKey};
use crate::schematic::index::SchematicIndex;
use crate::schematic::library::SchematicLibrary;

/// Items per inventory stack
pub const STACK_SIZE: u64 = 64;

/// Stacks per storage container
pub const STACKS_PER_CONTAINER: u64 = 27;

/// Per-material block counts for one schematic or a merged batch.
///
/// Only placeable blocks are counted; air and fluids are skipped at
/// record time so totals reflect what a builder must actually gather.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: HashMap<BlockKey, u64>,
    total: u64,
}

/// One rendered tally line: a material with its count broken down into
/// stacks and containers.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyRow {
    pub key: BlockKey,
    pub count: u64,
    pub stacks: u64,
    pub remainder: u64,
    pub containers: f64,
}

impl TallyRow {
    fn new(key: BlockKey, count: u64) -> Self {
        Self {
            key,
            count,
            stacks: count / STACK_SIZE,
            remainder: count % STACK_SIZE,
            containers: count as f64 / (STACK_SIZE * STACKS_PER_CONTAINER) as f64,
        }
    }
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every solid block of a schematic
    pub fn scan(index: &SchematicIndex) -> Self {
        let mut tally = Self::new();
        for (_, key, _) in index.iter_solid() {
            tally.record(key);
        }
        tally
    }

    /// Count one block; air and fluids are ignored.
    pub fn record(&mut self, key: &BlockKey) {
        if !key.is_placeable() {
            return;
        }
        *self.counts.entry(key.clone()).or_insert(0) += 1;
        self.total += 1;
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: &Tally) {
        for (key, count) in &other.counts {
            *self.counts.entry(key.clone()).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, key: &BlockKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn unique_materials(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of containers across all materials
    pub fn total_containers(&self) -> f64 {
        self.total as f64 / (STACK_SIZE * STACKS_PER_CONTAINER) as f64
    }

    /// Rows sorted by count descending, then by name for stable output
    pub fn rows(&self) -> Vec<TallyRow> {
        let mut rows: Vec<TallyRow> = self
            .counts
            .iter()
            .map(|(key, &count)| TallyRow::new(key.clone(), count))
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.key.name().cmp(b.key.name()))
        });
        rows
    }
}

/// Merged result of tallying every schematic under a directory
#[derive(Debug, Clone)]
pub struct BatchTally {
    /// All schematics merged together
    pub total: Tally,
    /// Per-schematic tallies labelled with their relative paths
    pub per_schematic: Vec<(String, Tally)>,
    /// Files decoded successfully
    pub processed: usize,
    /// Files skipped because they failed to decode
    pub failed: usize,
}

/// Tally every schematic under a directory. Decode failures are logged
/// and counted but never abort the batch.
pub fn scan_directory(
    library: &SchematicLibrary,
    dir: &str,
    catalog: &BlockCatalog,
) -> Result<BatchTally> {
    let files = library.find_all(dir)?;

    let mut batch = BatchTally {
        total: Tally::new(),
        per_schematic: Vec::new(),
        processed: 0,
        failed: 0,
    };

    for path in &files {
        let label = library.relative_label(path);
        match library.load(path, catalog) {
            Ok(index) => {
                let tally = Tally::scan(&index);
                batch.total.merge(&tally);
                batch.per_schematic.push((label, tally));
                batch.processed += 1;
            }
            Err(e) => {
                log::warn!("Skipping {label}: {e}");
                batch.failed += 1;
            }
        }
    }

    log::info!(
        "Tallied {} schematics under {dir} ({} failed), {} blocks total",
        batch.processed,
        batch.failed,
        batch.total.total()
    );
    Ok(batch)
}

/// Occurrence ranking of a single block type across a directory.
///
/// Comparison is by block name only; state properties are ignored so
/// every variant of the block counts toward the same entry.
#[derive(Debug, Clone)]
pub struct BlockRanking {
    pub block: BlockKey,
    /// (relative label, occurrences), sorted descending
    pub rows: Vec<(String, u64)>,
    pub total: u64,
    pub processed: usize,
    pub failed: usize,
}

impl BlockRanking {
    /// Schematics that contain the block at least once
    pub fn containing(&self) -> usize {
        self.rows.iter().filter(|(_, count)| *count > 0).count()
    }

    /// Mean occurrences among schematics that contain the block
    pub fn average_per_containing(&self) -> f64 {
        let containing = self.containing();
        if containing == 0 {
            0.0
        } else {
            self.total as f64 / containing as f64
        }
    }
}

/// Rank every schematic under a directory by how many blocks of one
/// type it contains.
pub fn rank_by_block(
    library: &SchematicLibrary,
    dir: &str,
    catalog: &BlockCatalog,
    block: &BlockKey,
) -> Result<BlockRanking> {
    let files = library.find_all(dir)?;

    let mut ranking = BlockRanking {
        block: block.clone(),
        rows: Vec::new(),
        total: 0,
        processed: 0,
        failed: 0,
    };

    for path in &files {
        let label = library.relative_label(path);
        match library.load(path, catalog) {
            Ok(index) => {
                let count = index
                    .iter_solid()
                    .filter(|(_, key, _)| key.same_type(block))
                    .count() as u64;
                ranking.total += count;
                ranking.rows.push((label, count));
                ranking.processed += 1;
            }
            Err(e) => {
                log::warn!("Skipping {label}: {e}");
                ranking.failed += 1;
            }
        }
    }

    ranking
        .rows
        .sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    log::info!(
        "Ranked {} schematics by {} ({} occurrences total)",
        ranking.processed,
        block,
        ranking.total
    );
    Ok(ranking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::position::BlockPos;
    use crate::schematic::region::{Region, RegionSize};
    use std::path::Path;
    use tempfile::TempDir;

    fn catalog() -> BlockCatalog {
        let mut catalog = BlockCatalog::default();
        catalog.register_fluid("water");
        catalog
    }

    fn single_region(catalog: &BlockCatalog, blocks: &[(BlockPos, BlockKey)]) -> SchematicIndex {
        let size = RegionSize::new(16, 16, 16);
        let region =
            Region::from_blocks(size, BlockPos::ZERO, catalog.air(), blocks).expect("region");
        SchematicIndex::from_regions(vec![("main".to_string(), region)]).expect("index")
    }

    #[test]
    fn test_stack_breakdown() {
        let catalog = catalog();
        let stone = catalog.resolve("stone");
        let mut tally = Tally::new();
        for _ in 0..130 {
            tally.record(&stone);
        }

        let rows = tally.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 130);
        assert_eq!(rows[0].stacks, 2);
        assert_eq!(rows[0].remainder, 2);
        assert!((rows[0].containers - 130.0 / 1728.0).abs() < 1e-12);
    }

    #[test]
    fn test_scan_skips_air_and_fluids() {
        let catalog = catalog();
        let stone = catalog.resolve("stone");
        let water = catalog.resolve("water");
        let index = single_region(
            &catalog,
            &[
                (BlockPos::new(0, 0, 0), stone.clone()),
                (BlockPos::new(1, 0, 0), water),
                (BlockPos::new(2, 0, 0), stone.clone()),
            ],
        );

        let tally = Tally::scan(&index);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.count(&stone), 2);
        assert_eq!(tally.unique_materials(), 1);
        let sum: u64 = tally.rows().iter().map(|row| row.count).sum();
        assert_eq!(sum, tally.total());
    }

    #[test]
    fn test_rows_sorted_descending() {
        let catalog = catalog();
        let stone = catalog.resolve("stone");
        let glass = catalog.resolve("glass");
        let mut tally = Tally::new();
        tally.record(&glass);
        for _ in 0..3 {
            tally.record(&stone);
        }

        let rows = tally.rows();
        assert_eq!(rows[0].key, stone);
        assert_eq!(rows[1].key, glass);
    }

    #[test]
    fn test_merge() {
        let catalog = catalog();
        let stone = catalog.resolve("stone");
        let glass = catalog.resolve("glass");

        let mut a = Tally::new();
        a.record(&stone);
        let mut b = Tally::new();
        b.record(&stone);
        b.record(&glass);

        a.merge(&b);
        assert_eq!(a.total(), 3);
        assert_eq!(a.count(&stone), 2);
        assert_eq!(a.count(&glass), 1);
    }

    fn write_schem(dir: &Path, rel: &str, json: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, json).expect("write");
    }

    #[test]
    fn test_scan_directory_continues_past_failures() {
        let temp = TempDir::new().expect("tempdir");
        write_schem(
            temp.path(),
            "maps/good.schem",
            r#"{
                "format": "dense",
                "size": [2, 1, 1],
                "palette": ["stone"],
                "cells": [0, 0]
            }"#,
        );
        write_schem(temp.path(), "maps/broken.schem", "not json");

        let library = SchematicLibrary::new(temp.path());
        let batch = scan_directory(&library, "maps", &catalog()).expect("batch");

        assert_eq!(batch.processed, 1);
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.total.total(), 2);
        assert_eq!(batch.per_schematic.len(), 1);
        assert_eq!(batch.per_schematic[0].0, "maps/good.schem");
    }

    #[test]
    fn test_rank_by_block_ignores_props() {
        let temp = TempDir::new().expect("tempdir");
        write_schem(
            temp.path(),
            "maps/a.schem",
            r#"{
                "format": "dense",
                "size": [2, 1, 1],
                "palette": ["rail[shape=north_south]", "rail[shape=east_west]"],
                "cells": [0, 1]
            }"#,
        );
        write_schem(
            temp.path(),
            "maps/b.schem",
            r#"{
                "format": "dense",
                "size": [2, 1, 1],
                "palette": ["rail[shape=north_south]", "stone"],
                "cells": [0, 1]
            }"#,
        );

        let catalog = catalog();
        let library = SchematicLibrary::new(temp.path());
        let rail = catalog.resolve("rail");
        let ranking = rank_by_block(&library, "maps", &catalog, &rail).expect("ranking");

        assert_eq!(ranking.total, 3);
        assert_eq!(ranking.rows[0], ("maps/a.schem".to_string(), 2));
        assert_eq!(ranking.rows[1], ("maps/b.schem".to_string(), 1));
        assert_eq!(ranking.containing(), 2);
        assert!((ranking.average_per_containing() - 1.5).abs() < 1e-12);
    }
}
