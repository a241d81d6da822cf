//! Live divergence tracking against a selected schematic placement

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::schematic::block::BlockKey;
use crate::schematic::index::SchematicIndex;
use crate::schematic::position::{BlockPos, ColumnKey, column_of, distance_sq};
use crate::tracker::markers::MarkerSet;
use crate::tracker::world::WorldQuery;

/// Ticks between incremental refreshes
pub const REFRESH_INTERVAL_TICKS: u64 = 5;

/// Block radius around the reference point refreshed each interval
pub const REFRESH_RADIUS: i64 = 10;

/// A schematic pinned at a world origin.
///
/// Placement identity is the schematic's `Arc` identity plus the origin;
/// re-selecting the same placement never triggers a rebuild, while a
/// re-decoded schematic (new `Arc`) always does.
#[derive(Debug, Clone)]
pub struct Placement {
    schematic: Arc<SchematicIndex>,
    origin: BlockPos,
}

impl Placement {
    pub fn new(schematic: Arc<SchematicIndex>, origin: BlockPos) -> Self {
        Self { schematic, origin }
    }

    pub fn schematic(&self) -> &Arc<SchematicIndex> {
        &self.schematic
    }

    pub fn origin(&self) -> BlockPos {
        self.origin
    }

    fn same_identity(&self, other: &Placement) -> bool {
        Arc::ptr_eq(&self.schematic, &other.schematic) && self.origin == other.origin
    }
}

/// Expected content of one tracked world position
#[derive(Debug, Clone)]
struct Expected {
    key: BlockKey,
    region: String,
}

/// Tracks how the live world diverges from a selected placement.
///
/// Idle until a placement is selected. While tracking, only top-of-column
/// positions are evaluated: buried blocks cannot be seen by a surveyor
/// and are deliberately left out of the marker set. Between full passes,
/// `tick` re-checks positions near a reference point every few ticks;
/// everything further away keeps its last verdict until the next
/// `refresh` or rebuild.
#[derive(Debug)]
pub struct DivergenceTracker {
    markers: Arc<MarkerSet>,
    placement: Option<Placement>,
    active: bool,
    /// Expected key and owning region per absolute world position
    tracked: HashMap<BlockPos, Expected>,
    /// Highest tracked y per column
    column_top: HashMap<ColumnKey, i32>,
    /// Top positions last observed as matching
    matching: HashSet<BlockPos>,
    ticks: u64,
}

impl DivergenceTracker {
    pub fn new(markers: Arc<MarkerSet>) -> Self {
        Self {
            markers,
            placement: None,
            active: false,
            tracked: HashMap::new(),
            column_top: HashMap::new(),
            matching: HashSet::new(),
            ticks: 0,
        }
    }

    pub fn markers(&self) -> &Arc<MarkerSet> {
        &self.markers
    }

    pub fn is_tracking(&self) -> bool {
        self.active && self.placement.is_some()
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// Solid blocks of the selected placement
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Top positions last seen matching their expected block
    pub fn matching_count(&self) -> usize {
        self.matching.len()
    }

    pub fn is_matching(&self, pos: &BlockPos) -> bool {
        self.matching.contains(pos)
    }

    /// Expected block and owning region at a world position, if tracked
    pub fn expected_at(&self, pos: &BlockPos) -> Option<(&BlockKey, &str)> {
        self.tracked.get(pos).map(|e| (&e.key, e.region.as_str()))
    }

    /// Start tracking a placement.
    ///
    /// A new placement identity rebuilds all state from scratch and
    /// evaluates every column top against the world. Re-selecting the
    /// current placement after a `disable` re-evaluates without
    /// rebuilding; re-selecting while already tracking is a no-op.
    pub fn select(&mut self, placement: Placement, world: &impl WorldQuery) {
        let same = self
            .placement
            .as_ref()
            .is_some_and(|current| current.same_identity(&placement));

        if !same {
            self.rebuild(placement);
            self.evaluate_all(world);
        } else if !self.active {
            self.placement = Some(placement);
            self.evaluate_all(world);
        }
        self.active = true;
    }

    /// Stop tracking. Markers and match state are cleared; the derived
    /// block index is retained so re-selecting the same placement only
    /// needs a world re-evaluation.
    pub fn disable(&mut self) {
        self.markers.clear();
        self.matching.clear();
        self.active = false;
        log::info!("Divergence tracking disabled");
    }

    /// Per-tick update. Every [`REFRESH_INTERVAL_TICKS`] ticks, column
    /// tops within [`REFRESH_RADIUS`] of the reference point are
    /// re-evaluated; everything else is left untouched.
    pub fn tick(&mut self, world: &impl WorldQuery, reference: BlockPos) {
        if !self.is_tracking() {
            return;
        }
        self.ticks += 1;
        if !self.ticks.is_multiple_of(REFRESH_INTERVAL_TICKS) {
            return;
        }

        let radius_sq = REFRESH_RADIUS * REFRESH_RADIUS;
        let mut refreshed = 0usize;
        for (&pos, expected) in &self.tracked {
            if self.column_top.get(&column_of(pos)) != Some(&pos.y) {
                continue;
            }
            if distance_sq(pos, reference) > radius_sq {
                continue;
            }
            evaluate(&self.markers, &mut self.matching, world, pos, expected);
            refreshed += 1;
        }
        log::debug!(
            "Refreshed {refreshed} positions near {reference}, {} diverging",
            self.markers.len()
        );
    }

    /// Re-evaluate every column top against the world
    pub fn refresh(&mut self, world: &impl WorldQuery) {
        if !self.is_tracking() {
            return;
        }
        self.evaluate_all(world);
    }

    fn rebuild(&mut self, placement: Placement) {
        self.markers.clear();
        self.matching.clear();
        self.tracked.clear();
        self.column_top.clear();
        self.ticks = 0;

        for (pos, key, region) in placement.schematic.iter_solid() {
            let world_pos = placement.origin + pos;
            self.tracked.insert(
                world_pos,
                Expected { key: key.clone(), region: region.to_string() },
            );
            self.column_top
                .entry(column_of(world_pos))
                .and_modify(|top| *top = (*top).max(world_pos.y))
                .or_insert(world_pos.y);
        }

        log::info!(
            "Tracking placement at {}: {} blocks, {} columns",
            placement.origin,
            self.tracked.len(),
            self.column_top.len()
        );
        self.placement = Some(placement);
    }

    fn evaluate_all(&mut self, world: &impl WorldQuery) {
        for (column, &y) in &self.column_top {
            let pos = BlockPos::new(column.x, y, column.y);
            if let Some(expected) = self.tracked.get(&pos) {
                evaluate(&self.markers, &mut self.matching, world, pos, expected);
            }
        }
        log::debug!(
            "Evaluated {} column tops, {} diverging",
            self.column_top.len(),
            self.markers.len()
        );
    }
}

fn evaluate(
    markers: &MarkerSet,
    matching: &mut HashSet<BlockPos>,
    world: &impl WorldQuery,
    pos: BlockPos,
    expected: &Expected,
) {
    let observed = world.block_at(pos);
    if expected.key.matches(&observed) {
        matching.insert(pos);
        markers.remove(&pos);
    } else {
        matching.remove(&pos);
        markers.add(pos);
    }
}
