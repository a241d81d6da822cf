//! Translation-normalized similarity between schematic surfaces

use std::collections::HashMap;
use std::path::Path;

use crate::core::types::Result;
use crate::schematic::block::{BlockCatalog, BlockKey};
use crate::schematic::index::SchematicIndex;
use crate::schematic::library::SchematicLibrary;
use crate::schematic::position::BlockPos;

/// Outcome of comparing two schematics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Matching fraction of the combined surface, in [0, 1]
    pub score: f64,
    /// Positions where both surfaces agree
    pub matching: u64,
    /// Size of the larger surface, for reporting match counts
    pub total_considered: u64,
}

impl Similarity {
    fn zero(total_considered: u64) -> Self {
        Self { score: 0.0, matching: 0, total_considered }
    }
}

/// Compare two schematics by their top-of-column surfaces.
///
/// Both surfaces are translated so their componentwise-minimum corner
/// sits at the origin, which makes the score invariant under placement
/// offsets. A position counts as matching when both surfaces contain it
/// and the keys satisfy [`BlockKey::matches`]; the score is matches over
/// the union of both normalized surfaces. An optional filter restricts
/// both surfaces to blocks equivalent to the given key first.
pub fn similarity(
    a: &SchematicIndex,
    b: &SchematicIndex,
    filter: Option<&BlockKey>,
) -> Similarity {
    let surface_a = filtered_surface(a, filter);
    let surface_b = filtered_surface(b, filter);
    compare_surfaces(&surface_a, &surface_b)
}

fn filtered_surface(
    index: &SchematicIndex,
    filter: Option<&BlockKey>,
) -> HashMap<BlockPos, BlockKey> {
    index
        .top_blocks()
        .into_values()
        .filter(|(_, key)| filter.is_none_or(|f| key.matches(f)))
        .collect()
}

fn compare_surfaces(
    a: &HashMap<BlockPos, BlockKey>,
    b: &HashMap<BlockPos, BlockKey>,
) -> Similarity {
    let total_considered = a.len().max(b.len()) as u64;
    if a.is_empty() || b.is_empty() {
        return Similarity::zero(total_considered);
    }

    let a = normalize(a);
    let b = normalize(b);

    let mut matching = 0u64;
    let mut union = 0u64;
    for (pos, key) in &a {
        union += 1;
        if b.get(pos).is_some_and(|other| key.matches(other)) {
            matching += 1;
        }
    }
    union += b.keys().filter(|pos| !a.contains_key(*pos)).count() as u64;

    Similarity {
        score: matching as f64 / union as f64,
        matching,
        total_considered,
    }
}

/// Translate a surface so its minimum corner sits at the origin
fn normalize(surface: &HashMap<BlockPos, BlockKey>) -> HashMap<BlockPos, BlockKey> {
    let min = surface
        .keys()
        .copied()
        .reduce(BlockPos::min)
        .unwrap_or(BlockPos::ZERO);
    surface
        .iter()
        .map(|(pos, key)| (*pos - min, key.clone()))
        .collect()
}

/// Directory-wide comparison of one reference schematic against all others
#[derive(Debug, Clone)]
pub struct SimilarityRanking {
    pub reference: String,
    /// (relative label, similarity), sorted by score descending
    pub rows: Vec<(String, Similarity)>,
    pub processed: usize,
    pub failed: usize,
    /// Candidates dropped because the filter removed their whole surface
    pub excluded: usize,
}

impl SimilarityRanking {
    pub fn average_score(&self) -> f64 {
        if self.rows.is_empty() {
            0.0
        } else {
            self.rows.iter().map(|(_, s)| s.score).sum::<f64>() / self.rows.len() as f64
        }
    }
}

/// Compare a reference schematic against every other schematic under a
/// directory. The reference file itself is skipped, decode failures are
/// logged and counted, and with a filter in effect candidates whose
/// surface the filter empties are excluded from the ranking.
pub fn rank_directory(
    library: &SchematicLibrary,
    reference: &Path,
    dir: &str,
    catalog: &BlockCatalog,
    filter: Option<&BlockKey>,
) -> Result<SimilarityRanking> {
    let reference_index = library.load(reference, catalog)?;
    let reference_surface = filtered_surface(&reference_index, filter);
    let files = library.find_all(dir)?;

    let mut ranking = SimilarityRanking {
        reference: library.relative_label(reference),
        rows: Vec::new(),
        processed: 0,
        failed: 0,
        excluded: 0,
    };

    for path in &files {
        if path == reference {
            continue;
        }
        let label = library.relative_label(path);
        match library.load(path, catalog) {
            Ok(index) => {
                ranking.processed += 1;
                let surface = filtered_surface(&index, filter);
                if filter.is_some() && surface.is_empty() {
                    ranking.excluded += 1;
                    continue;
                }
                let result = compare_surfaces(&reference_surface, &surface);
                ranking.rows.push((label, result));
            }
            Err(e) => {
                log::warn!("Skipping {label}: {e}");
                ranking.failed += 1;
            }
        }
    }

    ranking.rows.sort_by(|a, b| {
        b.1.score
            .total_cmp(&a.1.score)
            .then_with(|| a.0.cmp(&b.0))
    });
    log::info!(
        "Compared {} against {} schematics ({} failed, {} excluded)",
        ranking.reference,
        ranking.processed,
        ranking.failed,
        ranking.excluded
    );
    Ok(ranking)
}
