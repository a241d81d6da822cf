//! Timestamped textual report files

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::analysis::similarity::SimilarityRanking;
use crate::analysis::tally::{BatchTally, TallyRow};
use crate::core::types::Result;

const TIMESTAMP_HEADER: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_FILE: &str = "%Y-%m-%d_%H-%M-%S";

fn tally_line(row: &TallyRow) -> String {
    format!(
        "{}: {} blocks ({} stacks + {}, {:.2} containers)",
        row.key, row.count, row.stacks, row.remainder, row.containers
    )
}

/// Render a materials report: merged totals first, then a per-schematic
/// breakdown sorted by total block count.
pub fn materials_report(dir_label: &str, batch: &BatchTally) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Material Report");
    let _ = writeln!(out, "Generated: {}", Local::now().format(TIMESTAMP_HEADER));
    let _ = writeln!(out, "Directory: {dir_label}");
    let _ = writeln!(
        out,
        "Schematics: {} ({} failed to decode)",
        batch.processed, batch.failed
    );
    let _ = writeln!(out, "Total blocks: {}", batch.total.total());
    let _ = writeln!(out);

    let _ = writeln!(out, "== Total materials ==");
    for row in batch.total.rows() {
        let _ = writeln!(out, "{}", tally_line(&row));
    }
    let _ = writeln!(out, "Unique materials: {}", batch.total.unique_materials());
    let _ = writeln!(out, "Total containers: {:.2}", batch.total.total_containers());
    let _ = writeln!(out);

    let _ = writeln!(out, "== Per schematic ==");
    let mut per: Vec<_> = batch.per_schematic.iter().collect();
    per.sort_by(|a, b| b.1.total().cmp(&a.1.total()).then_with(|| a.0.cmp(&b.0)));
    for (label, tally) in per {
        let _ = writeln!(out, "-- {label} ({} blocks) --", tally.total());
        for row in tally.rows() {
            let _ = writeln!(out, "{}", tally_line(&row));
        }
    }
    out
}

/// Render a similarity ranking report with a score summary
pub fn similarity_report(
    dir_label: &str,
    filter_label: Option<&str>,
    ranking: &SimilarityRanking,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Similarity Report");
    let _ = writeln!(out, "Generated: {}", Local::now().format(TIMESTAMP_HEADER));
    let _ = writeln!(out, "Reference: {}", ranking.reference);
    let _ = writeln!(out, "Directory: {dir_label}");
    let _ = writeln!(out, "Filter: {}", filter_label.unwrap_or("none"));
    let _ = writeln!(
        out,
        "Compared: {} ({} failed, {} excluded)",
        ranking.processed, ranking.failed, ranking.excluded
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "== Ranking ==");
    for (i, (label, s)) in ranking.rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {label}: {:.2}% ({}/{} matching)",
            i + 1,
            s.score * 100.0,
            s.matching,
            s.total_considered
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "== Summary ==");
    let _ = writeln!(out, "Average: {:.2}%", ranking.average_score() * 100.0);
    if let (Some(first), Some(last)) = (ranking.rows.first(), ranking.rows.last()) {
        let _ = writeln!(out, "Highest: {} ({:.2}%)", first.0, first.1.score * 100.0);
        let _ = writeln!(out, "Lowest: {} ({:.2}%)", last.0, last.1.score * 100.0);
    }
    out
}

fn write_report(out_dir: &Path, prefix: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let stamp = Local::now().format(TIMESTAMP_FILE);
    let path = out_dir.join(format!("{prefix}_{stamp}.txt"));
    std::fs::write(&path, content)?;
    log::info!("Wrote report to {}", path.display());
    Ok(path)
}

/// Write a materials report to a timestamped file under `out_dir`
pub fn write_materials_report(
    out_dir: &Path,
    dir_label: &str,
    batch: &BatchTally,
) -> Result<PathBuf> {
    write_report(out_dir, "materials", &materials_report(dir_label, batch))
}

/// Write a similarity report to a timestamped file under `out_dir`
pub fn write_similarity_report(
    out_dir: &Path,
    dir_label: &str,
    filter_label: Option<&str>,
    ranking: &SimilarityRanking,
) -> Result<PathBuf> {
    write_report(
        out_dir,
        "similarity",
        &similarity_report(dir_label, filter_label, ranking),
    )
}
