//! On-disk schematic formats
//!
//! Two JSON layouts are supported, distinguished by a `format` tag:
//! `dense` (a single fixed-size block array) and `regions` (named
//! sub-regions with per-region offsets). Decoding is atomic: either the
//! whole schematic validates and every region is built, or an error is
//! returned and nothing is exposed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::schematic::block::BlockCatalog;
use crate::schematic::index::SchematicIndex;
use crate::schematic::position::BlockPos;
use crate::schematic::region::{Region, RegionSize};

/// File extension for schematic files
pub const SCHEMATIC_FILE_EXTENSION: &str = "schem";

/// Region name used for the dense single-region format
pub const DENSE_REGION_NAME: &str = "main";

#[derive(Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
enum SchematicFile {
    Dense(DenseFile),
    Regions(RegionsFile),
}

/// Fixed-size single-region layout. Cells index the palette; cell order
/// is x-fastest, then z, then y.
#[derive(Deserialize)]
struct DenseFile {
    size: [u32; 3],
    palette: Vec<String>,
    cells: Vec<u32>,
}

#[derive(Deserialize)]
struct RegionsFile {
    regions: BTreeMap<String, RegionFile>,
}

#[derive(Deserialize)]
struct RegionFile {
    offset: [i32; 3],
    size: [u32; 3],
    palette: Vec<String>,
    cells: Vec<u32>,
}

/// Decode a schematic from raw bytes
pub fn decode(bytes: &[u8], catalog: &BlockCatalog) -> Result<SchematicIndex> {
    let file: SchematicFile =
        serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))?;

    match file {
        SchematicFile::Dense(dense) => {
            let region = build_region(
                dense.size,
                [0, 0, 0],
                &dense.palette,
                dense.cells,
                catalog,
            )?;
            SchematicIndex::from_regions(vec![(DENSE_REGION_NAME.to_string(), region)])
        }
        SchematicFile::Regions(multi) => {
            let mut regions = Vec::with_capacity(multi.regions.len());
            for (name, r) in multi.regions {
                let region = build_region(r.size, r.offset, &r.palette, r.cells, catalog)
                    .map_err(|e| Error::Decode(format!("region `{name}`: {e}")))?;
                regions.push((name, region));
            }
            SchematicIndex::from_regions(regions)
        }
    }
}

/// Decode a schematic file from disk
pub fn decode_file(path: &Path, catalog: &BlockCatalog) -> Result<SchematicIndex> {
    let bytes = std::fs::read(path)?;
    decode(&bytes, catalog)
        .map_err(|e| Error::Decode(format!("{}: {e}", path.display())))
}

fn build_region(
    size: [u32; 3],
    offset: [i32; 3],
    palette: &[String],
    cells: Vec<u32>,
    catalog: &BlockCatalog,
) -> Result<Region> {
    let keys = palette
        .iter()
        .map(|state| catalog.key_from_state(state))
        .collect::<Result<Vec<_>>>()?;

    Region::new(
        RegionSize::new(size[0], size[1], size[2]),
        BlockPos::new(offset[0], offset[1], offset[2]),
        keys,
        cells,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BlockCatalog {
        BlockCatalog::default()
    }

    #[test]
    fn test_decode_dense() {
        let json = br#"{
            "format": "dense",
            "size": [2, 1, 2],
            "palette": ["air", "stone"],
            "cells": [1, 0, 0, 1]
        }"#;
        let index = decode(json, &catalog()).expect("decode");

        assert_eq!(index.region_count(), 1);
        assert_eq!(index.solid_count(), 2);
        assert!(index.get(DENSE_REGION_NAME, 0, 0, 0).is_some());
        assert!(index.get(DENSE_REGION_NAME, 1, 0, 0).is_none());
        assert!(index.get(DENSE_REGION_NAME, 1, 0, 1).is_some());
    }

    #[test]
    fn test_decode_regions() {
        let json = br#"{
            "format": "regions",
            "regions": {
                "base": {
                    "offset": [0, 0, 0],
                    "size": [1, 1, 1],
                    "palette": ["stone"],
                    "cells": [0]
                },
                "tower": {
                    "offset": [0, 1, 0],
                    "size": [1, 2, 1],
                    "palette": ["air", "glass[pane=false]"],
                    "cells": [1, 1]
                }
            }
        }"#;
        let index = decode(json, &catalog()).expect("decode");

        assert_eq!(index.region_count(), 2);
        assert_eq!(index.solid_count(), 3);
        let tops = index.top_blocks();
        assert_eq!(tops.len(), 1);
        // The tower region reaches y=2 in absolute coordinates.
        assert_eq!(tops.values().next().expect("top").0.y, 2);
    }

    #[test]
    fn test_decode_rejects_unknown_format() {
        let json = br#"{ "format": "nbt", "data": [] }"#;
        assert!(matches!(decode(json, &catalog()), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_volume_mismatch() {
        let json = br#"{
            "format": "dense",
            "size": [2, 2, 2],
            "palette": ["air"],
            "cells": [0, 0, 0]
        }"#;
        assert!(matches!(decode(json, &catalog()), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_bad_palette_reference() {
        let json = br#"{
            "format": "dense",
            "size": [1, 1, 1],
            "palette": ["air"],
            "cells": [3]
        }"#;
        assert!(matches!(decode(json, &catalog()), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_malformed_state_string() {
        let json = br#"{
            "format": "dense",
            "size": [1, 1, 1],
            "palette": ["stone[broken"],
            "cells": [0]
        }"#;
        assert!(matches!(decode(json, &catalog()), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_file_reports_path() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.schem");
        std::fs::write(&path, b"not json").expect("write");

        let err = decode_file(&path, &catalog()).expect_err("should fail");
        assert!(err.to_string().contains("broken.schem"));
    }
}
