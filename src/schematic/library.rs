//! Schematic file lookup and directory enumeration

use std::path::{Path, PathBuf};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::schematic::block::BlockCatalog;
use crate::schematic::decode::{self, SCHEMATIC_FILE_EXTENSION};
use crate::schematic::index::SchematicIndex;

/// File access rooted at a schematics base directory.
///
/// All user-facing names and labels are relative to the base directory;
/// batch operations enumerate recursively by file extension.
#[derive(Debug, Clone)]
pub struct SchematicLibrary {
    base_dir: PathBuf,
}

impl SchematicLibrary {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a schematic name to a file: direct relative path first,
    /// then with the default extension appended, then a recursive search
    /// by file name.
    pub fn find_schematic(&self, name: &str) -> Result<PathBuf> {
        let direct = self.base_dir.join(name);
        if direct.is_file() {
            return Ok(direct);
        }

        let with_ext = format!("{name}.{SCHEMATIC_FILE_EXTENSION}");
        let direct_ext = self.base_dir.join(&with_ext);
        if direct_ext.is_file() {
            return Ok(direct_ext);
        }

        find_by_name(&self.base_dir, name, &with_ext)?
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// All schematic files under a subdirectory of the base, recursively,
    /// in sorted order for stable reports.
    pub fn find_all(&self, dir: &str) -> Result<Vec<PathBuf>> {
        let root = self.base_dir.join(dir);
        if !root.is_dir() {
            return Err(Error::InvalidDirectory(root));
        }

        let mut found = Vec::new();
        collect_schematics(&root, &mut found)?;
        found.sort();
        Ok(found)
    }

    /// Display label for a file: its path relative to the base directory
    pub fn relative_label(&self, path: &Path) -> String {
        path.strip_prefix(&self.base_dir)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// Decode one schematic file
    pub fn load(&self, path: &Path, catalog: &BlockCatalog) -> Result<SchematicIndex> {
        decode::decode_file(path, catalog)
    }
}

fn find_by_name(dir: &Path, name: &str, with_ext: &str) -> Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(found) = find_by_name(&path, name, with_ext)? {
                return Ok(Some(found));
            }
        } else if path
            .file_name()
            .is_some_and(|f| f == name || f == with_ext)
        {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn collect_schematics(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_schematics(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext == SCHEMATIC_FILE_EXTENSION)
        {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DENSE_STONE: &str = r#"{
        "format": "dense",
        "size": [1, 1, 1],
        "palette": ["stone"],
        "cells": [0]
    }"#;

    fn write(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, DENSE_STONE).expect("write");
    }

    #[test]
    fn test_find_schematic_direct_and_with_extension() {
        let temp = TempDir::new().expect("tempdir");
        write(temp.path(), "castle.schem");
        let library = SchematicLibrary::new(temp.path());

        let direct = library.find_schematic("castle.schem").expect("direct");
        let by_stem = library.find_schematic("castle").expect("with extension");
        assert_eq!(direct, by_stem);
    }

    #[test]
    fn test_find_schematic_recursive() {
        let temp = TempDir::new().expect("tempdir");
        write(temp.path(), "city/district/castle.schem");
        let library = SchematicLibrary::new(temp.path());

        let found = library.find_schematic("castle").expect("recursive");
        assert!(found.ends_with("city/district/castle.schem"));
        assert_eq!(library.relative_label(&found), "city/district/castle.schem");
    }

    #[test]
    fn test_find_schematic_not_found() {
        let temp = TempDir::new().expect("tempdir");
        let library = SchematicLibrary::new(temp.path());
        assert!(matches!(
            library.find_schematic("missing"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_find_all_recursive_and_sorted() {
        let temp = TempDir::new().expect("tempdir");
        write(temp.path(), "maps/b.schem");
        write(temp.path(), "maps/sub/a.schem");
        std::fs::write(temp.path().join("maps/notes.txt"), "ignore me").expect("write");
        let library = SchematicLibrary::new(temp.path());

        let all = library.find_all("maps").expect("find_all");
        assert_eq!(all.len(), 2);
        assert!(all[0].ends_with("maps/b.schem"));
        assert!(all[1].ends_with("maps/sub/a.schem"));
    }

    #[test]
    fn test_find_all_invalid_directory() {
        let temp = TempDir::new().expect("tempdir");
        let library = SchematicLibrary::new(temp.path());
        assert!(matches!(
            library.find_all("nope"),
            Err(Error::InvalidDirectory(_))
        ));
    }

    #[test]
    fn test_load() {
        let temp = TempDir::new().expect("tempdir");
        write(temp.path(), "one.schem");
        let library = SchematicLibrary::new(temp.path());
        let catalog = BlockCatalog::default();

        let path = library.find_schematic("one").expect("find");
        let index = library.load(&path, &catalog).expect("load");
        assert_eq!(index.solid_count(), 1);
    }
}
