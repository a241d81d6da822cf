//! Schematic data model: blocks, regions, indexes, and file access

pub mod block;
pub mod position;
pub mod region;
pub mod index;
pub mod decode;
pub mod library;

pub use block::{BlockAttrs, BlockCatalog, BlockKey, Cluster, ClusterRole};
pub use decode::{SCHEMATIC_FILE_EXTENSION, decode, decode_file};
pub use index::SchematicIndex;
pub use library::SchematicLibrary;
pub use position::{BlockPos, ColumnKey, column_of, distance_sq};
pub use region::{Region, RegionSize};
