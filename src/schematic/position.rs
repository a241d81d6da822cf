//! Position types for schematic and world coordinates

use glam::{IVec2, IVec3};

/// Integer block position. Region-local before the placement offset is
/// applied, absolute world coordinate after.
pub type BlockPos = IVec3;

/// Key identifying a vertical (x, z) column
pub type ColumnKey = IVec2;

/// Column containing a block position
pub fn column_of(pos: BlockPos) -> ColumnKey {
    ColumnKey::new(pos.x, pos.z)
}

/// Squared distance between two block positions (avoids the square root)
pub fn distance_sq(a: BlockPos, b: BlockPos) -> i64 {
    (a - b).as_i64vec3().length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_of() {
        let pos = BlockPos::new(3, 70, -4);
        assert_eq!(column_of(pos), ColumnKey::new(3, -4));

        // Same column at a different height
        assert_eq!(column_of(BlockPos::new(3, -12, -4)), column_of(pos));
    }

    #[test]
    fn test_distance_sq() {
        let a = BlockPos::new(0, 0, 0);
        let b = BlockPos::new(3, 4, 0);
        assert_eq!(distance_sq(a, b), 25);
        assert_eq!(distance_sq(b, a), 25);
        assert_eq!(distance_sq(a, a), 0);
    }

    #[test]
    fn test_positions_as_map_keys() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(BlockPos::new(1, 2, 3), "a");
        map.insert(BlockPos::new(1, 2, 3), "b");
        assert_eq!(map.len(), 1);
        assert_eq!(map[&BlockPos::new(1, 2, 3)], "b");
    }
}
