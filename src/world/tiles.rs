use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// High bits of a land tile id carry rendering flags.
pub const LAND_TILE_MASK: u16 = 0x3FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    pub first: u16,
    pub last: u16,
}

/// Land tiles that a mobile may stand on but a buried chest may not use:
/// water edges, dock planks, cave and dungeon floors.
pub const DEFAULT_BAD_TILES: &[TileRange] = &[
    // water
    TileRange { first: 0x00A8, last: 0x00AB },
    TileRange { first: 0x0136, last: 0x0137 },
    TileRange { first: 0x3FF0, last: 0x3FF3 },
    // cave floor
    TileRange { first: 0x0245, last: 0x0248 },
    TileRange { first: 0x024B, last: 0x024E },
    // dungeon floor
    TileRange { first: 0x0495, last: 0x0498 },
    TileRange { first: 0x04A9, last: 0x04AC },
    // wooden floor and docks
    TileRange { first: 0x0519, last: 0x051C },
    TileRange { first: 0x03EE, last: 0x03F1 },
    // marble and stone floor
    TileRange { first: 0x04E9, last: 0x04EC },
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadTileRegistry {
    ids: HashSet<u16>,
}

impl BadTileRegistry {
    pub fn from_ranges(ranges: &[TileRange]) -> Self {
        let mut ids = HashSet::new();
        for range in ranges {
            let (first, last) = if range.first <= range.last {
                (range.first, range.last)
            } else {
                (range.last, range.first)
            };
            for id in first..=last {
                ids.insert(id & LAND_TILE_MASK);
            }
        }
        Self { ids }
    }

    pub fn builtin() -> Self {
        Self::from_ranges(DEFAULT_BAD_TILES)
    }

    /// `tile_id` is masked before lookup.
    pub fn is_bad(&self, tile_id: u16) -> bool {
        self.ids.contains(&(tile_id & LAND_TILE_MASK))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
