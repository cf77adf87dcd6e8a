pub mod editing;
pub mod map_item;
pub mod treasure_map;
