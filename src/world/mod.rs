pub mod grid;
pub mod pathfind;
pub mod position;
pub mod query;
pub mod regions;
pub mod rng;
pub mod spawners;
pub mod tiles;
