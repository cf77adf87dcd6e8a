use crate::world::pathfind;
use crate::world::position::{Point2D, Point3D};
use crate::world::query::{LandTile, PathBudget, PathOutcome, WorldQuery};
use crate::world::regions::{Region, RegionIndex, Zone};
use crate::world::tiles::{BadTileRegistry, TileRange};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Largest height difference a walker can climb in one step.
const MAX_STEP_HEIGHT: i32 = 16;
/// Path searches stay inside the box spanning both ends plus this margin.
const SEARCH_MARGIN: i32 = 16;
const DEFAULT_LAND_TILE: u16 = 0x0003;

#[derive(Debug, Clone, Deserialize)]
pub struct TerrainPatch {
    pub area: Zone,
    pub tile: u16,
    #[serde(default)]
    pub z: Option<i32>,
}

/// On-disk description of a facet, `world.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldFixture {
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_land_tile")]
    pub default_tile: u16,
    #[serde(default)]
    pub default_z: i32,
    #[serde(default)]
    pub terrain: Vec<TerrainPatch>,
    #[serde(default)]
    pub walls: Vec<Zone>,
    #[serde(default)]
    pub impassable_tiles: Vec<TileRange>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

fn default_land_tile() -> u16 {
    DEFAULT_LAND_TILE
}

#[derive(Debug)]
pub enum FixtureError {
    Read(PathBuf, String),
    Parse(PathBuf, String),
    InvalidSize(i32, i32),
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureError::Read(path, msg) => {
                write!(f, "failed to read world fixture {}: {}", path.display(), msg)
            }
            FixtureError::Parse(path, msg) => {
                write!(f, "failed to parse world fixture {}: {}", path.display(), msg)
            }
            FixtureError::InvalidSize(width, height) => {
                write!(f, "world fixture has invalid size {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for FixtureError {}

/// In-memory facet: one land tile per cell, wall cells, and regions.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i32,
    height: i32,
    tiles: Vec<u16>,
    heights: Vec<i8>,
    blocked: Vec<bool>,
    impassable: BadTileRegistry,
    regions: RegionIndex,
}

impl GridWorld {
    pub fn new(width: i32, height: i32, default_tile: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = (width as usize) * (height as usize);
        Self {
            width,
            height,
            tiles: vec![default_tile; cells],
            heights: vec![0; cells],
            blocked: vec![false; cells],
            impassable: BadTileRegistry::default(),
            regions: RegionIndex::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| FixtureError::Read(path.to_path_buf(), err.to_string()))?;
        let fixture: WorldFixture = serde_yaml::from_str(&content)
            .map_err(|err| FixtureError::Parse(path.to_path_buf(), err.to_string()))?;
        Self::from_fixture(fixture)
    }

    pub fn from_fixture(fixture: WorldFixture) -> Result<Self, FixtureError> {
        if fixture.width <= 0 || fixture.height <= 0 {
            return Err(FixtureError::InvalidSize(fixture.width, fixture.height));
        }
        let mut world = Self::new(fixture.width, fixture.height, fixture.default_tile);
        if fixture.default_z != 0 {
            world.heights.fill(clamp_z(fixture.default_z));
        }
        for patch in &fixture.terrain {
            world.paint(patch.area, patch.tile, patch.z);
        }
        for wall in &fixture.walls {
            world.wall(*wall);
        }
        world.impassable = BadTileRegistry::from_ranges(&fixture.impassable_tiles);
        world.regions = RegionIndex::new(fixture.regions);
        Ok(world)
    }

    pub fn paint(&mut self, area: Zone, tile: u16, z: Option<i32>) {
        self.for_each_cell(area, |world, index| {
            world.tiles[index] = tile;
            if let Some(z) = z {
                world.heights[index] = clamp_z(z);
            }
        });
    }

    pub fn wall(&mut self, area: Zone) {
        self.for_each_cell(area, |world, index| world.blocked[index] = true);
    }

    pub fn set_regions(&mut self, regions: Vec<Region>) {
        self.regions = RegionIndex::new(regions);
    }

    pub fn set_impassable(&mut self, ranges: &[TileRange]) {
        self.impassable = BadTileRegistry::from_ranges(ranges);
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    fn for_each_cell<F>(&mut self, area: Zone, mut apply: F)
    where
        F: FnMut(&mut Self, usize),
    {
        let x1 = area.x1.max(0);
        let y1 = area.y1.max(0);
        let x2 = area.x2.min(self.width - 1);
        let y2 = area.y2.min(self.height - 1);
        for y in y1..=y2 {
            for x in x1..=x2 {
                if let Some(index) = self.index(x, y) {
                    apply(self, index);
                }
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + x as usize)
    }

    fn standable(&self, x: i32, y: i32) -> Option<i32> {
        let index = self.index(x, y)?;
        if self.blocked[index] || self.impassable.is_bad(self.tiles[index]) {
            return None;
        }
        Some(i32::from(self.heights[index]))
    }
}

fn clamp_z(z: i32) -> i8 {
    z.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
}

impl WorldQuery for GridWorld {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn land_tile(&self, x: i32, y: i32) -> Option<LandTile> {
        let index = self.index(x, y)?;
        Some(LandTile {
            id: self.tiles[index],
            z: i32::from(self.heights[index]),
        })
    }

    fn region_at(&self, point: Point2D) -> Option<Region> {
        self.regions.region_at(point).cloned()
    }

    fn can_spawn_mobile(&self, point: Point3D) -> bool {
        self.standable(point.x, point.y).is_some()
    }

    fn path_reachable(&self, from: Point3D, to: Point3D, budget: &mut PathBudget) -> PathOutcome {
        let window = Zone::new(
            from.x.min(to.x) - SEARCH_MARGIN,
            from.y.min(to.y) - SEARCH_MARGIN,
            from.x.max(to.x) + SEARCH_MARGIN,
            from.y.max(to.y) + SEARCH_MARGIN,
        );
        pathfind::search(from, to, budget, |current, next| {
            if !window.contains(next) {
                return None;
            }
            let z = self.standable(next.x, next.y)?;
            if (z - current.z).abs() > MAX_STEP_HEIGHT {
                return None;
            }
            Some(z)
        })
    }
}
