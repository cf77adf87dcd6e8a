use crate::world::position::Point2D;
use serde::{Deserialize, Serialize};

/// A rectangular area of the facet, corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Zone {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Zone { x1, y1, x2, y2 }
    }

    pub fn contains(&self, point: Point2D) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Town,
    Dungeon,
    House,
    Jail,
    Wilderness,
    Other,
}

impl RegionKind {
    pub fn label(self) -> &'static str {
        match self {
            RegionKind::Town => "town",
            RegionKind::Dungeon => "dungeon",
            RegionKind::House => "house",
            RegionKind::Jail => "jail",
            RegionKind::Wilderness => "wilderness",
            RegionKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub kind: RegionKind,
    #[serde(default)]
    pub guarded: bool,
    /// Higher priority wins where regions overlap (a house inside a town).
    #[serde(default)]
    pub priority: i32,
    pub areas: Vec<Zone>,
}

impl Region {
    pub fn contains(&self, point: Point2D) -> bool {
        self.areas.iter().any(|area| area.contains(point))
    }

    pub fn is_guarded_town(&self) -> bool {
        self.kind == RegionKind::Town && self.guarded
    }
}

/// All regions of one facet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionIndex {
    regions: Vec<Region>,
}

impl RegionIndex {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The highest-priority region containing `point`; on equal priority the
    /// region declared later wins.
    pub fn region_at(&self, point: Point2D) -> Option<&Region> {
        let mut best: Option<&Region> = None;
        for region in &self.regions {
            if !region.contains(point) {
                continue;
            }
            match best {
                Some(current) if current.priority > region.priority => {}
                _ => best = Some(region),
            }
        }
        best
    }
}
