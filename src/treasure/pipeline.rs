use crate::treasure::exclusions::{ExclusionReason, ExclusionTable};
use crate::world::position::{Point2D, Point3D};
use crate::world::query::{PathBudget, PathOutcome, WorldQuery};
use crate::world::regions::Region;
use crate::world::rng::WorldRng;
use crate::world::spawners::SpawnerSnapshot;
use crate::world::tiles::{BadTileRegistry, LAND_TILE_MASK};
use lru::LruCache;
use std::collections::{BTreeMap, HashSet};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Random spawn-point requests per seed.
    pub fan_out_attempts: u32,
    /// Fan-out range for spawners that declare no home range.
    pub fan_out_range: i32,
    /// Square radius searched for spawners to walk to.
    pub reachability_radius: i32,
    /// Path nodes one candidate may expand across all its searches.
    pub path_node_budget: u64,
    /// Wall-clock allowance per candidate.
    pub path_time_budget: Option<Duration>,
    pub region_cache_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fan_out_attempts: 10,
            fan_out_range: 10,
            reachability_radius: 32,
            path_node_budget: 20_000,
            path_time_budget: Some(Duration::from_millis(250)),
            region_cache_size: 65_536,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub location: Point3D,
    pub range: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Region,
    BadTile,
    Reachability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    Excluded(ExclusionReason),
    BadTile,
    NoNearbySpawner,
    Unreachable,
    TimedOut,
}

impl RejectReason {
    pub fn phase(self) -> Phase {
        match self {
            RejectReason::Excluded(_) => Phase::Region,
            RejectReason::BadTile => Phase::BadTile,
            RejectReason::NoNearbySpawner | RejectReason::Unreachable | RejectReason::TimedOut => {
                Phase::Reachability
            }
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Excluded(reason) => write!(f, "excluded: {}", reason),
            RejectReason::BadTile => write!(f, "bad tile"),
            RejectReason::NoNearbySpawner => write!(f, "no spawner nearby"),
            RejectReason::Unreachable => write!(f, "unreachable"),
            RejectReason::TimedOut => write!(f, "path budget exhausted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub point: Point3D,
    pub reason: RejectReason,
}

/// A point dropped by the bad-tile phase and the tile that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadTileHit {
    pub point: Point3D,
    pub tile_id: u16,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub accepted: Vec<Point3D>,
    pub rejections: Vec<Rejection>,
    pub bad_tiles: Vec<BadTileHit>,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub seeds: usize,
    pub expanded: usize,
    pub duplicates: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
    pub bad_tiles: Vec<BadTileHit>,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn rejected_in(&self, phase: Phase) -> usize {
        self.rejected
            .iter()
            .filter(|(reason, _)| reason.phase() == phase)
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("seeds: {}", self.seeds),
            format!("after fan-out: {}", self.expanded),
            format!("duplicates removed: {}", self.duplicates),
        ];
        for (reason, count) in &self.rejected {
            lines.push(format!("rejected ({}): {}", reason, count));
        }
        lines.push(format!("accepted: {}", self.accepted));
        lines.push(format!("elapsed: {:.1}s", self.elapsed.as_secs_f64()));
        lines
    }
}

/// Scans the world for chest spots: seeds from spawners, fans out around
/// them, then runs region, duplicate, bad-tile and reachability filters.
pub struct CandidatePipeline<'a, W: WorldQuery> {
    world: &'a W,
    spawners: &'a SpawnerSnapshot,
    exclusions: &'a ExclusionTable,
    bad_tiles: &'a BadTileRegistry,
    settings: PipelineSettings,
    region_cache: LruCache<Point2D, Option<Region>>,
}

impl<'a, W: WorldQuery> CandidatePipeline<'a, W> {
    pub fn new(
        world: &'a W,
        spawners: &'a SpawnerSnapshot,
        exclusions: &'a ExclusionTable,
        bad_tiles: &'a BadTileRegistry,
        settings: PipelineSettings,
    ) -> Self {
        let capacity = NonZeroUsize::new(settings.region_cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            world,
            spawners,
            exclusions,
            bad_tiles,
            settings,
            region_cache: LruCache::new(capacity),
        }
    }

    pub fn run(&mut self, rng: &mut WorldRng, progress: &mut dyn FnMut(&str)) -> (Vec<Point3D>, PipelineReport) {
        let started = Instant::now();
        let mut report = PipelineReport::default();

        let seeds = self.seeds();
        report.seeds = seeds.len();
        progress(&format!("seeded {} points from spawners", seeds.len()));

        let expanded = self.fan_out(&seeds, rng);
        report.expanded = expanded.len();
        progress(&format!("fanned out to {} points", expanded.len()));

        let outcome = self.filter(expanded, progress);
        report.duplicates = outcome.duplicates;
        report.accepted = outcome.accepted.len();
        for rejection in &outcome.rejections {
            *report.rejected.entry(rejection.reason).or_insert(0) += 1;
        }
        report.bad_tiles = outcome.bad_tiles;
        report.elapsed = started.elapsed();
        (outcome.accepted, report)
    }

    /// Every spawner location, height taken from the terrain.
    pub fn seeds(&self) -> Vec<Seed> {
        self.spawners
            .iter()
            .map(|spawner| {
                let location = spawner.location;
                Seed {
                    location: Point3D::new(location.x, location.y, self.world.surface_z(location.x, location.y)),
                    range: if spawner.home_range > 0 {
                        spawner.home_range
                    } else {
                        self.settings.fan_out_range
                    },
                }
            })
            .collect()
    }

    /// Each seed plus whatever distinct spawnable points the random
    /// requests around it produce.
    pub fn fan_out(&self, seeds: &[Seed], rng: &mut WorldRng) -> Vec<Point3D> {
        let mut points = Vec::with_capacity(seeds.len() * (self.settings.fan_out_attempts as usize + 1));
        for seed in seeds {
            points.push(seed.location);
            for _ in 0..self.settings.fan_out_attempts {
                let Some(found) = self.world.random_spawn_point(seed.location, seed.range, rng) else {
                    continue;
                };
                if found.xy() != seed.location.xy() {
                    points.push(found);
                }
            }
        }
        points
    }

    /// Region exclusion, deduplication, bad tiles, then reachability.
    pub fn filter(&mut self, points: Vec<Point3D>, progress: &mut dyn FnMut(&str)) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        let points = self.exclude_regions(points, &mut outcome.rejections);
        progress(&format!("{} points outside excluded regions", points.len()));

        let before = points.len();
        let points = dedup(points);
        outcome.duplicates = before - points.len();
        progress(&format!("{} unique points", points.len()));

        let points = self.drop_bad_tiles(points, &mut outcome.rejections, &mut outcome.bad_tiles);
        progress(&format!("{} points on suitable tiles", points.len()));

        progress("checking reachability, this takes a while");
        outcome.accepted = self.keep_reachable(points, &mut outcome.rejections, progress);
        progress(&format!("{} reachable points", outcome.accepted.len()));
        outcome
    }

    pub fn region_of(&mut self, point: Point2D) -> Option<Region> {
        if let Some(cached) = self.region_cache.get(&point) {
            return cached.clone();
        }
        let region = self.world.region_at(point);
        self.region_cache.put(point, region.clone());
        region
    }

    pub fn exclude_regions(&mut self, points: Vec<Point3D>, rejections: &mut Vec<Rejection>) -> Vec<Point3D> {
        let mut kept = Vec::with_capacity(points.len());
        for point in points {
            let region = self.region_of(point.xy());
            match self.exclusions.first_match(point.xy(), region.as_ref()) {
                Some(rule) => rejections.push(Rejection {
                    point,
                    reason: RejectReason::Excluded(rule.reason()),
                }),
                None => kept.push(point),
            }
        }
        kept
    }

    pub fn drop_bad_tiles(
        &self,
        points: Vec<Point3D>,
        rejections: &mut Vec<Rejection>,
        audit: &mut Vec<BadTileHit>,
    ) -> Vec<Point3D> {
        let mut kept = Vec::with_capacity(points.len());
        for point in points {
            let tile_id = self
                .world
                .land_tile(point.x, point.y)
                .map(|tile| tile.id & LAND_TILE_MASK);
            match tile_id {
                Some(tile_id) if self.bad_tiles.is_bad(tile_id) => {
                    audit.push(BadTileHit { point, tile_id });
                    rejections.push(Rejection {
                        point,
                        reason: RejectReason::BadTile,
                    });
                }
                _ => kept.push(point),
            }
        }
        kept
    }

    pub fn keep_reachable(
        &self,
        points: Vec<Point3D>,
        rejections: &mut Vec<Rejection>,
        progress: &mut dyn FnMut(&str),
    ) -> Vec<Point3D> {
        let total = points.len();
        let mut kept = Vec::with_capacity(total);
        for (index, point) in points.into_iter().enumerate() {
            if index > 0 && index % 1000 == 0 {
                progress(&format!("reachability: {}/{}", index, total));
            }
            match self.check_reachable(point) {
                Ok(()) => kept.push(point),
                Err(reason) => rejections.push(Rejection { point, reason }),
            }
        }
        kept
    }

    /// Accepts on the first nearby spawner a walker can reach.
    pub fn check_reachable(&self, point: Point3D) -> Result<(), RejectReason> {
        let nearby = self.spawners.within(point, self.settings.reachability_radius);
        if nearby.is_empty() {
            return Err(RejectReason::NoNearbySpawner);
        }
        let mut budget = PathBudget::new(self.settings.path_node_budget, self.settings.path_time_budget);
        for spawner in nearby {
            match self.world.path_reachable(point, spawner.location, &mut budget) {
                PathOutcome::Reachable => return Ok(()),
                PathOutcome::Unreachable => {}
                PathOutcome::BudgetExhausted => return Err(RejectReason::TimedOut),
            }
        }
        Err(RejectReason::Unreachable)
    }
}

/// Unique (x, y, z) points, first occurrence kept.
pub fn dedup(points: Vec<Point3D>) -> Vec<Point3D> {
    let mut seen = HashSet::with_capacity(points.len());
    points.into_iter().filter(|point| seen.insert(*point)).collect()
}
