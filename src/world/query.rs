use crate::world::position::{Point2D, Point3D};
use crate::world::regions::Region;
use crate::world::rng::WorldRng;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandTile {
    pub id: u16,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    Reachable,
    Unreachable,
    BudgetExhausted,
}

/// Work allowance for the path searches run on behalf of one candidate.
/// Shared across every search for that candidate.
#[derive(Debug, Clone, Copy)]
pub struct PathBudget {
    nodes_remaining: u64,
    deadline: Option<Instant>,
}

impl PathBudget {
    pub fn new(max_nodes: u64, max_time: Option<Duration>) -> Self {
        Self {
            nodes_remaining: max_nodes,
            deadline: max_time.map(|limit| Instant::now() + limit),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            nodes_remaining: u64::MAX,
            deadline: None,
        }
    }

    /// Charges one expanded node. Returns false once the budget is spent.
    pub fn charge(&mut self) -> bool {
        if self.nodes_remaining == 0 {
            return false;
        }
        self.nodes_remaining -= 1;
        // clock checked every 256 nodes
        if self.nodes_remaining % 256 == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.nodes_remaining = 0;
                    return false;
                }
            }
        }
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.nodes_remaining == 0
    }
}

/// The world services the cartography and pipeline code run against.
/// The host server provides the real implementation; `GridWorld` is the
/// in-memory one.
pub trait WorldQuery {
    /// Facet width and height.
    fn size(&self) -> (i32, i32);

    fn land_tile(&self, x: i32, y: i32) -> Option<LandTile>;

    /// Height a mobile standing on (x, y) would have.
    fn surface_z(&self, x: i32, y: i32) -> i32 {
        self.land_tile(x, y).map(|tile| tile.z).unwrap_or(0)
    }

    fn region_at(&self, point: Point2D) -> Option<Region>;

    fn can_spawn_mobile(&self, point: Point3D) -> bool;

    /// Whether a grounded walker can get from `from` to `to`.
    fn path_reachable(&self, from: Point3D, to: Point3D, budget: &mut PathBudget) -> PathOutcome;

    /// Random point a mobile could spawn on within `range` of `center`,
    /// height taken from the terrain.
    fn random_spawn_point(
        &self,
        center: Point3D,
        range: i32,
        rng: &mut WorldRng,
    ) -> Option<Point3D> {
        let x = center.x + rng.roll_range(-range, range);
        let y = center.y + rng.roll_range(-range, range);
        let (width, height) = self.size();
        if x < 0 || y < 0 || x >= width || y >= height {
            return None;
        }
        let point = Point3D::new(x, y, self.surface_z(x, y));
        if self.can_spawn_mobile(point) {
            Some(point)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_budget_runs_out() {
        let mut budget = PathBudget::new(3, None);
        assert!(budget.charge());
        assert!(budget.charge());
        assert!(budget.charge());
        assert!(!budget.charge());
        assert!(budget.is_exhausted());
    }

    #[test]
    fn elapsed_deadline_exhausts_budget() {
        let mut budget = PathBudget::new(1024, Some(Duration::ZERO));
        let mut charged = 0;
        while budget.charge() {
            charged += 1;
        }
        assert!(charged < 1024);
        assert!(budget.is_exhausted());
    }
}
