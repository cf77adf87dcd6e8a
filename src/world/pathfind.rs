use crate::world::position::{Direction, Point2D, Point3D, DIRECTIONS};
use crate::world::query::{PathBudget, PathOutcome};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

const STRAIGHT_COST: i32 = 10;
const DIAGONAL_COST: i32 = 14;

/// A* over the tile grid for a grounded walker.
///
/// `step` returns the walker's height after moving from `from` onto the
/// given x/y, or `None` when the move is illegal. Diagonal moves also
/// require both adjacent orthogonal moves to be legal, so walls cannot be
/// cut through at the corners.
pub fn search<F>(from: Point3D, to: Point3D, budget: &mut PathBudget, step: F) -> PathOutcome
where
    F: Fn(Point3D, Point2D) -> Option<i32>,
{
    if from.xy() == to.xy() {
        return PathOutcome::Reachable;
    }

    let mut best: HashMap<Point2D, i32> = HashMap::new();
    let mut heights: HashMap<Point2D, i32> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(i32, i32, Point2DKey)>> = BinaryHeap::new();

    best.insert(from.xy(), 0);
    heights.insert(from.xy(), from.z);
    heap.push(Reverse((heuristic(from.xy(), to.xy()), 0, Point2DKey::from(from.xy()))));

    while let Some(Reverse((_, cost, key))) = heap.pop() {
        let current_xy = key.point();
        if best.get(&current_xy).copied().unwrap_or(i32::MAX) < cost {
            continue;
        }
        if current_xy == to.xy() {
            return PathOutcome::Reachable;
        }
        if !budget.charge() {
            return PathOutcome::BudgetExhausted;
        }
        let current_z = heights.get(&current_xy).copied().unwrap_or(from.z);
        let current = current_xy.with_z(current_z);

        for direction in DIRECTIONS {
            let next = current.step(direction);
            let Some(next_z) = step(current, next.xy()) else {
                continue;
            };
            if direction.is_diagonal() && !corner_clear(current, direction, &step) {
                continue;
            }
            let move_cost = if direction.is_diagonal() {
                DIAGONAL_COST
            } else {
                STRAIGHT_COST
            };
            let next_cost = cost.saturating_add(move_cost);
            if next_cost < best.get(&next.xy()).copied().unwrap_or(i32::MAX) {
                best.insert(next.xy(), next_cost);
                heights.insert(next.xy(), next_z);
                let estimate = next_cost.saturating_add(heuristic(next.xy(), to.xy()));
                heap.push(Reverse((estimate, next_cost, Point2DKey::from(next.xy()))));
            }
        }
    }

    PathOutcome::Unreachable
}

fn corner_clear<F>(current: Point3D, direction: Direction, step: &F) -> bool
where
    F: Fn(Point3D, Point2D) -> Option<i32>,
{
    let (dx, dy) = direction.delta();
    let horizontal = Point2D::new(current.x + dx, current.y);
    let vertical = Point2D::new(current.x, current.y + dy);
    step(current, horizontal).is_some() && step(current, vertical).is_some()
}

/// Octile distance, admissible for the costs above.
fn heuristic(a: Point2D, b: Point2D) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let diagonal = dx.min(dy);
    let straight = dx.max(dy) - diagonal;
    diagonal * DIAGONAL_COST + straight * STRAIGHT_COST
}

/// Heap ordering key; `Point2D` itself carries no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Point2DKey(i32, i32);

impl From<Point2D> for Point2DKey {
    fn from(point: Point2D) -> Self {
        Point2DKey(point.x, point.y)
    }
}

impl Point2DKey {
    fn point(self) -> Point2D {
        Point2D::new(self.0, self.1)
    }
}
