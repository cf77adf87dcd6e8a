use serde::{Deserialize, Serialize};

/// A 2D world or map-local coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

/// A world coordinate with terrain height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

pub const DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
    Direction::Northeast,
    Direction::Northwest,
    Direction::Southeast,
    Direction::Southwest,
];

impl Point2D {
    /// Returned when no placement could be found. Never a legitimate chest spot.
    pub const ZERO: Point2D = Point2D { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn with_z(self, z: i32) -> Point3D {
        Point3D {
            x: self.x,
            y: self.y,
            z,
        }
    }
}

impl Point3D {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(self) -> Point2D {
        Point2D {
            x: self.x,
            y: self.y,
        }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z,
        }
    }

    /// Square (Chebyshev) range test on the x/y plane, the way the world
    /// measures interaction and search radii.
    pub fn in_range(self, other: Point3D, range: i32) -> bool {
        (self.x - other.x).abs() <= range && (self.y - other.y).abs() <= range
    }
}

impl Rect2D {
    /// Rectangle spanning both corners inclusively.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self {
            x: x1,
            y: y1,
            width: span(x1, x2),
            height: span(y1, y2),
        }
    }

    pub fn end_x(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn end_y(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Inclusive length of `lo..=hi`, saturating at `i32::MAX`.
fn span(lo: i32, hi: i32) -> i32 {
    (i64::from(hi) - i64::from(lo) + 1).min(i64::from(i32::MAX)) as i32
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::Northeast => (1, -1),
            Direction::Northwest => (-1, -1),
            Direction::Southeast => (1, 1),
            Direction::Southwest => (-1, 1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::Northeast
                | Direction::Northwest
                | Direction::Southeast
                | Direction::Southwest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opposite(direction: Direction) -> Direction {
        match direction {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Northeast => Direction::Southwest,
            Direction::Northwest => Direction::Southeast,
            Direction::Southeast => Direction::Northwest,
            Direction::Southwest => Direction::Northeast,
        }
    }

    #[test]
    fn step_roundtrip_with_opposites() {
        let origin = Point3D::new(100, 100, 7);
        for direction in DIRECTIONS {
            let back = origin.step(direction).step(opposite(direction));
            assert_eq!(back, origin);
        }
    }

    #[test]
    fn rect_span_saturates_at_extremes() {
        let rect = Rect2D::from_corners(i32::MAX, 0, i32::MIN, 0);
        assert_eq!(rect.x, i32::MIN);
        assert_eq!(rect.width, i32::MAX);
        assert_eq!(rect.height, 1);
    }

    #[test]
    fn rect_from_corners_is_inclusive_and_ordered() {
        let rect = Rect2D::from_corners(10, 20, 0, 0);
        assert_eq!(rect, Rect2D { x: 0, y: 0, width: 11, height: 21 });
        assert_eq!(rect.end_x(), 10);
        assert_eq!(rect.end_y(), 20);
        assert!(rect.contains(10, 20));
        assert!(!rect.contains(11, 20));
    }

    #[test]
    fn in_range_uses_square_distance() {
        let a = Point3D::new(100, 100, 0);
        assert!(a.in_range(Point3D::new(132, 68, 40), 32));
        assert!(!a.in_range(Point3D::new(133, 100, 0), 32));
    }
}
