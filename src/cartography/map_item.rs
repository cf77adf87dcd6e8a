use crate::telemetry::logging;
use crate::world::position::{Point2D, Point3D, Rect2D};

pub const DEFAULT_WORLD_WIDTH: i32 = 5120;
pub const DEFAULT_WORLD_HEIGHT: i32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    /// Bounds with zero width or height; no mapping exists.
    DegenerateBounds(Rect2D),
    /// Grid with a zero dimension.
    DegenerateGrid(i32, i32),
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::DegenerateBounds(rect) => write!(
                f,
                "map bounds ({}, {}) {}x{} have no area",
                rect.x, rect.y, rect.width, rect.height
            ),
            CoordinateError::DegenerateGrid(width, height) => {
                write!(f, "map grid {}x{} has no area", width, height)
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

/// Result of a pin primitive. The network surface discards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEdit {
    Applied,
    ReadOnly,
    IndexOutOfRange,
    /// `remove_pin(0)`: the first pin marks the map's subject.
    PrimaryPinLocked,
    Degenerate(CoordinateError),
}

/// Map-item coordinate model: a window of world space shown on a fixed
/// local grid, plus the pins drawn on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapItem {
    bounds: Rect2D,
    grid_width: i32,
    grid_height: i32,
    pins: Vec<Point2D>,
    read_only: bool,
    editable: bool,
    world_width: i32,
    world_height: i32,
}

impl Default for MapItem {
    fn default() -> Self {
        Self::with_world_size(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT)
    }
}

impl MapItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_world_size(world_width: i32, world_height: i32) -> Self {
        Self {
            bounds: Rect2D::default(),
            grid_width: 0,
            grid_height: 0,
            pins: Vec::new(),
            read_only: false,
            editable: false,
            world_width,
            world_height,
        }
    }

    /// A map showing the whole facet at 400×400.
    pub fn world_map() -> Self {
        let mut map = Self::new();
        map.set_display(0, 0, DEFAULT_WORLD_WIDTH - 1, DEFAULT_WORLD_HEIGHT - 1, 400, 400);
        map
    }

    /// Drawn by a cartographer: a better cartographer covers more ground
    /// at a finer resolution.
    pub fn craft_init(&mut self, cartography_skill: f64, anchor: Point3D) {
        let dist = 64_i32.saturating_add((cartography_skill * 4.0) as i32).max(200);
        let size = 24_i32.saturating_add((cartography_skill * 3.3) as i32).clamp(200, 400);
        self.set_display(
            anchor.x.saturating_sub(dist),
            anchor.y.saturating_sub(dist),
            anchor.x.saturating_add(dist),
            anchor.y.saturating_add(dist),
            size,
            size,
        );
    }

    pub fn bounds(&self) -> Rect2D {
        self.bounds
    }

    pub fn grid_size(&self) -> (i32, i32) {
        (self.grid_width, self.grid_height)
    }

    pub fn pins(&self) -> &[Point2D] {
        &self.pins
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Corners are clamped to the facet; the grid is kept as given.
    /// Existing pins stay where they are in grid space, which may no longer
    /// match the world spot they were placed for.
    pub fn set_display(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, grid_width: i32, grid_height: i32) {
        let max_x = (self.world_width - 1).max(0);
        let max_y = (self.world_height - 1).max(0);
        let x1 = x1.clamp(0, max_x);
        let y1 = y1.clamp(0, max_y);
        let x2 = x2.clamp(0, max_x);
        let y2 = y2.clamp(0, max_y);

        if !self.pins.is_empty() {
            logging::log_treasure(&format!(
                "map display changed to ({},{})-({},{}) with {} pins placed; pins not re-projected",
                x1,
                y1,
                x2,
                y2,
                self.pins.len()
            ));
        }

        self.bounds = Rect2D::from_corners(x1, y1, x2, y2);
        self.grid_width = grid_width;
        self.grid_height = grid_height;
    }

    pub fn convert_to_world(&self, x: i32, y: i32) -> Result<Point2D, CoordinateError> {
        self.check_grid()?;
        let bounds = self.bounds;
        Ok(Point2D {
            x: saturate(i64::from(bounds.x) + i64::from(x) * i64::from(bounds.width) / i64::from(self.grid_width)),
            y: saturate(i64::from(bounds.y) + i64::from(y) * i64::from(bounds.height) / i64::from(self.grid_height)),
        })
    }

    pub fn convert_to_map(&self, x: i32, y: i32) -> Result<Point2D, CoordinateError> {
        self.check_bounds()?;
        let bounds = self.bounds;
        Ok(Point2D {
            x: saturate((i64::from(x) - i64::from(bounds.x)) * i64::from(self.grid_width) / i64::from(bounds.width)),
            y: saturate((i64::from(y) - i64::from(bounds.y)) * i64::from(self.grid_height) / i64::from(bounds.height)),
        })
    }

    /// Clamps a grid point onto the grid.
    pub fn validate(&self, x: i32, y: i32) -> Point2D {
        Point2D {
            x: x.min(self.grid_width.saturating_sub(1)).max(0),
            y: y.min(self.grid_height.saturating_sub(1)).max(0),
        }
    }

    pub fn add_pin(&mut self, x: i32, y: i32) -> PinEdit {
        if self.read_only {
            return PinEdit::ReadOnly;
        }
        self.pins.push(Point2D { x, y });
        PinEdit::Applied
    }

    /// Places a pin on a world location. Divides by the bounds before
    /// scaling to the grid, so it can land one cell away from
    /// `convert_to_map` for the same point. Stored pins depend on this.
    pub fn add_world_pin(&mut self, x: i32, y: i32) -> PinEdit {
        if let Err(err) = self.check_bounds() {
            logging::log_error(&format!("add_world_pin({}, {}) rejected: {}", x, y, err));
            return PinEdit::Degenerate(err);
        }
        let bounds = self.bounds;
        let local_x = ((f64::from(x) - f64::from(bounds.x)) / f64::from(bounds.width)) * f64::from(self.grid_width);
        let local_y = ((f64::from(y) - f64::from(bounds.y)) / f64::from(bounds.height)) * f64::from(self.grid_height);
        self.add_pin(local_x as i32, local_y as i32)
    }

    pub fn remove_pin(&mut self, index: usize) -> PinEdit {
        if self.read_only {
            return PinEdit::ReadOnly;
        }
        if index == 0 && !self.pins.is_empty() {
            return PinEdit::PrimaryPinLocked;
        }
        if index >= self.pins.len() {
            return PinEdit::IndexOutOfRange;
        }
        self.pins.remove(index);
        PinEdit::Applied
    }

    /// Out-of-range indices append.
    pub fn insert_pin(&mut self, index: usize, x: i32, y: i32) -> PinEdit {
        if self.read_only {
            return PinEdit::ReadOnly;
        }
        let point = Point2D { x, y };
        if index < self.pins.len() {
            self.pins.insert(index, point);
        } else {
            self.pins.push(point);
        }
        PinEdit::Applied
    }

    pub fn change_pin(&mut self, index: usize, x: i32, y: i32) -> PinEdit {
        if self.read_only {
            return PinEdit::ReadOnly;
        }
        match self.pins.get_mut(index) {
            Some(pin) => {
                *pin = Point2D { x, y };
                PinEdit::Applied
            }
            None => PinEdit::IndexOutOfRange,
        }
    }

    pub fn clear_pins(&mut self) -> PinEdit {
        if self.read_only {
            return PinEdit::ReadOnly;
        }
        self.pins.clear();
        PinEdit::Applied
    }

    fn check_bounds(&self) -> Result<(), CoordinateError> {
        if self.bounds.is_degenerate() {
            return Err(CoordinateError::DegenerateBounds(self.bounds));
        }
        Ok(())
    }

    fn check_grid(&self) -> Result<(), CoordinateError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(CoordinateError::DegenerateGrid(self.grid_width, self.grid_height));
        }
        Ok(())
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_next(state: &mut u64) -> u32 {
        *state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (*state >> 32) as u32
    }

    fn map_with_pins(count: i32) -> MapItem {
        let mut map = MapItem::world_map();
        for i in 0..count {
            map.add_pin(i, i);
        }
        map
    }

    #[test]
    fn set_display_clamps_corners_and_keeps_grid() {
        let mut map = MapItem::new();
        map.set_display(-50, -10, 9000, 9000, 1000, 7);
        assert_eq!(map.bounds(), Rect2D { x: 0, y: 0, width: 5120, height: 4096 });
        assert_eq!(map.grid_size(), (1000, 7));
    }

    #[test]
    fn set_display_keeps_extreme_corners_on_the_facet() {
        let extremes = [i32::MIN, -100, 0, 2560, 5119, 9000, i32::MAX];
        for &x1 in &extremes {
            for &x2 in &extremes {
                for &y in &[i32::MIN, 100, i32::MAX] {
                    let mut map = MapItem::new();
                    map.set_display(x1, y, x2, 100, 10, 10);
                    let bounds = map.bounds();
                    assert!(bounds.x >= 0 && bounds.y >= 0, "{:?}", bounds);
                    assert!(bounds.end_x() < DEFAULT_WORLD_WIDTH, "{:?}", bounds);
                    assert!(bounds.end_y() < DEFAULT_WORLD_HEIGHT, "{:?}", bounds);
                    assert!(!bounds.is_degenerate());
                }
            }
        }
        let mut map = MapItem::new();
        map.set_display(0, 0, -100, 100, 10, 10);
        assert_eq!(map.bounds(), Rect2D::from_corners(0, 0, 0, 100));
    }

    #[test]
    fn conversions_saturate_instead_of_overflowing() {
        let map = MapItem::world_map();
        assert_eq!(
            map.convert_to_world(1_000_000, 0).expect("grid"),
            Point2D::new(12_800_000, 0)
        );
        assert_eq!(
            map.convert_to_world(i32::MAX, i32::MIN).expect("grid"),
            Point2D::new(i32::MAX, i32::MIN)
        );

        let mut fine = MapItem::new();
        fine.set_display(0, 0, 5119, 4095, 1_000_000, 1_000_000);
        assert_eq!(
            fine.convert_to_map(2560, 2048).expect("bounds"),
            Point2D::new(500_000, 500_000)
        );
        assert_eq!(
            fine.convert_to_map(i32::MAX, i32::MIN).expect("bounds"),
            Point2D::new(i32::MAX, i32::MIN)
        );
        assert_eq!(fine.validate(i32::MAX, i32::MIN), Point2D::new(999_999, 0));

        let mut wide = MapItem::new();
        wide.set_display(0, 0, 5119, 4095, 2_000_000, 400);
        assert_eq!(
            wide.convert_to_world(1_999_999, 399).expect("grid"),
            Point2D::new(5119, 4085)
        );
        assert_eq!(wide.add_world_pin(i32::MIN, i32::MAX), PinEdit::Applied);
    }

    #[test]
    fn midpoint_pin_lands_in_grid_center() {
        let mut map = MapItem::new();
        map.set_display(0, 0, 5119, 4095, 400, 400);
        assert_eq!(map.add_world_pin(2560, 2048), PinEdit::Applied);
        assert_eq!(map.pins(), &[Point2D::new(200, 200)]);
        assert_eq!(map.convert_to_world(200, 200), Ok(Point2D::new(2560, 2048)));
    }

    #[test]
    fn world_roundtrip_within_one_cell() {
        let mut state = 0x5eed_1234_abcd_0001;
        for _ in 0..64 {
            let x1 = (lcg_next(&mut state) % 4000) as i32;
            let y1 = (lcg_next(&mut state) % 3000) as i32;
            let w = 1 + (lcg_next(&mut state) % 1000) as i32;
            let h = 1 + (lcg_next(&mut state) % 1000) as i32;
            // display resolution never finer than the world span it shows
            let grid_w = 1 + (lcg_next(&mut state) % (w as u32 + 1)) as i32;
            let grid_h = 1 + (lcg_next(&mut state) % (h as u32 + 1)) as i32;
            let mut map = MapItem::new();
            map.set_display(x1, y1, x1 + w, y1 + h, grid_w, grid_h);
            let (gw, gh) = map.grid_size();
            for lx in (0..gw).step_by(7) {
                for ly in (0..gh).step_by(11) {
                    let world = map.convert_to_world(lx, ly).expect("world");
                    let back = map.convert_to_map(world.x, world.y).expect("map");
                    assert!((back.x - lx).abs() <= 1, "x {lx} -> {} -> {}", world.x, back.x);
                    assert!((back.y - ly).abs() <= 1, "y {ly} -> {} -> {}", world.y, back.y);
                }
            }
        }
    }

    #[test]
    fn validate_is_idempotent() {
        let mut map = MapItem::new();
        map.set_display(0, 0, 999, 999, 300, 200);
        let mut state = 0xdead_beef_0000_0042;
        let mut samples = vec![(i32::MIN, i32::MIN), (i32::MAX, i32::MAX), (-1, 200), (300, -7)];
        for _ in 0..256 {
            let x = lcg_next(&mut state) as i32;
            let y = lcg_next(&mut state) as i32;
            samples.push((x, y));
        }
        for (x, y) in samples {
            let once = map.validate(x, y);
            assert!((0..300).contains(&once.x) && (0..200).contains(&once.y));
            assert_eq!(map.validate(once.x, once.y), once);
        }
    }

    #[test]
    fn zero_area_bounds_are_rejected_not_panicking() {
        let map = MapItem::new();
        assert!(matches!(
            map.convert_to_map(10, 10),
            Err(CoordinateError::DegenerateBounds(_))
        ));
        assert!(matches!(
            map.convert_to_world(10, 10),
            Err(CoordinateError::DegenerateGrid(0, 0))
        ));
        let mut map = MapItem::new();
        assert!(matches!(map.add_world_pin(5, 5), PinEdit::Degenerate(_)));
        assert!(map.pins().is_empty());
    }

    #[test]
    fn add_world_pin_differs_from_convert_to_map_under_truncation() {
        let mut map = MapItem::new();
        map.set_display(0, 0, 48, 48, 49, 49);
        // 1 * 49 / 49 is exactly 1; (1.0 / 49.0) * 49.0 is just below 1
        assert_eq!(map.convert_to_map(1, 1), Ok(Point2D::new(1, 1)));
        map.add_world_pin(1, 1);
        assert_eq!(map.pins(), &[Point2D::new(0, 0)]);
    }

    #[test]
    fn remove_pin_never_removes_primary() {
        for count in 1..6 {
            let mut map = map_with_pins(count);
            let before = map.pins().to_vec();
            assert_eq!(map.remove_pin(0), PinEdit::PrimaryPinLocked);
            assert_eq!(map.pins(), before.as_slice());
        }
    }

    #[test]
    fn remove_pin_shifts_later_pins_down() {
        let mut map = map_with_pins(5);
        assert_eq!(map.remove_pin(2), PinEdit::Applied);
        assert_eq!(
            map.pins(),
            &[
                Point2D::new(0, 0),
                Point2D::new(1, 1),
                Point2D::new(3, 3),
                Point2D::new(4, 4)
            ]
        );
        assert_eq!(map.remove_pin(4), PinEdit::IndexOutOfRange);
        assert_eq!(map.pins().len(), 4);
    }

    #[test]
    fn insert_out_of_range_appends_and_change_out_of_range_is_ignored() {
        let mut map = map_with_pins(2);
        map.insert_pin(1, 9, 9);
        map.insert_pin(40, 7, 7);
        assert_eq!(
            map.pins(),
            &[Point2D::new(0, 0), Point2D::new(9, 9), Point2D::new(1, 1), Point2D::new(7, 7)]
        );
        assert_eq!(map.change_pin(4, 3, 3), PinEdit::IndexOutOfRange);
        assert_eq!(map.change_pin(0, 3, 3), PinEdit::Applied);
        assert_eq!(map.pins()[0], Point2D::new(3, 3));
    }

    #[test]
    fn read_only_map_ignores_every_mutation() {
        let mut map = map_with_pins(3);
        map.set_read_only(true);
        let before = map.clone();
        assert_eq!(map.add_pin(1, 1), PinEdit::ReadOnly);
        assert_eq!(map.insert_pin(0, 1, 1), PinEdit::ReadOnly);
        assert_eq!(map.change_pin(1, 1, 1), PinEdit::ReadOnly);
        assert_eq!(map.remove_pin(1), PinEdit::ReadOnly);
        assert_eq!(map.clear_pins(), PinEdit::ReadOnly);
        assert_eq!(map, before);
    }

    #[test]
    fn resizing_keeps_pins_in_grid_space() {
        let mut map = MapItem::new();
        map.set_display(0, 0, 999, 999, 100, 100);
        map.add_world_pin(500, 500);
        map.set_display(1000, 1000, 1999, 1999, 100, 100);
        assert_eq!(map.pins(), &[Point2D::new(50, 50)]);
    }

    #[test]
    fn craft_init_scales_with_skill() {
        let mut novice = MapItem::new();
        novice.craft_init(0.0, Point3D::new(1000, 1000, 0));
        assert_eq!(novice.bounds(), Rect2D::from_corners(800, 800, 1200, 1200));
        assert_eq!(novice.grid_size(), (200, 200));

        let mut master = MapItem::new();
        master.craft_init(100.0, Point3D::new(1000, 1000, 0));
        assert_eq!(master.bounds(), Rect2D::from_corners(536, 536, 1464, 1464));
        let size = 24 + (100.0_f64 * 3.3) as i32;
        assert!((353..=354).contains(&size));
        assert_eq!(master.grid_size(), (size, size));

        let mut edge = MapItem::new();
        edge.craft_init(100.0, Point3D::new(10, 4090, 0));
        assert_eq!(edge.bounds().x, 0);
        assert_eq!(edge.bounds().end_y(), 4095);
    }
}
