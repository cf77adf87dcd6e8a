use crate::cartography::editing::MapHandle;
use crate::cartography::map_item::MapItem;
use crate::treasure::store::{CandidateStore, SelectOutcome};
use crate::world::position::Point2D;
use crate::world::rng::WorldRng;

/// World tiles shown along each side of a treasure map.
pub const WINDOW_SIZE: i32 = 600;
pub const GRID_SIZE: i32 = 300;
/// The chest sits at least this far from the window's left and top edges.
const MIN_OFFSET: i32 = 150;
const MAX_OFFSET: i32 = 450;

/// A decoded treasure map: a read-only window around a buried chest with a
/// single pin on it.
#[derive(Debug, Clone)]
pub struct TreasureMap {
    level: u8,
    chest: Option<Point2D>,
    map: MapHandle,
}

impl TreasureMap {
    /// Builds the map for an already chosen location. An exhausted pick
    /// gives a blank map with no chest.
    pub fn new(
        serial: u32,
        level: u8,
        pick: SelectOutcome,
        world_size: (i32, i32),
        rng: &mut WorldRng,
    ) -> Self {
        let (world_width, world_height) = world_size;
        let mut item = MapItem::with_world_size(world_width, world_height);
        let chest = match pick {
            SelectOutcome::Found(chest) => Some(chest),
            SelectOutcome::Exhausted => None,
        };
        if let Some(chest) = chest {
            let x1 = window_start(chest.x - rng.roll_range(MIN_OFFSET, MAX_OFFSET), world_width);
            let y1 = window_start(chest.y - rng.roll_range(MIN_OFFSET, MAX_OFFSET), world_height);
            item.set_display(
                x1,
                y1,
                x1 + WINDOW_SIZE - 1,
                y1 + WINDOW_SIZE - 1,
                GRID_SIZE,
                GRID_SIZE,
            );
            item.add_world_pin(chest.x, chest.y);
        }
        item.set_read_only(true);
        Self {
            level,
            chest,
            map: MapHandle::new(serial, item),
        }
    }

    /// Picks a free chest location from `store` and draws the map for it.
    pub fn from_store<O>(
        serial: u32,
        level: u8,
        store: &CandidateStore,
        world_size: (i32, i32),
        rng: &mut WorldRng,
        is_occupied: O,
    ) -> Self
    where
        O: FnMut(Point2D) -> bool,
    {
        let pick = store.pick_location(rng, is_occupied);
        Self::new(serial, level, pick, world_size, rng)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn chest(&self) -> Option<Point2D> {
        self.chest
    }

    pub fn handle(&self) -> &MapHandle {
        &self.map
    }

    /// Messages sent when someone opens the map.
    pub fn display_messages(&self) -> Vec<Vec<u8>> {
        self.map.display_to()
    }
}

/// Shifts a window start so the whole window lies on the facet.
fn window_start(start: i32, world_extent: i32) -> i32 {
    start.min(world_extent - WINDOW_SIZE).max(0)
}
