use crate::cartography::map_item::{MapItem, PinEdit};
use crate::net::map_commands::{CommandKind, MapCommand, MapDisplay};
use crate::telemetry::logging;
use crate::world::position::Point3D;
use std::sync::{Arc, Mutex, MutexGuard};

/// Pins a player may place through the gump.
pub const MAX_USER_PINS: usize = 50;
/// Tiles within which a non-staff actor may edit a map.
pub const EDIT_RANGE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    Player,
    Counselor,
    GameMaster,
    Administrator,
}

/// What the host knows about the player sending a map command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub serial: u32,
    pub location: Point3D,
    pub facet: u8,
    pub alive: bool,
    pub trading: bool,
    pub access: AccessLevel,
    /// Line of sight and visibility of the map item, as judged by the host.
    pub can_see_item: bool,
}

/// Where the map item currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPlacement {
    pub world_location: Point3D,
    pub facet: u8,
    /// Serial of the mobile carrying the map, if any.
    pub held_by: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditDenied {
    CannotSee,
    OtherFacet,
    Dead,
    Trading,
    OutOfRange,
    HeldByOther,
    NotEditable,
    ReadOnly,
    PinLimit,
}

pub type EditResult = Result<PinEdit, EditDenied>;

pub fn is_edit_authorized(actor: &Actor, placement: &ItemPlacement) -> Result<(), EditDenied> {
    if !actor.can_see_item {
        return Err(EditDenied::CannotSee);
    }
    if actor.facet != placement.facet {
        return Err(EditDenied::OtherFacet);
    }
    if !actor.alive {
        return Err(EditDenied::Dead);
    }
    if actor.trading {
        return Err(EditDenied::Trading);
    }
    let staff = actor.access >= AccessLevel::GameMaster;
    if !staff && !actor.location.in_range(placement.world_location, EDIT_RANGE) {
        return Err(EditDenied::OutOfRange);
    }
    if let Some(holder) = placement.held_by {
        if holder != actor.serial {
            return Err(EditDenied::HeldByOther);
        }
    }
    Ok(())
}

fn check_pin_edit(map: &MapItem, actor: &Actor, placement: &ItemPlacement) -> Result<(), EditDenied> {
    if map.read_only() {
        return Err(EditDenied::ReadOnly);
    }
    if !map.editable() {
        return Err(EditDenied::NotEditable);
    }
    is_edit_authorized(actor, placement)
}

pub fn on_add_pin(map: &mut MapItem, actor: &Actor, placement: &ItemPlacement, x: i32, y: i32) -> EditResult {
    check_pin_edit(map, actor, placement)?;
    if map.pins().len() >= MAX_USER_PINS {
        return Err(EditDenied::PinLimit);
    }
    let point = map.validate(x, y);
    Ok(map.add_pin(point.x, point.y))
}

pub fn on_insert_pin(
    map: &mut MapItem,
    actor: &Actor,
    placement: &ItemPlacement,
    index: usize,
    x: i32,
    y: i32,
) -> EditResult {
    check_pin_edit(map, actor, placement)?;
    if map.pins().len() >= MAX_USER_PINS {
        return Err(EditDenied::PinLimit);
    }
    let point = map.validate(x, y);
    Ok(map.insert_pin(index, point.x, point.y))
}

pub fn on_change_pin(
    map: &mut MapItem,
    actor: &Actor,
    placement: &ItemPlacement,
    index: usize,
    x: i32,
    y: i32,
) -> EditResult {
    check_pin_edit(map, actor, placement)?;
    let point = map.validate(x, y);
    Ok(map.change_pin(index, point.x, point.y))
}

pub fn on_remove_pin(map: &mut MapItem, actor: &Actor, placement: &ItemPlacement, index: usize) -> EditResult {
    check_pin_edit(map, actor, placement)?;
    Ok(map.remove_pin(index))
}

pub fn on_clear_pins(map: &mut MapItem, actor: &Actor, placement: &ItemPlacement) -> EditResult {
    check_pin_edit(map, actor, placement)?;
    Ok(map.clear_pins())
}

/// Flips the editable flag and returns the new state.
pub fn on_toggle_editable(map: &mut MapItem, actor: &Actor, placement: &ItemPlacement) -> Result<bool, EditDenied> {
    if map.read_only() {
        return Err(EditDenied::ReadOnly);
    }
    is_edit_authorized(actor, placement)?;
    let editable = !map.editable();
    map.set_editable(editable);
    Ok(editable)
}

/// A map item shared between connections. Every command holds the item's
/// lock for its whole duration, so edits from two players never interleave.
#[derive(Debug, Clone)]
pub struct MapHandle {
    serial: u32,
    inner: Arc<Mutex<MapItem>>,
}

impl MapHandle {
    pub fn new(serial: u32, map: MapItem) -> Self {
        Self {
            serial,
            inner: Arc::new(Mutex::new(map)),
        }
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn lock(&self) -> MutexGuard<'_, MapItem> {
        // a panic mid-edit leaves a consistent Vec; keep serving the map
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Messages that open the map for a viewer: the window, a clear, one
    /// add per pin in order, then the editable flag.
    pub fn display_to(&self) -> Vec<Vec<u8>> {
        let map = self.lock();
        let mut messages = Vec::with_capacity(map.pins().len() + 3);
        messages.push(MapDisplay::from_map(self.serial, &map).encode());
        messages.push(MapCommand::clear_pins(self.serial).encode());
        for pin in map.pins() {
            messages.push(MapCommand::add_pin(self.serial, pin.x, pin.y).encode());
        }
        messages.push(MapCommand::editable_state(self.serial, map.editable()).encode());
        messages
    }

    /// Applies one decoded client command. The outcome is for the caller's
    /// bookkeeping only; nothing about a refusal goes back to the client.
    pub fn dispatch(&self, actor: &Actor, placement: &ItemPlacement, command: &MapCommand) -> Dispatched {
        let mut map = self.lock();
        if map.read_only() || command.serial != self.serial {
            return Dispatched::Discarded;
        }
        let index = usize::from(command.pin);
        let x = i32::from(command.x);
        let y = i32::from(command.y);
        let result = match command.kind {
            CommandKind::AddPin => on_add_pin(&mut map, actor, placement, x, y),
            CommandKind::InsertPin => on_insert_pin(&mut map, actor, placement, index, x, y),
            CommandKind::ChangePin => on_change_pin(&mut map, actor, placement, index, x, y),
            CommandKind::RemovePin => on_remove_pin(&mut map, actor, placement, index),
            CommandKind::ClearPins => on_clear_pins(&mut map, actor, placement),
            CommandKind::ToggleEditable => {
                return match on_toggle_editable(&mut map, actor, placement) {
                    Ok(editable) => Dispatched::Reply(
                        MapCommand::editable_state(self.serial, editable).encode(),
                    ),
                    Err(denied) => Dispatched::Edit(Err(denied)),
                };
            }
            CommandKind::EditableState => return Dispatched::Discarded,
        };
        Dispatched::Edit(result)
    }

    /// Decodes and dispatches a raw client message. Undecodable input is
    /// logged and otherwise ignored.
    pub fn receive(&self, actor: &Actor, placement: &ItemPlacement, data: &[u8]) -> Option<Vec<u8>> {
        let command = match MapCommand::decode(data) {
            Ok(command) => command,
            Err(err) => {
                logging::log_error(&format!(
                    "map command from 0x{:08X} dropped: {}",
                    actor.serial, err
                ));
                return None;
            }
        };
        match self.dispatch(actor, placement, &command) {
            Dispatched::Reply(bytes) => Some(bytes),
            Dispatched::Edit(_) | Dispatched::Discarded => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Read-only map, foreign serial, or a server-only command code.
    Discarded,
    Edit(EditResult),
    Reply(Vec<u8>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::position::Point2D;

    const OWNER: u32 = 0x0000_0101;
    const MAP_SERIAL: u32 = 0x4000_0AAA;

    fn owner() -> Actor {
        Actor {
            serial: OWNER,
            location: Point3D::new(1000, 1000, 0),
            facet: 0,
            alive: true,
            trading: false,
            access: AccessLevel::Player,
            can_see_item: true,
        }
    }

    fn in_pack() -> ItemPlacement {
        ItemPlacement {
            world_location: Point3D::new(1000, 1000, 0),
            facet: 0,
            held_by: Some(OWNER),
        }
    }

    fn editable_map() -> MapItem {
        let mut map = MapItem::new();
        map.set_display(0, 0, 999, 999, 200, 200);
        map.set_editable(true);
        map.add_pin(10, 10);
        map.add_pin(20, 20);
        map
    }

    fn unauthorized_actors() -> Vec<(Actor, ItemPlacement, EditDenied)> {
        let mut cases = Vec::new();
        let mut actor = owner();
        actor.can_see_item = false;
        cases.push((actor, in_pack(), EditDenied::CannotSee));
        let mut actor = owner();
        actor.facet = 1;
        cases.push((actor, in_pack(), EditDenied::OtherFacet));
        let mut actor = owner();
        actor.alive = false;
        cases.push((actor, in_pack(), EditDenied::Dead));
        let mut actor = owner();
        actor.trading = true;
        cases.push((actor, in_pack(), EditDenied::Trading));
        let mut actor = owner();
        actor.location = Point3D::new(1004, 1000, 0);
        let on_ground = ItemPlacement {
            held_by: None,
            ..in_pack()
        };
        cases.push((actor, on_ground, EditDenied::OutOfRange));
        let mut actor = owner();
        actor.serial = 0x0000_0202;
        cases.push((actor, in_pack(), EditDenied::HeldByOther));
        cases
    }

    #[test]
    fn authorization_checks_each_condition() {
        assert_eq!(is_edit_authorized(&owner(), &in_pack()), Ok(()));
        for (actor, placement, expected) in unauthorized_actors() {
            assert_eq!(is_edit_authorized(&actor, &placement), Err(expected));
        }
    }

    #[test]
    fn staff_edit_from_afar() {
        let mut actor = owner();
        actor.location = Point3D::new(3000, 3000, 0);
        actor.access = AccessLevel::GameMaster;
        assert_eq!(is_edit_authorized(&actor, &in_pack()), Ok(()));
    }

    #[test]
    fn unauthorized_commands_leave_pins_untouched() {
        for (actor, placement, expected) in unauthorized_actors() {
            let mut map = editable_map();
            let before = map.clone();
            assert_eq!(on_add_pin(&mut map, &actor, &placement, 5, 5), Err(expected));
            assert_eq!(on_insert_pin(&mut map, &actor, &placement, 0, 5, 5), Err(expected));
            assert_eq!(on_change_pin(&mut map, &actor, &placement, 1, 5, 5), Err(expected));
            assert_eq!(on_remove_pin(&mut map, &actor, &placement, 1), Err(expected));
            assert_eq!(on_clear_pins(&mut map, &actor, &placement), Err(expected));
            assert_eq!(on_toggle_editable(&mut map, &actor, &placement), Err(expected));
            assert_eq!(map, before);
        }
    }

    #[test]
    fn not_editable_blocks_pins_but_not_toggle() {
        let mut map = editable_map();
        map.set_editable(false);
        assert_eq!(
            on_add_pin(&mut map, &owner(), &in_pack(), 1, 1),
            Err(EditDenied::NotEditable)
        );
        assert_eq!(on_toggle_editable(&mut map, &owner(), &in_pack()), Ok(true));
        assert_eq!(on_add_pin(&mut map, &owner(), &in_pack(), 1, 1), Ok(PinEdit::Applied));
    }

    #[test]
    fn add_pin_clamps_and_caps() {
        let mut map = editable_map();
        assert_eq!(
            on_add_pin(&mut map, &owner(), &in_pack(), -40, 900),
            Ok(PinEdit::Applied)
        );
        assert_eq!(map.pins()[2], Point2D::new(0, 199));
        while map.pins().len() < MAX_USER_PINS {
            map.add_pin(1, 1);
        }
        assert_eq!(
            on_add_pin(&mut map, &owner(), &in_pack(), 1, 1),
            Err(EditDenied::PinLimit)
        );
        assert_eq!(
            on_insert_pin(&mut map, &owner(), &in_pack(), 0, 1, 1),
            Err(EditDenied::PinLimit)
        );
        assert_eq!(map.pins().len(), MAX_USER_PINS);
    }

    #[test]
    fn dispatch_discards_commands_for_read_only_maps() {
        let mut map = editable_map();
        map.set_read_only(true);
        let handle = MapHandle::new(MAP_SERIAL, map.clone());
        let command = MapCommand::add_pin(MAP_SERIAL, 3, 3);
        assert_eq!(handle.dispatch(&owner(), &in_pack(), &command), Dispatched::Discarded);
        assert_eq!(*handle.lock(), map);
    }

    #[test]
    fn receive_toggles_and_replies_with_state() {
        let handle = MapHandle::new(MAP_SERIAL, editable_map());
        let toggle = MapCommand::new(MAP_SERIAL, CommandKind::ToggleEditable, 0, 0, 0).encode();
        let reply = handle.receive(&owner(), &in_pack(), &toggle).expect("reply");
        assert_eq!(
            MapCommand::decode(&reply),
            Ok(MapCommand::editable_state(MAP_SERIAL, false))
        );
        assert!(!handle.lock().editable());
    }

    #[test]
    fn receive_applies_edits_silently() {
        let handle = MapHandle::new(MAP_SERIAL, editable_map());
        let change = MapCommand::new(MAP_SERIAL, CommandKind::ChangePin, 1, 50, 60).encode();
        assert_eq!(handle.receive(&owner(), &in_pack(), &change), None);
        assert_eq!(handle.lock().pins()[1], Point2D::new(50, 60));

        let garbage = [0x56, 0x01];
        assert_eq!(handle.receive(&owner(), &in_pack(), &garbage), None);
        assert_eq!(handle.lock().pins().len(), 2);
    }

    #[test]
    fn display_lists_pins_in_order() {
        let handle = MapHandle::new(MAP_SERIAL, editable_map());
        let messages = handle.display_to();
        assert_eq!(messages.len(), 5);
        assert_eq!(MapDisplay::decode(&messages[0]).map(|d| d.width), Ok(200));
        assert_eq!(
            MapCommand::decode(&messages[1]).map(|c| c.kind),
            Ok(CommandKind::ClearPins)
        );
        assert_eq!(
            MapCommand::decode(&messages[3]),
            Ok(MapCommand::add_pin(MAP_SERIAL, 20, 20))
        );
        assert_eq!(
            MapCommand::decode(&messages[4]),
            Ok(MapCommand::editable_state(MAP_SERIAL, true))
        );
    }

    #[test]
    fn concurrent_edits_serialize() {
        let handle = MapHandle::new(MAP_SERIAL, editable_map());
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    let command = MapCommand::add_pin(MAP_SERIAL, i, i);
                    handle.dispatch(&owner(), &in_pack(), &command)
                })
            })
            .collect();
        for thread in threads {
            let outcome = thread.join().expect("join");
            assert_eq!(outcome, Dispatched::Edit(Ok(PinEdit::Applied)));
        }
        assert_eq!(handle.lock().pins().len(), 10);
    }
}
