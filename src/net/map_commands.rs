use crate::cartography::map_item::MapItem;
use crate::net::packet::{PacketReader, PacketWriter};

pub const DISPLAY_OPCODE: u8 = 0x90;
pub const DISPLAY_LEN: usize = 19;
/// Content marker telling the client to draw a map gump.
pub const MAP_CONTENT_MARKER: u16 = 0x139D;

pub const COMMAND_OPCODE: u8 = 0x56;
pub const COMMAND_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    AddPin,
    InsertPin,
    ChangePin,
    RemovePin,
    ClearPins,
    /// client → server only
    ToggleEditable,
    /// server → client only
    EditableState,
}

impl CommandKind {
    pub fn code(self) -> u8 {
        match self {
            CommandKind::AddPin => 1,
            CommandKind::InsertPin => 2,
            CommandKind::ChangePin => 3,
            CommandKind::RemovePin => 4,
            CommandKind::ClearPins => 5,
            CommandKind::ToggleEditable => 6,
            CommandKind::EditableState => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(CommandKind::AddPin),
            2 => Some(CommandKind::InsertPin),
            3 => Some(CommandKind::ChangePin),
            4 => Some(CommandKind::RemovePin),
            5 => Some(CommandKind::ClearPins),
            6 => Some(CommandKind::ToggleEditable),
            7 => Some(CommandKind::EditableState),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    WrongOpcode(u8),
    Truncated { expected: usize, actual: usize },
    UnknownCommand(u8),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::WrongOpcode(opcode) => write!(f, "unexpected opcode 0x{:02X}", opcode),
            DecodeError::Truncated { expected, actual } => {
                write!(f, "message truncated: expected {} bytes, got {}", expected, actual)
            }
            DecodeError::UnknownCommand(code) => write!(f, "unknown map command {}", code),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Opens the map gump: the world window and its grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapDisplay {
    pub serial: u32,
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
    pub width: u16,
    pub height: u16,
}

impl MapDisplay {
    pub fn from_map(serial: u32, map: &MapItem) -> Self {
        let bounds = map.bounds();
        let (width, height) = map.grid_size();
        Self {
            serial,
            x1: saturate_i16(bounds.x),
            y1: saturate_i16(bounds.y),
            x2: saturate_i16(bounds.end_x()),
            y2: saturate_i16(bounds.end_y()),
            width: width.clamp(0, i32::from(u16::MAX)) as u16,
            height: height.clamp(0, i32::from(u16::MAX)) as u16,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = PacketWriter::with_capacity(DISPLAY_LEN);
        writer.write_u8(DISPLAY_OPCODE);
        writer.write_u32_be(self.serial);
        writer.write_u16_be(MAP_CONTENT_MARKER);
        writer.write_i16_be(self.x1);
        writer.write_i16_be(self.y1);
        writer.write_i16_be(self.x2);
        writer.write_i16_be(self.y2);
        writer.write_u16_be(self.width);
        writer.write_u16_be(self.height);
        writer.into_vec()
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        check_frame(data, DISPLAY_OPCODE, DISPLAY_LEN)?;
        let mut reader = PacketReader::new(&data[1..]);
        let truncated = DecodeError::Truncated {
            expected: DISPLAY_LEN,
            actual: data.len(),
        };
        let serial = reader.read_u32_be().ok_or(truncated)?;
        let _marker = reader.read_u16_be().ok_or(truncated)?;
        Ok(Self {
            serial,
            x1: reader.read_i16_be().ok_or(truncated)?,
            y1: reader.read_i16_be().ok_or(truncated)?,
            x2: reader.read_i16_be().ok_or(truncated)?,
            y2: reader.read_i16_be().ok_or(truncated)?,
            width: reader.read_u16_be().ok_or(truncated)?,
            height: reader.read_u16_be().ok_or(truncated)?,
        })
    }
}

/// Pin edit or editable-state message. Fields a command does not use are
/// sent as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapCommand {
    pub serial: u32,
    pub kind: CommandKind,
    pub pin: u8,
    pub x: i16,
    pub y: i16,
}

impl MapCommand {
    pub fn new(serial: u32, kind: CommandKind, pin: u8, x: i16, y: i16) -> Self {
        Self {
            serial,
            kind,
            pin,
            x,
            y,
        }
    }

    pub fn add_pin(serial: u32, x: i32, y: i32) -> Self {
        Self::new(serial, CommandKind::AddPin, 0, saturate_i16(x), saturate_i16(y))
    }

    pub fn clear_pins(serial: u32) -> Self {
        Self::new(serial, CommandKind::ClearPins, 0, 0, 0)
    }

    pub fn editable_state(serial: u32, editable: bool) -> Self {
        Self::new(serial, CommandKind::EditableState, u8::from(editable), 0, 0)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = PacketWriter::with_capacity(COMMAND_LEN);
        writer.write_u8(COMMAND_OPCODE);
        writer.write_u32_be(self.serial);
        writer.write_u8(self.kind.code());
        writer.write_u8(self.pin);
        writer.write_i16_be(self.x);
        writer.write_i16_be(self.y);
        writer.into_vec()
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        check_frame(data, COMMAND_OPCODE, COMMAND_LEN)?;
        let mut reader = PacketReader::new(&data[1..]);
        let truncated = DecodeError::Truncated {
            expected: COMMAND_LEN,
            actual: data.len(),
        };
        let serial = reader.read_u32_be().ok_or(truncated)?;
        let code = reader.read_u8().ok_or(truncated)?;
        let kind = CommandKind::from_code(code).ok_or(DecodeError::UnknownCommand(code))?;
        Ok(Self {
            serial,
            kind,
            pin: reader.read_u8().ok_or(truncated)?,
            x: reader.read_i16_be().ok_or(truncated)?,
            y: reader.read_i16_be().ok_or(truncated)?,
        })
    }
}

fn check_frame(data: &[u8], opcode: u8, len: usize) -> Result<(), DecodeError> {
    let Some(&first) = data.first() else {
        return Err(DecodeError::Truncated {
            expected: len,
            actual: 0,
        });
    };
    if first != opcode {
        return Err(DecodeError::WrongOpcode(first));
    }
    if data.len() < len {
        return Err(DecodeError::Truncated {
            expected: len,
            actual: data.len(),
        });
    }
    Ok(())
}

fn saturate_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
