#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let bytes = self.read_array::<1>()?;
        Some(bytes[0])
    }

    pub fn read_u16_be(&mut self) -> Option<u16> {
        self.read_array::<2>().map(u16::from_be_bytes)
    }

    pub fn read_i16_be(&mut self) -> Option<i16> {
        self.read_array::<2>().map(i16::from_be_bytes)
    }

    pub fn read_u32_be(&mut self) -> Option<u32> {
        self.read_array::<4>().map(u32::from_be_bytes)
    }

    pub fn read_u32_le(&mut self) -> Option<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    pub fn read_i32_le(&mut self) -> Option<i32> {
        self.read_array::<4>().map(i32::from_le_bytes)
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.remaining() < len {
            return None;
        }
        let start = self.pos;
        self.pos += len;
        Some(&self.data[start..start + len])
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Some(out)
    }
}

#[derive(Debug, Default, Clone)]
pub struct PacketWriter {
    data: Vec<u8>,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_u16_be(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i16_be(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32_be(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32_le(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_layout_matches_wire_order() {
        let mut writer = PacketWriter::new();
        writer.write_u32_be(0x4000_1234);
        writer.write_i16_be(-2);
        assert_eq!(writer.as_slice(), &[0x40, 0x00, 0x12, 0x34, 0xFF, 0xFE]);
        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_u32_be(), Some(0x4000_1234));
        assert_eq!(reader.read_i16_be(), Some(-2));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn little_endian_layout_for_files() {
        let mut writer = PacketWriter::new();
        writer.write_i32_le(-1);
        writer.write_u32_le(0x0102_0304);
        assert_eq!(writer.as_slice(), &[0xFF, 0xFF, 0xFF, 0xFF, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn short_reads_leave_position_untouched() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = PacketReader::new(&data);
        assert_eq!(reader.read_u32_be(), None);
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.read_u16_be(), Some(0x0102));
        assert_eq!(reader.read_u16_be(), None);
        assert_eq!(reader.read_u8(), Some(0x03));
    }
}
