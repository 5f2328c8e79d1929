//! Binary packet writer for the Mist Online 2 protocol
//!
//! Writes little-endian values and null-terminated strings to byte buffers.

/// Binary packet writer that builds byte buffers.
///
/// All multi-byte integers are written in little-endian format.
/// Strings are null-terminated (C-style).
pub struct PacketWriter {
    buffer: Vec<u8>,
}

impl PacketWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    /// Create a new writer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Get the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Write a single unsigned byte (u8).
    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    /// Write an unsigned 16-bit integer (little-endian).
    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write an unsigned 32-bit integer (little-endian).
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write an unsigned 64-bit integer (little-endian).
    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a signed 16-bit integer (little-endian).
    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a signed 32-bit integer (little-endian).
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a signed 64-bit integer (little-endian).
    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 32-bit floating point number (little-endian).
    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a null-terminated string.
    ///
    /// Appends the string bytes followed by a null byte (0x00).
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0); // Null terminator
        self
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    /// Write a boolean as a single byte (0 or 1).
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buffer.push(if value { 1 } else { 0 });
        self
    }

    /// Consume the writer and return the built buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the internal buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl From<PacketWriter> for Vec<u8> {
    fn from(writer: PacketWriter) -> Self {
        writer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_u8() {
        let mut writer = PacketWriter::new();
        writer.write_u8(0x42);
        writer.write_u8(0xFF);

        assert_eq!(writer.as_bytes(), &[0x42, 0xFF]);
    }

    #[test]
    fn test_write_u16_little_endian() {
        let mut writer = PacketWriter::new();
        writer.write_u16(0x1234);

        // Little endian: least significant byte first
        assert_eq!(writer.as_bytes(), &[0x34, 0x12]);
    }

    #[test]
    fn test_write_i64_little_endian() {
        let mut writer = PacketWriter::new();
        writer.write_i64(-2);

        assert_eq!(writer.as_bytes(), &(-2i64).to_le_bytes());
    }

    #[test]
    fn test_write_f32() {
        let mut writer = PacketWriter::new();
        writer.write_f32(0.75);

        assert_eq!(writer.as_bytes(), &0.75f32.to_le_bytes());
    }

    #[test]
    fn test_write_bool() {
        let mut writer = PacketWriter::new();
        writer.write_bool(true);
        writer.write_bool(false);

        assert_eq!(writer.as_bytes(), &[1, 0]);
    }

    #[test]
    fn test_write_string() {
        let mut writer = PacketWriter::new();
        writer.write_string("Hello");

        // String bytes + null terminator
        assert_eq!(writer.as_bytes(), b"Hello\x00");
    }

    #[test]
    fn test_chained_writes() {
        let mut writer = PacketWriter::new();
        writer.write_u16(10).write_u8(2).write_i32(12345);

        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 2 + 1 + 4);
    }
}
