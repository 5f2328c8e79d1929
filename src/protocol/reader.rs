//! Binary packet reader for the Mist Online 2 protocol
//!
//! Reads little-endian values from byte buffers. Command payloads carry no
//! length prefix; the sub-mode alone determines the shape, so any mismatch
//! surfaces as an out-of-bounds read here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Unexpected end of packet: expected {expected} bytes, only {available} available")]
    UnexpectedEnd { expected: usize, available: usize },
}

pub type ReadResult<T> = Result<T, ReadError>;

/// Binary packet reader that tracks position through a byte buffer.
///
/// All multi-byte integers are read in little-endian format.
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_le {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self) -> ReadResult<$ty> {
            let bytes = self.read_fixed::<{ std::mem::size_of::<$ty>() }>()?;
            Ok(<$ty>::from_le_bytes(bytes))
        }
    };
}

impl<'a> PacketReader<'a> {
    /// Create a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Get the current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if we've reached the end of the packet.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get the total length of the data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Skip a number of bytes.
    pub fn skip(&mut self, count: usize) -> ReadResult<()> {
        if self.pos + count > self.data.len() {
            return Err(ReadError::UnexpectedEnd {
                expected: count,
                available: self.remaining(),
            });
        }
        self.pos += count;
        Ok(())
    }

    /// Read a fixed-size byte array. A failed read does not advance the cursor.
    pub fn read_fixed<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        if self.pos + N > self.data.len() {
            return Err(ReadError::UnexpectedEnd {
                expected: N,
                available: self.remaining(),
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    /// Read a single unsigned byte (u8).
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        if self.pos >= self.data.len() {
            return Err(ReadError::UnexpectedEnd {
                expected: 1,
                available: 0,
            });
        }
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Read a boolean as a single byte (0 = false, anything else = true).
    pub fn read_bool(&mut self) -> ReadResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    read_le!(read_u16, u16);
    read_le!(read_u32, u32);
    read_le!(read_u64, u64);
    read_le!(read_i16, i16);
    read_le!(read_i32, i32);
    read_le!(read_i64, i64);
    read_le!(read_f32, f32);

    /// Read a variable-length byte array.
    pub fn read_bytes(&mut self, len: usize) -> ReadResult<Vec<u8>> {
        if self.pos + len > self.data.len() {
            return Err(ReadError::UnexpectedEnd {
                expected: len,
                available: self.remaining(),
            });
        }
        let bytes = self.data[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(bytes)
    }

    /// Peek at the next byte without consuming it.
    pub fn peek_u8(&self) -> ReadResult<u8> {
        if self.pos >= self.data.len() {
            return Err(ReadError::UnexpectedEnd {
                expected: 1,
                available: 0,
            });
        }
        Ok(self.data[self.pos])
    }

    /// Get a slice of the remaining data.
    pub fn remaining_data(&self) -> &[u8] {
        &self.data[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u8() {
        let data = [0x42, 0xFF, 0x00];
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert_eq!(reader.read_u8().unwrap(), 0x00);
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_read_u16_little_endian() {
        // 0x1234 in little endian is [0x34, 0x12]
        let data = [0x34, 0x12];
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.read_u16().unwrap(), 0x1234);
    }

    #[test]
    fn test_read_u32_little_endian() {
        // 0x12345678 in little endian is [0x78, 0x56, 0x34, 0x12]
        let data = [0x78, 0x56, 0x34, 0x12];
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x12345678);
    }

    #[test]
    fn test_read_i64_little_endian() {
        let data = (-2i64).to_le_bytes();
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.read_i64().unwrap(), -2);
    }

    #[test]
    fn test_read_f32() {
        let data = 12.5f32.to_le_bytes();
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.read_f32().unwrap(), 12.5);
    }

    #[test]
    fn test_read_bool() {
        let data = [0x00, 0x01, 0x7F];
        let mut reader = PacketReader::new(&data);

        assert!(!reader.read_bool().unwrap());
        assert!(reader.read_bool().unwrap());
        assert!(reader.read_bool().unwrap());
        assert!(reader.read_bool().is_err());
    }

    #[test]
    fn test_read_fixed() {
        let data = [1, 2, 3, 4, 5];
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.read_fixed::<3>().unwrap(), [1, 2, 3]);
        assert!(reader.read_fixed::<3>().is_err());
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let data = [0xAA];
        let mut reader = PacketReader::new(&data);

        assert!(reader.read_u32().is_err());
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u8().unwrap(), 0xAA);
    }

    #[test]
    fn test_remaining() {
        let data = [1, 2, 3, 4, 5];
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.remaining(), 5);
        reader.read_u8().unwrap();
        assert_eq!(reader.remaining(), 4);
        reader.read_u16().unwrap();
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_skip_and_peek() {
        let data = [0x10, 0x00, 0xFF];
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.peek_u8().unwrap(), 0x10);
        assert_eq!(reader.position(), 0); // Position unchanged
        reader.skip(2).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert!(reader.skip(1).is_err());
    }
}
