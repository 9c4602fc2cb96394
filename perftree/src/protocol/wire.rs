//! Little-endian field reader over a single frame payload.
//!
//! All multi-byte integers on the wire are little-endian. Variable-length
//! fields are `u32`-length-prefixed; a length of `0xFFFF_FFFF` denotes an
//! absent (null) byte array, matching the exporter's serializer. Running
//! out of bytes mid-record is a fatal protocol error: the frame length is
//! known up front, so a short read means the stream is desynchronized.

use crate::domain::ProtocolError;

/// Marker for a null (absent) byte array on the wire.
const NULL_ARRAY: u32 = u32::MAX;

/// Cursor over one frame's payload bytes.
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::TruncatedRecord { needed: n, remaining: self.remaining() });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ProtocolError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, ProtocolError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Length-prefixed raw bytes. A null array decodes as empty.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let len = self.read_u32()?;
        if len == NULL_ARRAY {
            return Ok(Vec::new());
        }
        Ok(self.take(len as usize)?.to_vec())
    }

    /// Length-prefixed UTF-8 bytes, decoded lossily.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Count-prefixed sequence of `i32` values.
    pub fn read_i32_list(&mut self) -> Result<Vec<i32>, ProtocolError> {
        self.read_list(Self::read_i32)
    }

    /// Count-prefixed sequence decoded element-wise with `read_element`.
    pub fn read_list<T>(
        &mut self,
        read_element: impl Fn(&mut Self) -> Result<T, ProtocolError>,
    ) -> Result<Vec<T>, ProtocolError> {
        let count = self.read_u32()? as usize;
        // Every element occupies at least one byte, so a count beyond the
        // remaining payload can never decode.
        if count > self.remaining() {
            return Err(ProtocolError::TruncatedRecord {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read_element(self)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [0x2a, 0xff, 0x01, 0x02, 0x03, 0x04];
        let mut r = WireReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0x2a);
        assert_eq!(r.read_i8().unwrap(), -1);
        assert_eq!(r.read_u32().unwrap(), 0x0403_0201);
        assert!(r.is_empty());
    }

    #[test]
    fn test_read_u64_little_endian() {
        let data = 0x1122_3344_5566_7788_u64.to_le_bytes();
        let mut r = WireReader::new(&data);
        assert_eq!(r.read_u64().unwrap(), 0x1122_3344_5566_7788);
    }

    #[test]
    fn test_read_bytes_with_null_marker() {
        let mut data = vec![0xff, 0xff, 0xff, 0xff];
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(b"abc");
        let mut r = WireReader::new(&data);
        assert_eq!(r.read_bytes().unwrap(), Vec::<u8>::new());
        assert_eq!(r.read_bytes().unwrap(), b"abc".to_vec());
    }

    #[test]
    fn test_read_string_is_lossy() {
        let mut data = 4u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[b'a', 0xff, 0xfe, b'b']);
        let mut r = WireReader::new(&data);
        assert_eq!(r.read_string().unwrap(), "a\u{fffd}\u{fffd}b");
    }

    #[test]
    fn test_truncated_read_is_an_error() {
        let data = [0x01, 0x02];
        let mut r = WireReader::new(&data);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, ProtocolError::TruncatedRecord { needed: 4, remaining: 2 }));
    }

    #[test]
    fn test_list_count_beyond_payload_is_an_error() {
        // Claims 1000 elements with two bytes of payload left.
        let mut data = 1000u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0, 0]);
        let mut r = WireReader::new(&data);
        assert!(r.read_i32_list().is_err());
    }

    #[test]
    fn test_read_i32_list() {
        let mut data = 3u32.to_le_bytes().to_vec();
        for v in [5i32, -1, 7] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut r = WireReader::new(&data);
        assert_eq!(r.read_i32_list().unwrap(), vec![5, -1, 7]);
    }
}
