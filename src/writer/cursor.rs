// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounds-checked cursor over one staged record.
//!
//! The source encoding is unaligned little-endian with `u32` length prefixes
//! before strings, blobs, and dynamic arrays. Every read is bounds-checked:
//! malformed input becomes an error, never an out-of-bounds access.

use crate::core::{Result, TranslateError};
use byteorder::{ByteOrder, LittleEndian};

/// Cursor over a staged record's raw bytes.
pub struct RecordCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> RecordCursor<'a> {
    /// Create a cursor at the start of the staged bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if every byte has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Read a byte slice of exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(TranslateError::buffer_too_short(
                count,
                self.remaining(),
                self.offset,
            ));
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    /// Read a `u32` length/count prefix.
    pub fn read_u32(&mut self) -> Result<u32> {
        if self.remaining() < 4 {
            return Err(TranslateError::buffer_too_short(
                4,
                self.remaining(),
                self.offset,
            ));
        }
        let value = LittleEndian::read_u32(&self.data[self.offset..]);
        self.offset += 4;
        Ok(value)
    }

    /// Read a `u32` length prefix and validate that the claimed payload fits
    /// inside the staged buffer before it is consumed.
    pub fn read_length_prefix(&mut self) -> Result<usize> {
        let position = self.offset;
        let length = self.read_u32()? as usize;
        if length > self.remaining() {
            return Err(TranslateError::length_exceeded(
                length,
                position,
                self.data.len(),
            ));
        }
        Ok(length)
    }

    /// Read a length-prefixed payload: prefix validation plus the bytes.
    pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let length = self.read_length_prefix()?;
        self.read_bytes(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bytes() {
        let data = [1u8, 2, 3, 4, 5];
        let mut cursor = RecordCursor::new(&data);
        assert_eq!(cursor.read_bytes(2).unwrap(), &[1, 2]);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.read_bytes(3).unwrap(), &[3, 4, 5]);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_read_bytes_too_short() {
        let data = [1u8, 2];
        let mut cursor = RecordCursor::new(&data);
        let err = cursor.read_bytes(3).unwrap_err();
        assert!(matches!(err, TranslateError::BufferTooShort { .. }));
        // Position is unchanged after a failed read.
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_read_u32_little_endian() {
        let data = [0x2A, 0x00, 0x00, 0x00, 0xFF];
        let mut cursor = RecordCursor::new(&data);
        assert_eq!(cursor.read_u32().unwrap(), 42);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_read_u32_too_short() {
        let data = [0x2A, 0x00];
        let mut cursor = RecordCursor::new(&data);
        assert!(matches!(
            cursor.read_u32().unwrap_err(),
            TranslateError::BufferTooShort { .. }
        ));
    }

    #[test]
    fn test_read_length_prefix_validates_bounds() {
        // Prefix claims 100 bytes but only 2 follow.
        let data = [0x64, 0x00, 0x00, 0x00, 0xAA, 0xBB];
        let mut cursor = RecordCursor::new(&data);
        let err = cursor.read_length_prefix().unwrap_err();
        match err {
            TranslateError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => {
                assert_eq!(length, 100);
                assert_eq!(position, 0);
                assert_eq!(buffer_len, 6);
            }
            other => panic!("expected LengthExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_read_prefixed_bytes() {
        let data = [0x03, 0x00, 0x00, 0x00, b'f', b'o', b'o'];
        let mut cursor = RecordCursor::new(&data);
        assert_eq!(cursor.read_prefixed_bytes().unwrap(), b"foo");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_empty_prefixed_payload() {
        let data = [0x00, 0x00, 0x00, 0x00];
        let mut cursor = RecordCursor::new(&data);
        assert_eq!(cursor.read_prefixed_bytes().unwrap(), b"");
    }
}
