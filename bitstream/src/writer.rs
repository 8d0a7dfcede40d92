//! Bit-level writer for encoding packed binary data.

use crate::error::{BitError, BitResult};

/// A bit-level writer mirroring [`BitReader`](crate::BitReader).
///
/// Writes are accumulated in an internal buffer, least-significant bit first.
/// Call [`finish`](Self::finish) to get the final byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// The accumulated bytes.
    bytes: Vec<u8>,
    /// Current byte being written (not yet pushed to bytes).
    current_byte: u8,
    /// Number of bits written to `current_byte` (0-7).
    bit_count: u8,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Writes a single bit.
    pub fn write_bool(&mut self, value: bool) {
        self.current_byte |= u8::from(value) << self.bit_count;
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Writes up to 64 bits from an unsigned integer, low bit first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 64 && value >= (1u64 << bits) {
            return Err(BitError::ValueOutOfRange { value, bits });
        }

        for i in 0..bits {
            self.write_bool((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Writes a general-purpose bit varint (see
    /// [`BitReader::read_ubit_var`](crate::BitReader::read_ubit_var)).
    pub fn write_ubit_var(&mut self, value: u32) -> BitResult<()> {
        let low = u64::from(value & 0x0F);
        let high = u64::from(value >> 4);
        match high {
            0 => self.write_bits(low, 6),
            1..=0x0F => {
                self.write_bits(low | 0x10, 6)?;
                self.write_bits(high, 4)
            }
            0x10..=0xFF => {
                self.write_bits(low | 0x20, 6)?;
                self.write_bits(high, 8)
            }
            _ => {
                self.write_bits(low | 0x30, 6)?;
                self.write_bits(high, 28)
            }
        }
    }

    /// Writes a field-path bit varint (see
    /// [`BitReader::read_ubit_var_field_path`](crate::BitReader::read_ubit_var_field_path)).
    ///
    /// # Errors
    ///
    /// Returns [`BitError::ValueOutOfRange`] if `value` needs more than 31 bits.
    pub fn write_ubit_var_field_path(&mut self, value: u32) -> BitResult<()> {
        for width in [2u8, 4, 10, 17] {
            if value < (1u32 << width) {
                self.write_bool(true);
                return self.write_bits(u64::from(value), width);
            }
            self.write_bool(false);
        }
        self.write_bits(u64::from(value), 31)
    }

    /// Writes a base-128 varint `u32`.
    pub fn write_varu32(&mut self, mut value: u32) -> BitResult<()> {
        while value >= 0x80 {
            self.write_bits(u64::from(value & 0x7F) | 0x80, 8)?;
            value >>= 7;
        }
        self.write_bits(u64::from(value), 8)
    }

    /// Writes a zigzag varint `i32`.
    pub fn write_vars32(&mut self, value: i32) -> BitResult<()> {
        #[allow(clippy::cast_sign_loss)]
        let encoded = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varu32(encoded)
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// If the last byte is incomplete, its unused high bits are zero.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bytes.push(self.current_byte);
        }
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let writer = BitWriter::new();
        assert_eq!(writer.bits_written(), 0);
        let bytes = writer.finish();
        assert!(bytes.is_empty());
    }

    #[test]
    fn write_single_bit_true() {
        let mut writer = BitWriter::new();
        writer.write_bool(true);
        assert_eq!(writer.bits_written(), 1);
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b0000_0001]);
    }

    #[test]
    fn write_partial_byte() {
        let mut writer = BitWriter::new();
        // Write 5 bits in order: 1, 1, 0, 1, 0
        writer.write_bool(true);
        writer.write_bool(true);
        writer.write_bool(false);
        writer.write_bool(true);
        writer.write_bool(false);
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b0000_1011]);
    }

    #[test]
    fn write_bits_zero() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 0).unwrap();
        assert_eq!(writer.bits_written(), 0);
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn write_bits_multiple_bytes_little_endian() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xABCD, 16).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0xCD, 0xAB]);
    }

    #[test]
    fn write_bits_across_byte_boundary() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1111, 4).unwrap();
        writer.write_bits(0b1010_1010, 8).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1010_1111, 0b0000_1010]);
    }

    #[test]
    fn write_bits_invalid_count() {
        let mut writer = BitWriter::new();
        let result = writer.write_bits(0, 65);
        assert!(matches!(
            result,
            Err(BitError::InvalidBitCount {
                bits: 65,
                max_bits: 64
            })
        ));
    }

    #[test]
    fn write_bits_value_out_of_range() {
        let mut writer = BitWriter::new();
        let result = writer.write_bits(256, 8);
        assert!(matches!(
            result,
            Err(BitError::ValueOutOfRange {
                value: 256,
                bits: 8
            })
        ));
    }

    #[test]
    fn write_ubit_var_matches_reader_layout() {
        let mut writer = BitWriter::new();
        writer.write_ubit_var(300).unwrap();
        assert_eq!(writer.bits_written(), 14);
        assert_eq!(writer.finish(), vec![0xAC, 0x04]);
    }

    #[test]
    fn write_ubit_var_field_path_rejects_32_bits() {
        let mut writer = BitWriter::new();
        let err = writer.write_ubit_var_field_path(u32::MAX).unwrap_err();
        assert!(matches!(err, BitError::ValueOutOfRange { bits: 31, .. }));
    }

    #[test]
    fn write_varu32_bytes() {
        let mut writer = BitWriter::new();
        writer.write_varu32(300).unwrap();
        assert_eq!(writer.finish(), vec![0xAC, 0x02]);
    }

    #[test]
    fn write_vars32_negative_one() {
        let mut writer = BitWriter::new();
        writer.write_vars32(-1).unwrap();
        assert_eq!(writer.finish(), vec![0x01]);
    }

    #[test]
    fn writer_default() {
        let writer = BitWriter::default();
        assert_eq!(writer.bits_written(), 0);
    }
}
