//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// A bit-level reader for decoding packed binary data.
///
/// Bits are consumed least-significant first within each byte, and multi-bit
/// values are assembled least-significant bit first. All read operations are
/// bounds-checked and return errors on failure. The reader never panics on
/// malformed input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Creates a reader positioned `bit_offset` bits into `data`.
    ///
    /// Returns [`BitError::UnexpectedEof`] if the offset lies past the end.
    pub const fn with_bit_offset(data: &'a [u8], bit_offset: usize) -> BitResult<Self> {
        let available = data.len().saturating_mul(8);
        if bit_offset > available {
            return Err(BitError::UnexpectedEof {
                requested: bit_offset,
                available,
            });
        }
        Ok(Self {
            data,
            bit_pos: bit_offset,
        })
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        if self.bits_remaining() == 0 {
            return Err(BitError::UnexpectedEof {
                requested: 1,
                available: 0,
            });
        }
        let byte_idx = self.bit_pos / 8;
        let bit_idx = self.bit_pos % 8;
        let bit = (self.data[byte_idx] >> bit_idx) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads a single-bit boolean flag.
    pub fn read_bool(&mut self) -> BitResult<bool> {
        self.read_bit()
    }

    /// Reads up to 64 bits as an unsigned integer.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(0);
        }
        self.ensure_bits(bits as usize)?;

        let mut value = 0u64;
        for shift in 0..bits {
            value |= u64::from(self.read_bit()?) << shift;
        }
        Ok(value)
    }

    /// Reads up to 32 bits as a `u32`.
    pub fn read_bits_u32(&mut self, bits: u8) -> BitResult<u32> {
        if bits > 32 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 32 });
        }
        #[allow(clippy::cast_possible_truncation)]
        let value = self.read_bits(bits)? as u32;
        Ok(value)
    }

    /// Reads eight bits as a byte, with no alignment requirement.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        #[allow(clippy::cast_possible_truncation)]
        let value = self.read_bits(8)? as u8;
        Ok(value)
    }

    /// Reads a general-purpose bit varint.
    ///
    /// A 6-bit head carries the low nibble; its top two bits select how many
    /// high bits follow (none, 4, 8 or 28).
    pub fn read_ubit_var(&mut self) -> BitResult<u32> {
        let head = self.read_bits_u32(6)?;
        let value = match head & 0x30 {
            0x10 => (head & 0x0F) | (self.read_bits_u32(4)? << 4),
            0x20 => (head & 0x0F) | (self.read_bits_u32(8)? << 4),
            0x30 => (head & 0x0F) | (self.read_bits_u32(28)? << 4),
            _ => head,
        };
        Ok(value)
    }

    /// Reads a field-path bit varint.
    ///
    /// Up to four guard bits pick a 2, 4, 10 or 17 bit payload; when all four
    /// are clear a 31-bit payload follows.
    pub fn read_ubit_var_field_path(&mut self) -> BitResult<u32> {
        for width in [2, 4, 10, 17] {
            if self.read_bool()? {
                return self.read_bits_u32(width);
            }
        }
        self.read_bits_u32(31)
    }

    /// Reads a base-128 varint `u32` (at most five bytes, no alignment).
    ///
    /// A fifth byte that still carries the continuation bit is rejected with
    /// [`BitError::InvalidVarint`] rather than silently truncated.
    pub fn read_varu32(&mut self) -> BitResult<u32> {
        let mut result = 0u32;
        for shift in (0..35).step_by(7) {
            let byte = self.read_byte()?;
            result |= u32::from(byte & 0x7F).wrapping_shl(shift);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(BitError::InvalidVarint)
    }

    /// Reads a zigzag varint `i32`.
    pub fn read_vars32(&mut self) -> BitResult<i32> {
        let value = self.read_varu32()?;
        #[allow(clippy::cast_possible_wrap)]
        let decoded = ((value >> 1) as i32) ^ (-((value & 1) as i32));
        Ok(decoded)
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::UnexpectedEof {
                requested: bits,
                available,
            });
        }
        Ok(())
    }
}
