//! The field-path operation table.
//!
//! Each operation is a small edit to the working path, optionally followed
//! by operands read from the stream. The table order is part of the wire
//! format: a Huffman leaf carries the index of its operation here, and the
//! weights below are what the shared tree is built from.
//!
//! Operand encodings used below:
//!
//! - *fp varint*: [`BitReader::read_ubit_var_field_path`]
//! - *bit varint*: [`BitReader::read_ubit_var`]
//! - *signed varint*: [`BitReader::read_vars32`]
//! - *packed*: a fixed-width [`BitReader::read_bits`] field

use bitstream::{BitReader, BitResult};

use crate::error::FieldPathResult;
use crate::path::FieldPathState;

/// One field-path operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOp {
    PlusOne,
    PlusTwo,
    PlusThree,
    PlusFour,
    PlusN,
    PushOneLeftDeltaZeroRightZero,
    PushOneLeftDeltaZeroRightNonZero,
    PushOneLeftDeltaOneRightZero,
    PushOneLeftDeltaOneRightNonZero,
    PushOneLeftDeltaNRightZero,
    PushOneLeftDeltaNRightNonZero,
    PushOneLeftDeltaNRightNonZeroPack6Bits,
    PushOneLeftDeltaNRightNonZeroPack8Bits,
    PushTwoLeftDeltaZero,
    PushTwoPack5LeftDeltaZero,
    PushThreeLeftDeltaZero,
    PushThreePack5LeftDeltaZero,
    PushTwoLeftDeltaOne,
    PushTwoPack5LeftDeltaOne,
    PushThreeLeftDeltaOne,
    PushThreePack5LeftDeltaOne,
    PushTwoLeftDeltaN,
    PushTwoPack5LeftDeltaN,
    PushThreeLeftDeltaN,
    PushThreePack5LeftDeltaN,
    PushN,
    PushNAndNonTopological,
    PopOnePlusOne,
    PopOnePlusN,
    PopAllButOnePlusOne,
    PopAllButOnePlusN,
    PopAllButOnePlusNPack3Bits,
    PopAllButOnePlusNPack6Bits,
    PopNPlusOne,
    PopNPlusN,
    PopNAndNonTopographical,
    NonTopoComplex,
    NonTopoPenultimatePlusOne,
    NonTopoComplexPack4Bits,
    FieldPathEncodeFinish,
}

/// How the prior increment of a multi-level push is encoded.
#[derive(Clone, Copy)]
enum LeftDelta {
    Zero,
    One,
    N,
}

/// How each new level of a multi-level push is encoded.
#[derive(Clone, Copy)]
enum RightValue {
    Varint,
    Pack5,
}

impl FieldOp {
    /// Number of operations in the table.
    pub const COUNT: usize = 40;

    /// All operations in wire order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::PlusOne,
        Self::PlusTwo,
        Self::PlusThree,
        Self::PlusFour,
        Self::PlusN,
        Self::PushOneLeftDeltaZeroRightZero,
        Self::PushOneLeftDeltaZeroRightNonZero,
        Self::PushOneLeftDeltaOneRightZero,
        Self::PushOneLeftDeltaOneRightNonZero,
        Self::PushOneLeftDeltaNRightZero,
        Self::PushOneLeftDeltaNRightNonZero,
        Self::PushOneLeftDeltaNRightNonZeroPack6Bits,
        Self::PushOneLeftDeltaNRightNonZeroPack8Bits,
        Self::PushTwoLeftDeltaZero,
        Self::PushTwoPack5LeftDeltaZero,
        Self::PushThreeLeftDeltaZero,
        Self::PushThreePack5LeftDeltaZero,
        Self::PushTwoLeftDeltaOne,
        Self::PushTwoPack5LeftDeltaOne,
        Self::PushThreeLeftDeltaOne,
        Self::PushThreePack5LeftDeltaOne,
        Self::PushTwoLeftDeltaN,
        Self::PushTwoPack5LeftDeltaN,
        Self::PushThreeLeftDeltaN,
        Self::PushThreePack5LeftDeltaN,
        Self::PushN,
        Self::PushNAndNonTopological,
        Self::PopOnePlusOne,
        Self::PopOnePlusN,
        Self::PopAllButOnePlusOne,
        Self::PopAllButOnePlusN,
        Self::PopAllButOnePlusNPack3Bits,
        Self::PopAllButOnePlusNPack6Bits,
        Self::PopNPlusOne,
        Self::PopNPlusN,
        Self::PopNAndNonTopographical,
        Self::NonTopoComplex,
        Self::NonTopoPenultimatePlusOne,
        Self::NonTopoComplexPack4Bits,
        Self::FieldPathEncodeFinish,
    ];

    /// Returns the operation for a table index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns this operation's position in the table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the relative frequency the tree is built from.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::PlusOne => 36271,
            Self::PlusTwo => 10334,
            Self::PlusThree => 1375,
            Self::PlusFour => 646,
            Self::PlusN => 4128,
            Self::PushOneLeftDeltaZeroRightZero => 35,
            Self::PushOneLeftDeltaZeroRightNonZero => 3,
            Self::PushOneLeftDeltaOneRightZero => 521,
            Self::PushOneLeftDeltaOneRightNonZero => 2942,
            Self::PushOneLeftDeltaNRightZero => 560,
            Self::PushOneLeftDeltaNRightNonZero => 471,
            Self::PushOneLeftDeltaNRightNonZeroPack6Bits => 10530,
            Self::PushOneLeftDeltaNRightNonZeroPack8Bits => 251,
            Self::PushTwoLeftDeltaZero
            | Self::PushTwoPack5LeftDeltaZero
            | Self::PushThreeLeftDeltaZero
            | Self::PushThreePack5LeftDeltaZero
            | Self::PushTwoLeftDeltaOne
            | Self::PushTwoPack5LeftDeltaOne
            | Self::PushThreeLeftDeltaOne
            | Self::PushThreePack5LeftDeltaOne
            | Self::PushTwoLeftDeltaN
            | Self::PushTwoPack5LeftDeltaN
            | Self::PushThreeLeftDeltaN
            | Self::PushThreePack5LeftDeltaN
            | Self::PushN
            | Self::PopOnePlusN
            | Self::PopNPlusOne
            | Self::PopNPlusN => 0,
            Self::PushNAndNonTopological => 310,
            Self::PopOnePlusOne => 2,
            Self::PopAllButOnePlusOne => 1837,
            Self::PopAllButOnePlusN => 149,
            Self::PopAllButOnePlusNPack3Bits => 300,
            Self::PopAllButOnePlusNPack6Bits => 634,
            Self::PopNAndNonTopographical => 1,
            Self::NonTopoComplex => 76,
            Self::NonTopoPenultimatePlusOne => 271,
            Self::NonTopoComplexPack4Bits => 99,
            Self::FieldPathEncodeFinish => 25474,
        }
    }

    /// Returns the diagnostic name of the operation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlusOne => "PlusOne",
            Self::PlusTwo => "PlusTwo",
            Self::PlusThree => "PlusThree",
            Self::PlusFour => "PlusFour",
            Self::PlusN => "PlusN",
            Self::PushOneLeftDeltaZeroRightZero => "PushOneLeftDeltaZeroRightZero",
            Self::PushOneLeftDeltaZeroRightNonZero => "PushOneLeftDeltaZeroRightNonZero",
            Self::PushOneLeftDeltaOneRightZero => "PushOneLeftDeltaOneRightZero",
            Self::PushOneLeftDeltaOneRightNonZero => "PushOneLeftDeltaOneRightNonZero",
            Self::PushOneLeftDeltaNRightZero => "PushOneLeftDeltaNRightZero",
            Self::PushOneLeftDeltaNRightNonZero => "PushOneLeftDeltaNRightNonZero",
            Self::PushOneLeftDeltaNRightNonZeroPack6Bits => {
                "PushOneLeftDeltaNRightNonZeroPack6Bits"
            }
            Self::PushOneLeftDeltaNRightNonZeroPack8Bits => {
                "PushOneLeftDeltaNRightNonZeroPack8Bits"
            }
            Self::PushTwoLeftDeltaZero => "PushTwoLeftDeltaZero",
            Self::PushTwoPack5LeftDeltaZero => "PushTwoPack5LeftDeltaZero",
            Self::PushThreeLeftDeltaZero => "PushThreeLeftDeltaZero",
            Self::PushThreePack5LeftDeltaZero => "PushThreePack5LeftDeltaZero",
            Self::PushTwoLeftDeltaOne => "PushTwoLeftDeltaOne",
            Self::PushTwoPack5LeftDeltaOne => "PushTwoPack5LeftDeltaOne",
            Self::PushThreeLeftDeltaOne => "PushThreeLeftDeltaOne",
            Self::PushThreePack5LeftDeltaOne => "PushThreePack5LeftDeltaOne",
            Self::PushTwoLeftDeltaN => "PushTwoLeftDeltaN",
            Self::PushTwoPack5LeftDeltaN => "PushTwoPack5LeftDeltaN",
            Self::PushThreeLeftDeltaN => "PushThreeLeftDeltaN",
            Self::PushThreePack5LeftDeltaN => "PushThreePack5LeftDeltaN",
            Self::PushN => "PushN",
            Self::PushNAndNonTopological => "PushNAndNonTopological",
            Self::PopOnePlusOne => "PopOnePlusOne",
            Self::PopOnePlusN => "PopOnePlusN",
            Self::PopAllButOnePlusOne => "PopAllButOnePlusOne",
            Self::PopAllButOnePlusN => "PopAllButOnePlusN",
            Self::PopAllButOnePlusNPack3Bits => "PopAllButOnePlusNPack3Bits",
            Self::PopAllButOnePlusNPack6Bits => "PopAllButOnePlusNPack6Bits",
            Self::PopNPlusOne => "PopNPlusOne",
            Self::PopNPlusN => "PopNPlusN",
            Self::PopNAndNonTopographical => "PopNAndNonTopographical",
            Self::NonTopoComplex => "NonTopoComplex",
            Self::NonTopoPenultimatePlusOne => "NonTopoPenultimatePlusOne",
            Self::NonTopoComplexPack4Bits => "NonTopoComplexPack4Bits",
            Self::FieldPathEncodeFinish => "FieldPathEncodeFinish",
        }
    }

    /// Returns the weights of all operations in wire order.
    #[must_use]
    pub fn weights() -> [u32; Self::COUNT] {
        Self::ALL.map(Self::weight)
    }

    /// Returns `true` for the operation that ends a chunk.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::FieldPathEncodeFinish)
    }

    /// Applies the operation to `state`, reading its operands from `reader`.
    pub(crate) fn apply(
        self,
        reader: &mut BitReader<'_>,
        state: &mut FieldPathState,
    ) -> FieldPathResult<()> {
        match self {
            Self::PlusOne => state.add_top(1),
            Self::PlusTwo => state.add_top(2),
            Self::PlusThree => state.add_top(3),
            Self::PlusFour => state.add_top(4),
            Self::PlusN => state.add_top(fp_var(reader)?.wrapping_add(5)),

            Self::PushOneLeftDeltaZeroRightZero => state.push(self, 0)?,
            Self::PushOneLeftDeltaZeroRightNonZero => state.push(self, fp_var(reader)?)?,
            Self::PushOneLeftDeltaOneRightZero => {
                state.add_top(1);
                state.push(self, 0)?;
            }
            Self::PushOneLeftDeltaOneRightNonZero => {
                state.add_top(1);
                state.push(self, fp_var(reader)?)?;
            }
            Self::PushOneLeftDeltaNRightZero => {
                state.add_top(fp_var(reader)?);
                state.push(self, 0)?;
            }
            Self::PushOneLeftDeltaNRightNonZero => {
                state.add_top(fp_var(reader)?.wrapping_add(2));
                state.push(self, fp_var(reader)?.wrapping_add(1))?;
            }
            Self::PushOneLeftDeltaNRightNonZeroPack6Bits => {
                state.add_top(packed(reader, 3)? + 2);
                state.push(self, packed(reader, 3)? + 1)?;
            }
            Self::PushOneLeftDeltaNRightNonZeroPack8Bits => {
                state.add_top(packed(reader, 4)? + 2);
                state.push(self, packed(reader, 4)? + 1)?;
            }

            Self::PushTwoLeftDeltaZero => {
                self.push_many(reader, state, LeftDelta::Zero, RightValue::Varint, 2)?;
            }
            Self::PushTwoPack5LeftDeltaZero => {
                self.push_many(reader, state, LeftDelta::Zero, RightValue::Pack5, 2)?;
            }
            Self::PushThreeLeftDeltaZero => {
                self.push_many(reader, state, LeftDelta::Zero, RightValue::Varint, 3)?;
            }
            Self::PushThreePack5LeftDeltaZero => {
                self.push_many(reader, state, LeftDelta::Zero, RightValue::Pack5, 3)?;
            }
            Self::PushTwoLeftDeltaOne => {
                self.push_many(reader, state, LeftDelta::One, RightValue::Varint, 2)?;
            }
            Self::PushTwoPack5LeftDeltaOne => {
                self.push_many(reader, state, LeftDelta::One, RightValue::Pack5, 2)?;
            }
            Self::PushThreeLeftDeltaOne => {
                self.push_many(reader, state, LeftDelta::One, RightValue::Varint, 3)?;
            }
            Self::PushThreePack5LeftDeltaOne => {
                self.push_many(reader, state, LeftDelta::One, RightValue::Pack5, 3)?;
            }
            Self::PushTwoLeftDeltaN => {
                self.push_many(reader, state, LeftDelta::N, RightValue::Varint, 2)?;
            }
            Self::PushTwoPack5LeftDeltaN => {
                self.push_many(reader, state, LeftDelta::N, RightValue::Pack5, 2)?;
            }
            Self::PushThreeLeftDeltaN => {
                self.push_many(reader, state, LeftDelta::N, RightValue::Varint, 3)?;
            }
            Self::PushThreePack5LeftDeltaN => {
                self.push_many(reader, state, LeftDelta::N, RightValue::Pack5, 3)?;
            }

            Self::PushN => {
                let count = reader.read_ubit_var()?;
                state.add_top(bit_var(reader)?);
                for _ in 0..count {
                    state.push(self, fp_var(reader)?)?;
                }
            }
            Self::PushNAndNonTopological => {
                for level in 0..=state.cursor() {
                    if reader.read_bool()? {
                        state.add_at(level, reader.read_vars32()?.wrapping_add(1));
                    }
                }
                let count = reader.read_ubit_var()?;
                for _ in 0..count {
                    state.push(self, fp_var(reader)?)?;
                }
            }

            Self::PopOnePlusOne => {
                state.pop(self, 1)?;
                state.add_top(1);
            }
            Self::PopOnePlusN => {
                state.pop(self, 1)?;
                state.add_top(fp_var(reader)?.wrapping_add(1));
            }
            Self::PopAllButOnePlusOne => {
                state.pop_all_but_one();
                state.add_top(1);
            }
            Self::PopAllButOnePlusN => {
                state.pop_all_but_one();
                state.add_top(fp_var(reader)?.wrapping_add(1));
            }
            Self::PopAllButOnePlusNPack3Bits => {
                state.pop_all_but_one();
                state.add_top(packed(reader, 3)? + 1);
            }
            Self::PopAllButOnePlusNPack6Bits => {
                state.pop_all_but_one();
                state.add_top(packed(reader, 6)? + 1);
            }
            Self::PopNPlusOne => {
                state.pop(self, fp_count(reader)?)?;
                state.add_top(1);
            }
            Self::PopNPlusN => {
                state.pop(self, fp_count(reader)?)?;
                state.add_top(reader.read_vars32()?);
            }
            Self::PopNAndNonTopographical => {
                state.pop(self, fp_count(reader)?)?;
                non_topo(reader, state, |r| r.read_vars32())?;
            }

            Self::NonTopoComplex => non_topo(reader, state, |r| r.read_vars32())?,
            Self::NonTopoPenultimatePlusOne => state.add_penultimate(self, 1)?,
            Self::NonTopoComplexPack4Bits => {
                non_topo(reader, state, |r| Ok(packed(r, 4)? - 7))?;
            }

            Self::FieldPathEncodeFinish => state.finish(),
        }
        Ok(())
    }

    fn push_many(
        self,
        reader: &mut BitReader<'_>,
        state: &mut FieldPathState,
        left: LeftDelta,
        right: RightValue,
        levels: usize,
    ) -> FieldPathResult<()> {
        match left {
            LeftDelta::Zero => {}
            LeftDelta::One => state.add_top(1),
            LeftDelta::N => state.add_top(bit_var(reader)?.wrapping_add(2)),
        }
        for _ in 0..levels {
            let value = match right {
                RightValue::Varint => fp_var(reader)?,
                RightValue::Pack5 => packed(reader, 5)?,
            };
            state.push(self, value)?;
        }
        Ok(())
    }
}

/// Adds a guarded delta to every active level.
fn non_topo(
    reader: &mut BitReader<'_>,
    state: &mut FieldPathState,
    mut delta: impl FnMut(&mut BitReader<'_>) -> BitResult<i32>,
) -> FieldPathResult<()> {
    for level in 0..=state.cursor() {
        if reader.read_bool()? {
            state.add_at(level, delta(reader)?);
        }
    }
    Ok(())
}

// fp varints carry at most 31 bits, so the cast is lossless.
#[allow(clippy::cast_possible_wrap)]
fn fp_var(reader: &mut BitReader<'_>) -> BitResult<i32> {
    Ok(reader.read_ubit_var_field_path()? as i32)
}

fn fp_count(reader: &mut BitReader<'_>) -> BitResult<usize> {
    Ok(reader.read_ubit_var_field_path()? as usize)
}

#[allow(clippy::cast_possible_wrap)]
fn bit_var(reader: &mut BitReader<'_>) -> BitResult<i32> {
    Ok(reader.read_ubit_var()? as i32)
}

#[allow(clippy::cast_possible_wrap)]
fn packed(reader: &mut BitReader<'_>, bits: u8) -> BitResult<i32> {
    Ok(reader.read_bits_u32(bits)? as i32)
}
