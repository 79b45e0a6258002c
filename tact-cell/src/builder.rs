//! Cell builder (writer side of the bit-tree codec)

use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};

use crate::address::Address;
use crate::cell::{Bits, Cell};
use crate::error::{CellError, Result};
use crate::{MAX_CELL_BITS, MAX_CELL_REFS};

/// Single-use cell writer.
///
/// Every append checks the full capacity it needs up front, so a failed
/// write leaves the builder untouched. After [`finalize`](Self::finalize)
/// all further calls fail with [`CellError::UseAfterFinalize`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellBuilder {
    bits: Bits,
    refs: Vec<Cell>,
    finalized: bool,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits_used(&self) -> usize {
        self.bits.len()
    }

    pub fn refs_used(&self) -> usize {
        self.refs.len()
    }

    pub fn remaining_bits(&self) -> usize {
        MAX_CELL_BITS - self.bits.len()
    }

    pub fn remaining_refs(&self) -> usize {
        MAX_CELL_REFS - self.refs.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_capacity(&self, bits: usize, refs: usize) -> Result<()> {
        if self.finalized {
            return Err(CellError::UseAfterFinalize);
        }
        if bits > self.remaining_bits() || refs > self.remaining_refs() {
            return Err(CellError::CapacityExceeded {
                bits,
                refs,
                remaining_bits: self.remaining_bits(),
                remaining_refs: self.remaining_refs(),
            });
        }
        Ok(())
    }

    /// Append the low `width` bits of a non-negative magnitude, MSB first.
    /// Callers have already validated that the value fits.
    fn push_magnitude(&mut self, magnitude: &BigInt, width: u16) {
        let (_, digits) = magnitude.to_u32_digits();
        for index in (0..usize::from(width)).rev() {
            let digit = digits.get(index / 32).copied().unwrap_or(0);
            self.bits.push((digit >> (index % 32)) & 1 == 1);
        }
    }

    /// Write an unsigned integer using exactly `width` bits
    pub fn write_uint(&mut self, value: &BigInt, width: u16) -> Result<&mut Self> {
        self.ensure_capacity(usize::from(width), 0)?;
        if !fits_unsigned(value, width) {
            return Err(CellError::WidthViolation {
                value: value.clone(),
                width,
                signed: false,
            });
        }
        self.push_magnitude(value, width);
        Ok(self)
    }

    /// Write a two's-complement signed integer using exactly `width` bits
    pub fn write_int(&mut self, value: &BigInt, width: u16) -> Result<&mut Self> {
        self.ensure_capacity(usize::from(width), 0)?;
        if !fits_signed(value, width) {
            return Err(CellError::WidthViolation {
                value: value.clone(),
                width,
                signed: true,
            });
        }
        if value.sign() == Sign::Minus {
            let wrapped = (BigInt::one() << usize::from(width)) + value;
            self.push_magnitude(&wrapped, width);
        } else {
            self.push_magnitude(value, width);
        }
        Ok(self)
    }

    /// Write a 32-bit unsigned value (message discriminators)
    pub fn write_u32(&mut self, value: u32) -> Result<&mut Self> {
        self.write_uint(&BigInt::from(value), 32)
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<&mut Self> {
        self.ensure_capacity(1, 0)?;
        self.bits.push(bit);
        Ok(self)
    }

    /// Write a standard internal address (267 bits)
    pub fn write_address(&mut self, address: &Address) -> Result<&mut Self> {
        self.ensure_capacity(Address::BIT_LEN, 0)?;
        // addr_std$10 anycast:nothing$0
        self.bits.push(true);
        self.bits.push(false);
        self.bits.push(false);
        let workchain = address.workchain() as u8;
        for shift in (0..8).rev() {
            self.bits.push((workchain >> shift) & 1 == 1);
        }
        for byte in address.hash() {
            for shift in (0..8).rev() {
                self.bits.push((byte >> shift) & 1 == 1);
            }
        }
        Ok(self)
    }

    /// Attach a child cell unconditionally
    pub fn write_ref(&mut self, child: Cell) -> Result<&mut Self> {
        self.ensure_capacity(0, 1)?;
        self.refs.push(child);
        Ok(self)
    }

    /// Write a presence bit, then attach the child when present.
    ///
    /// An absent child costs exactly one bit and no reference slot.
    pub fn write_optional_ref(&mut self, child: Option<Cell>) -> Result<&mut Self> {
        match child {
            Some(child) => {
                self.ensure_capacity(1, 1)?;
                self.bits.push(true);
                self.refs.push(child);
            }
            None => {
                self.ensure_capacity(1, 0)?;
                self.bits.push(false);
            }
        }
        Ok(self)
    }

    /// Freeze the accumulated bits and references into a [`Cell`]
    pub fn finalize(&mut self) -> Result<Cell> {
        if self.finalized {
            return Err(CellError::UseAfterFinalize);
        }
        self.finalized = true;
        let bits = std::mem::take(&mut self.bits);
        let refs = std::mem::take(&mut self.refs);
        Ok(Cell::from_parts(bits, refs))
    }
}

/// Whether `value` is representable as an unsigned `width`-bit integer
pub fn fits_unsigned(value: &BigInt, width: u16) -> bool {
    value.sign() != Sign::Minus && value.bits() <= u64::from(width)
}

/// Whether `value` is representable as a signed `width`-bit integer
pub fn fits_signed(value: &BigInt, width: u16) -> bool {
    if width == 0 {
        return value.is_zero();
    }
    let bound = BigInt::one() << (usize::from(width) - 1);
    let min = -bound.clone();
    let max = bound - BigInt::one();
    *value >= min && *value <= max
}
