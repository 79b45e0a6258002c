//! Cell slice (reader side of the bit-tree codec)

use bitvec::prelude::*;
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

use crate::address::Address;
use crate::cell::Cell;
use crate::error::{CellError, Result};

/// Read cursor over a [`Cell`].
///
/// The bit offset and reference index only move forward. A failed read
/// leaves both untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct CellSlice {
    cell: Cell,
    bit_offset: usize,
    ref_offset: usize,
}

impl CellSlice {
    pub fn new(cell: Cell) -> Self {
        Self {
            cell,
            bit_offset: 0,
            ref_offset: 0,
        }
    }

    /// The underlying cell, independent of the cursor position
    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn into_cell(self) -> Cell {
        self.cell
    }

    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_offset
    }

    pub fn remaining_refs(&self) -> usize {
        self.cell.refs().len() - self.ref_offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    fn ensure_remaining(&self, bits: usize, refs: usize) -> Result<()> {
        if bits > self.remaining_bits() || refs > self.remaining_refs() {
            return Err(CellError::Underflow {
                bits,
                refs,
                remaining_bits: self.remaining_bits(),
                remaining_refs: self.remaining_refs(),
            });
        }
        Ok(())
    }

    fn window(&self, offset: usize, len: usize) -> &BitSlice<u8, Msb0> {
        let start = self.bit_offset + offset;
        &self.cell.bits()[start..start + len]
    }

    fn load_magnitude(bits: &BitSlice<u8, Msb0>) -> BigInt {
        let mut value = BigInt::zero();
        for bit in bits.iter().by_vals() {
            value <<= 1usize;
            if bit {
                value += 1u8;
            }
        }
        value
    }

    /// Read the next `width` bits as an unsigned integer without advancing
    pub fn peek_uint(&self, width: u16) -> Result<BigInt> {
        let width = usize::from(width);
        self.ensure_remaining(width, 0)?;
        Ok(Self::load_magnitude(self.window(0, width)))
    }

    pub fn read_uint(&mut self, width: u16) -> Result<BigInt> {
        let value = self.peek_uint(width)?;
        self.bit_offset += usize::from(width);
        Ok(value)
    }

    /// Read a two's-complement signed integer of `width` bits
    pub fn read_int(&mut self, width: u16) -> Result<BigInt> {
        let raw = self.peek_uint(width)?;
        let sign_set = width > 0 && self.window(0, 1)[0];
        self.bit_offset += usize::from(width);
        if sign_set {
            Ok(raw - (BigInt::one() << usize::from(width)))
        } else {
            Ok(raw)
        }
    }

    /// Read a 32-bit unsigned value (message discriminators)
    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.read_uint(32)?;
        // 32 bits always fit
        Ok(value.to_u32().unwrap_or_default())
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        self.ensure_remaining(1, 0)?;
        let bit = self.window(0, 1)[0];
        self.bit_offset += 1;
        Ok(bit)
    }

    /// Read a standard internal address (267 bits)
    pub fn read_address(&mut self) -> Result<Address> {
        self.ensure_remaining(Address::BIT_LEN, 0)?;
        let bits = self.window(0, Address::BIT_LEN);

        let tag = bits[..2].load_be::<u8>();
        let anycast = bits[2];
        if tag != 0b10 || anycast {
            return Err(CellError::UnsupportedAddress { tag, anycast });
        }

        let workchain = bits[3..11].load_be::<u8>() as i8;
        let mut hash = [0u8; 32];
        for (byte, chunk) in hash.iter_mut().zip(bits[11..].chunks(8)) {
            *byte = chunk.load_be::<u8>();
        }

        self.bit_offset += Address::BIT_LEN;
        Ok(Address::new(workchain, hash))
    }

    /// Take the next reference and return a fresh slice over it
    pub fn read_ref(&mut self) -> Result<CellSlice> {
        self.ensure_remaining(0, 1)?;
        let child = self.cell.refs()[self.ref_offset].clone();
        self.ref_offset += 1;
        Ok(child.slice())
    }

    /// Read a presence bit; when set, take the next reference.
    ///
    /// An absent value leaves the reference index where it was.
    pub fn read_optional_ref(&mut self) -> Result<Option<CellSlice>> {
        self.ensure_remaining(1, 0)?;
        if !self.window(0, 1)[0] {
            self.bit_offset += 1;
            return Ok(None);
        }
        self.ensure_remaining(1, 1)?;
        self.bit_offset += 1;
        let child = self.cell.refs()[self.ref_offset].clone();
        self.ref_offset += 1;
        Ok(Some(child.slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellBuilder;

    fn sample_address() -> Address {
        let mut hash = [0u8; 32];
        hash[0] = 0xAB;
        hash[31] = 0x01;
        Address::new(-1, hash)
    }

    #[test]
    fn test_read_mirrors_write() {
        let child = CellBuilder::new().finalize().unwrap();
        let mut builder = CellBuilder::new();
        builder
            .write_uint(&BigInt::from(42), 16)
            .unwrap()
            .write_int(&BigInt::from(-7), 9)
            .unwrap()
            .write_bit(true)
            .unwrap()
            .write_address(&sample_address())
            .unwrap()
            .write_optional_ref(None)
            .unwrap()
            .write_optional_ref(Some(child.clone()))
            .unwrap();
        let cell = builder.finalize().unwrap();

        let mut slice = cell.slice();
        assert_eq!(slice.read_uint(16).unwrap(), BigInt::from(42));
        assert_eq!(slice.read_int(9).unwrap(), BigInt::from(-7));
        assert!(slice.read_bit().unwrap());
        assert_eq!(slice.read_address().unwrap(), sample_address());
        assert!(slice.read_optional_ref().unwrap().is_none());
        assert_eq!(slice.remaining_refs(), 1);
        let nested = slice.read_optional_ref().unwrap().unwrap();
        assert_eq!(nested.cell(), &child);
        assert!(slice.is_exhausted());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut builder = CellBuilder::new();
        builder.write_u32(0xDEADBEEF).unwrap();
        let cell = builder.finalize().unwrap();

        let mut slice = cell.slice();
        assert_eq!(slice.peek_uint(32).unwrap(), BigInt::from(0xDEADBEEFu32));
        assert_eq!(slice.remaining_bits(), 32);
        assert_eq!(slice.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(slice.remaining_bits(), 0);
    }

    #[test]
    fn test_underflow_keeps_cursor() {
        let mut builder = CellBuilder::new();
        builder.write_uint(&BigInt::from(3), 2).unwrap();
        let cell = builder.finalize().unwrap();

        let mut slice = cell.slice();
        let err = slice.read_uint(3).unwrap_err();
        assert_eq!(
            err,
            CellError::Underflow {
                bits: 3,
                refs: 0,
                remaining_bits: 2,
                remaining_refs: 0
            }
        );
        assert!(matches!(slice.read_ref(), Err(CellError::Underflow { refs: 1, .. })));
        assert_eq!(slice.read_uint(2).unwrap(), BigInt::from(3));
    }

    #[test]
    fn test_optional_ref_presence_without_reference_underflows() {
        // presence bit set but no reference attached
        let mut builder = CellBuilder::new();
        builder.write_bit(true).unwrap();
        let cell = builder.finalize().unwrap();

        let mut slice = cell.slice();
        assert!(matches!(
            slice.read_optional_ref(),
            Err(CellError::Underflow { refs: 1, .. })
        ));
        assert_eq!(slice.remaining_bits(), 1);
    }

    #[test]
    fn test_non_standard_address_rejected() {
        // addr_none$00 followed by padding
        let mut builder = CellBuilder::new();
        builder.write_uint(&BigInt::zero(), 2).unwrap();
        builder.write_uint(&BigInt::zero(), 265).unwrap();
        let cell = builder.finalize().unwrap();

        let mut slice = cell.slice();
        assert_eq!(
            slice.read_address().unwrap_err(),
            CellError::UnsupportedAddress {
                tag: 0,
                anycast: false
            }
        );
        assert_eq!(slice.remaining_bits(), 267);
    }

    #[test]
    fn test_read_int_extremes() {
        let min = -(BigInt::one() << 256usize);
        let max = (BigInt::one() << 256usize) - BigInt::one();
        let mut builder = CellBuilder::new();
        builder.write_int(&min, 257).unwrap();
        builder.write_int(&max, 257).unwrap();
        builder.write_int(&BigInt::zero(), 257).unwrap();
        let cell = builder.finalize().unwrap();

        let mut slice = cell.slice();
        assert_eq!(slice.read_int(257).unwrap(), min);
        assert_eq!(slice.read_int(257).unwrap(), max);
        assert_eq!(slice.read_int(257).unwrap(), BigInt::zero());
    }
}
