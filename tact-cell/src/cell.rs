//! Immutable bit-tree cell

use bitvec::prelude::*;
use std::fmt;
use std::sync::Arc;

use crate::slice::CellSlice;

/// Bit storage used by cells and builders (most significant bit first)
pub type Bits = BitVec<u8, Msb0>;

/// Immutable cell: up to 1023 data bits and up to 4 child cells.
///
/// Cloning is cheap; the data is shared behind an `Arc`. Equality is
/// structural, comparing bits and children recursively.
#[derive(Clone, PartialEq, Eq)]
pub struct Cell {
    inner: Arc<CellData>,
}

#[derive(Debug, PartialEq, Eq)]
struct CellData {
    bits: Bits,
    refs: Vec<Cell>,
}

impl Cell {
    /// Only [`CellBuilder::finalize`](crate::CellBuilder::finalize) creates
    /// cells, so the capacity invariants hold by construction.
    pub(crate) fn from_parts(bits: Bits, refs: Vec<Cell>) -> Self {
        debug_assert!(bits.len() <= crate::MAX_CELL_BITS);
        debug_assert!(refs.len() <= crate::MAX_CELL_REFS);
        Self {
            inner: Arc::new(CellData { bits, refs }),
        }
    }

    /// The empty cell (no bits, no references)
    pub fn empty() -> Self {
        Self::from_parts(Bits::new(), Vec::new())
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.inner.bits
    }

    pub fn bit_len(&self) -> usize {
        self.inner.bits.len()
    }

    pub fn refs(&self) -> &[Cell] {
        &self.inner.refs
    }

    pub fn reference(&self, index: usize) -> Option<&Cell> {
        self.inner.refs.get(index)
    }

    /// Longest path to a leaf; a cell without references has depth 0
    pub fn depth(&self) -> usize {
        self.inner
            .refs
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Start reading this cell from the first bit and first reference
    pub fn slice(&self) -> CellSlice {
        CellSlice::new(self.clone())
    }

    /// Whether two handles point to the same allocation
    pub fn ptr_eq(&self, other: &Cell) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Hex rendering of the data bits.
    ///
    /// Bit strings that do not end on a nibble boundary are completed with a
    /// single `1` bit followed by zeros and marked with a trailing `_`.
    pub fn to_hex(&self) -> String {
        let bits = self.bits();
        let mut padded: Bits = bits.to_bitvec();
        let complete = bits.len() % 4 == 0;
        if !complete {
            padded.push(true);
            while padded.len() % 4 != 0 {
                padded.push(false);
            }
        }

        let mut out = String::with_capacity(padded.len() / 4 + 1);
        for nibble in padded.chunks(4) {
            let value = nibble.load_be::<u8>();
            out.push(char::from_digit(u32::from(value), 16).unwrap_or('?').to_ascii_uppercase());
        }
        if !complete {
            out.push('_');
        }
        out
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(f, "{:indent$}x{{{}}}", "", self.to_hex(), indent = indent)?;
        for child in self.refs() {
            child.fmt_tree(f, indent + 1)?;
        }
        Ok(())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell(x{{{}}}", self.to_hex())?;
        if !self.refs().is_empty() {
            write!(f, ", refs: {:?}", self.refs())?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellBuilder;

    #[test]
    fn test_empty_cell() {
        let cell = Cell::empty();
        assert_eq!(cell.bit_len(), 0);
        assert!(cell.refs().is_empty());
        assert_eq!(cell.depth(), 0);
        assert_eq!(cell.to_hex(), "");
    }

    #[test]
    fn test_hex_rendering_with_completion_tag() {
        let mut builder = CellBuilder::new();
        builder.write_u32(3067051791).unwrap();
        let cell = builder.finalize().unwrap();
        assert_eq!(cell.to_hex(), "B6CF7F0F");

        let mut builder = CellBuilder::new();
        builder.write_bit(true).unwrap();
        let cell = builder.finalize().unwrap();
        // 1 + completion 1 + 00 -> 0b1100
        assert_eq!(cell.to_hex(), "C_");
    }

    #[test]
    fn test_structural_equality_and_depth() {
        let leaf = |bit: bool| {
            let mut b = CellBuilder::new();
            b.write_bit(bit).unwrap();
            b.finalize().unwrap()
        };

        let mut a = CellBuilder::new();
        a.write_ref(leaf(true)).unwrap();
        let a = a.finalize().unwrap();

        let mut b = CellBuilder::new();
        b.write_ref(leaf(true)).unwrap();
        let b = b.finalize().unwrap();

        let mut c = CellBuilder::new();
        c.write_ref(leaf(false)).unwrap();
        let c = c.finalize().unwrap();

        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, c);
        assert_eq!(a.depth(), 1);
    }
}
