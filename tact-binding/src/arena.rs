//! Immutable arena of dependency code cells
//!
//! Contracts that deploy other contracts receive the code of those
//! dependencies through a single "system cell" passed to their init
//! get-method. The system cell is a `HashmapE 16 ^Cell` dictionary: one
//! presence bit, then a reference to the dictionary root. The code cells
//! themselves are opaque here.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use tact_cell::{Cell, CellBuilder, CellSlice};

use crate::error::{BindingError, Result};

/// Key width of the dependency dictionary
pub const KEY_BITS: u16 = 16;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DependencyArena {
    entries: BTreeMap<u16, Cell>,
}

impl DependencyArena {
    pub fn builder() -> DependencyArenaBuilder {
        DependencyArenaBuilder::default()
    }

    pub fn get(&self, id: u16) -> Option<&Cell> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Cell)> + '_ {
        self.entries.iter().map(|(id, cell)| (*id, cell))
    }

    /// Serialize the entries as a 16-bit-key dictionary of cell references.
    ///
    /// Edge labels use the shortest of the short, long and same encodings,
    /// preferring short, then long, on ties. An empty arena is a single
    /// zero bit.
    pub fn system_cell(&self) -> Result<Cell> {
        let entries: Vec<(u32, &Cell)> = self
            .iter()
            .map(|(id, cell)| (u32::from(id), cell))
            .collect();
        let mut builder = CellBuilder::new();
        if entries.is_empty() {
            builder.write_bit(false)?;
        } else {
            let mut root = CellBuilder::new();
            write_edge(&mut root, &entries, KEY_BITS)?;
            builder.write_bit(true)?.write_ref(root.finalize()?)?;
        }
        Ok(builder.finalize()?)
    }

    /// Read back a dictionary produced by [`system_cell`](Self::system_cell)
    pub fn from_system_cell(cell: &Cell) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(mut root) = cell.slice().read_optional_ref()? {
            builder = read_edge(&mut root, 0, KEY_BITS, builder)?;
        }
        Ok(builder.build())
    }
}

/// `entries` is sorted and shares every key bit above the low `width` bits
fn write_edge(builder: &mut CellBuilder, entries: &[(u32, &Cell)], width: u16) -> Result<()> {
    let (first, last) = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => (first.0 & mask(width), last.0 & mask(width)),
        _ => return Err(BindingError::MalformedDependencies("empty dictionary edge")),
    };
    let prefix = width - bit_length(first ^ last);
    let label = first >> (width - prefix);
    write_label(builder, label, prefix, width)?;

    let rest = width - prefix;
    if rest == 0 {
        builder.write_ref(entries[0].1.clone())?;
        return Ok(());
    }
    let split = entries.partition_point(|(key, _)| key & (1 << (rest - 1)) == 0);
    for branch in [&entries[..split], &entries[split..]] {
        let mut child = CellBuilder::new();
        write_edge(&mut child, branch, rest - 1)?;
        builder.write_ref(child.finalize()?)?;
    }
    Ok(())
}

fn write_label(builder: &mut CellBuilder, label: u32, len: u16, max: u16) -> Result<()> {
    let len_bits = bit_length(u32::from(max));
    let short = 2 + 2 * len;
    let long = 2 + len_bits + len;
    let same = 3 + len_bits;
    let uniform = len <= 1 || label == 0 || label == mask(len);

    if uniform && same < short.min(long) {
        builder
            .write_bit(true)?
            .write_bit(true)?
            .write_bit(label & 1 == 1)?
            .write_uint(&BigInt::from(len), len_bits)?;
        return Ok(());
    }
    if long < short {
        builder
            .write_bit(true)?
            .write_bit(false)?
            .write_uint(&BigInt::from(len), len_bits)?;
    } else {
        builder.write_bit(false)?;
        for _ in 0..len {
            builder.write_bit(true)?;
        }
        builder.write_bit(false)?;
    }
    builder.write_uint(&BigInt::from(label), len)?;
    Ok(())
}

fn read_edge(
    slice: &mut CellSlice,
    key: u32,
    width: u16,
    mut arena: DependencyArenaBuilder,
) -> Result<DependencyArenaBuilder> {
    let (label, len) = read_label(slice, width)?;
    let key = (key << len) | label;
    let rest = width - len;
    if rest == 0 {
        let id = u16::try_from(key)
            .map_err(|_| BindingError::MalformedDependencies("key wider than 16 bits"))?;
        return arena.insert(id, slice.read_ref()?.into_cell());
    }
    for bit in [0, 1] {
        let mut child = slice.read_ref()?;
        arena = read_edge(&mut child, (key << 1) | bit, rest - 1, arena)?;
    }
    Ok(arena)
}

fn read_label(slice: &mut CellSlice, max: u16) -> Result<(u32, u16)> {
    let len_bits = bit_length(u32::from(max));
    if !slice.read_bit()? {
        let mut len = 0;
        while slice.read_bit()? {
            len += 1;
            if len > max {
                return Err(BindingError::MalformedDependencies("label longer than key"));
            }
        }
        Ok((read_small(slice, len)?, len))
    } else if !slice.read_bit()? {
        let len = read_length(slice, len_bits, max)?;
        Ok((read_small(slice, len)?, len))
    } else {
        let bit = slice.read_bit()?;
        let len = read_length(slice, len_bits, max)?;
        Ok((if bit { mask(len) } else { 0 }, len))
    }
}

fn read_length(slice: &mut CellSlice, width: u16, max: u16) -> Result<u16> {
    u16::try_from(read_small(slice, width)?)
        .ok()
        .filter(|len| *len <= max)
        .ok_or(BindingError::MalformedDependencies("label longer than key"))
}

fn read_small(slice: &mut CellSlice, width: u16) -> Result<u32> {
    u32::try_from(slice.read_uint(width)?)
        .map_err(|_| BindingError::MalformedDependencies("label wider than 32 bits"))
}

fn mask(len: u16) -> u32 {
    if len >= 32 { u32::MAX } else { (1 << len) - 1 }
}

/// Bits needed to write `value`, i.e. `ceil(log2(value + 1))`
fn bit_length(value: u32) -> u16 {
    (u32::BITS - value.leading_zeros()) as u16
}

#[derive(Debug, Default)]
pub struct DependencyArenaBuilder {
    entries: BTreeMap<u16, Cell>,
}

impl DependencyArenaBuilder {
    /// Add a dependency; each id may be used once
    pub fn insert(mut self, id: u16, code: Cell) -> Result<Self> {
        if self.entries.contains_key(&id) {
            return Err(BindingError::DuplicateDependency(id));
        }
        self.entries.insert(id, code);
        Ok(self)
    }

    pub fn build(self) -> DependencyArena {
        DependencyArena {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(tag: u32) -> Cell {
        let mut builder = CellBuilder::new();
        builder.write_u32(tag).unwrap();
        builder.finalize().unwrap()
    }

    fn arena(ids: &[u16]) -> DependencyArena {
        ids.iter()
            .fold(DependencyArena::builder(), |builder, id| {
                builder.insert(*id, code(u32::from(*id))).unwrap()
            })
            .build()
    }

    #[test]
    fn test_empty_arena_is_absent_dictionary() {
        let cell = DependencyArena::default().system_cell().unwrap();
        assert_eq!(cell.bit_len(), 1);
        assert!(!cell.slice().read_bit().unwrap());
        assert!(cell.refs().is_empty());
        assert!(DependencyArena::from_system_cell(&cell).unwrap().is_empty());
    }

    #[test]
    fn test_single_entry_layout() {
        let cell = arena(&[41210]).system_cell().unwrap();
        assert_eq!(cell.bit_len(), 1);
        assert!(cell.slice().read_bit().unwrap());
        assert_eq!(cell.refs().len(), 1);

        // hml_long: tag 10, 5-bit length, then the whole 16-bit key
        let root = &cell.refs()[0];
        assert_eq!(root.bit_len(), 2 + 5 + 16);
        assert_eq!(root.refs(), &[code(41210)]);
        let mut slice = root.slice();
        assert_eq!(slice.read_uint(2).unwrap(), BigInt::from(0b10));
        assert_eq!(slice.read_uint(5).unwrap(), BigInt::from(16));
        assert_eq!(slice.read_uint(16).unwrap(), BigInt::from(41210));
        assert!(slice.is_exhausted());
    }

    #[test]
    fn test_fork_uses_shortest_labels() {
        // keys 0 and 1 share fifteen zero bits
        let cell = arena(&[0, 1]).system_cell().unwrap();
        let root = &cell.refs()[0];

        // hml_same: tag 11, bit 0, 5-bit length 15
        let mut slice = root.slice();
        assert_eq!(slice.read_uint(3).unwrap(), BigInt::from(0b110));
        assert_eq!(slice.read_uint(5).unwrap(), BigInt::from(15));
        assert!(slice.is_exhausted());
        assert_eq!(root.refs().len(), 2);

        // both leaves carry an empty hml_short label
        for (index, leaf) in root.refs().iter().enumerate() {
            assert_eq!(leaf.bit_len(), 2);
            assert_eq!(leaf.refs(), &[code(index as u32)]);
        }
    }

    #[test]
    fn test_system_cell_reads_back() {
        let original = arena(&[9, 3, 7, 1, 5, 41210, 65535, 0]);
        let cell = original.system_cell().unwrap();

        let decoded = DependencyArena::from_system_cell(&cell).unwrap();
        assert_eq!(decoded, original);
        let ids: Vec<u16> = decoded.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 3, 5, 7, 9, 41210, 65535]);
    }

    #[test]
    fn test_label_longer_than_key_rejected() {
        let mut root = CellBuilder::new();
        root.write_bit(true)
            .unwrap()
            .write_bit(false)
            .unwrap()
            .write_uint(&BigInt::from(17), 5)
            .unwrap();
        let mut outer = CellBuilder::new();
        outer.write_optional_ref(Some(root.finalize().unwrap())).unwrap();

        let err = DependencyArena::from_system_cell(&outer.finalize().unwrap()).unwrap_err();
        assert!(matches!(err, BindingError::MalformedDependencies(_)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = DependencyArena::builder()
            .insert(1, code(1))
            .unwrap()
            .insert(1, code(2))
            .unwrap_err();
        assert!(matches!(err, BindingError::DuplicateDependency(1)));
    }
}
