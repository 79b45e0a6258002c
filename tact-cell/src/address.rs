//! Standard internal addresses

use std::fmt;
use std::str::FromStr;

use crate::error::CellError;

/// Standard internal address: signed 8-bit workchain plus 256-bit account hash.
///
/// Only the `addr_std` form without anycast is supported; every other
/// address kind is rejected when read from a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    workchain: i8,
    hash: [u8; 32],
}

impl Address {
    /// Encoded width: 2 tag bits, 1 anycast bit, 8 workchain bits, 256 hash bits
    pub const BIT_LEN: usize = 267;

    pub const fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.workchain)?;
        for byte in &self.hash {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Parses the raw `<workchain>:<64 hex digits>` form
impl FromStr for Address {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, hex) = s
            .split_once(':')
            .ok_or_else(|| CellError::InvalidAddress(format!("missing ':' in {s:?}")))?;
        let workchain: i8 = workchain
            .parse()
            .map_err(|e| CellError::InvalidAddress(format!("bad workchain {workchain:?}: {e}")))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CellError::InvalidAddress(format!("non-hex digits in {hex:?}")));
        }
        if hex.len() != 64 {
            return Err(CellError::InvalidAddress(format!(
                "expected 64 hex digits, found {}",
                hex.len()
            )));
        }

        let mut hash = [0u8; 32];
        for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
            let digits = std::str::from_utf8(pair)
                .map_err(|e| CellError::InvalidAddress(e.to_string()))?;
            hash[i] = u8::from_str_radix(digits, 16)
                .map_err(|e| CellError::InvalidAddress(format!("bad hex {digits:?}: {e}")))?;
        }
        Ok(Self { workchain, hash })
    }
}
