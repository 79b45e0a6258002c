//! Tact Cell Implementation
//!
//! Bounded bit-tree cells used for on-chain messages and persisted state.
//! A [`Cell`] holds at most [`MAX_CELL_BITS`] bits and [`MAX_CELL_REFS`]
//! child cells; it is built once by a [`CellBuilder`] and read by any number
//! of [`CellSlice`] cursors.

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod address;
pub mod builder;
pub mod cell;
pub mod error;
pub mod slice;

// Re-export commonly used types
pub use crate::address::Address;
pub use crate::builder::CellBuilder;
pub use crate::cell::Cell;
pub use crate::error::{CellError, Result};
pub use crate::slice::CellSlice;

/// Maximum number of data bits in a single cell
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of child references in a single cell
pub const MAX_CELL_REFS: usize = 4;
