//! Tact ABI layer
//!
//! Static [`MessageSchema`] descriptors drive two projections of the same
//! records: the cell wire format ([`codec`]) and the get-method call stack
//! ([`stack`]). Top-level messages carry a 32-bit discriminator that
//! [`SchemaRegistry`] uses to pick a schema for an incoming cell.
//!
//! # Architecture
//!
//! ```text
//! tact-cell (Cell, CellBuilder, CellSlice, Address)
//!     ↑
//! tact-abi (schemas, codec, stack, dispatch, exit codes) ← YOU ARE HERE
//!     ↑
//! tact-binding (executor seam, contract facade)
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod exit_codes;
pub mod schema;
pub mod stack;

pub use crate::codec::{pack, unpack, unpack_exact};
pub use crate::dispatch::{SchemaRegistry, peek_discriminator};
pub use crate::error::{AbiError, Result};
pub use crate::exit_codes::{ErrorTable, ExitCode};
pub use crate::schema::{Field, FieldRule, FieldValue, Message, MessageSchema, Record};
pub use crate::stack::{StackValue, from_stack, from_stack_prefix, to_stack};

// Re-export the cell layer for convenience
pub use tact_cell::{Address, Cell, CellBuilder, CellError, CellSlice};
