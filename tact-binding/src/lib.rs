//! Contract bindings
//!
//! Wraps an external [`Executor`] with typed message sending and get-method
//! calls. Messages are packed with the schema-driven codec from `tact-abi`,
//! results are read back through stack marshaling, and exit codes are
//! explained through the contract's [`ErrorTable`](tact_abi::ErrorTable).
//!
//! # Architecture
//!
//! ```text
//! tact-cell (Cell, CellBuilder, CellSlice, Address)
//!     ↑
//! tact-abi (schemas, codec, stack, dispatch, exit codes)
//!     ↑
//! tact-binding (executor seam, contract facade) ← YOU ARE HERE
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod arena;
pub mod binding;
pub mod contracts;
pub mod error;
pub mod executor;
pub mod fake;
pub mod options;

pub use crate::arena::{DependencyArena, DependencyArenaBuilder};
pub use crate::binding::{ContractBinding, ContractBindingBuilder, GetMethod};
pub use crate::error::{BindingError, Result};
pub use crate::executor::{ExecutionFault, ExecutionOutcome, Executor, InternalMessage};
pub use crate::fake::{FakeExecutor, RecordedCall, SubmittedMessage};
pub use crate::options::{BindingOptions, DebugLogHandler, SendArgs};
