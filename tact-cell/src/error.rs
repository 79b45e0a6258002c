//! Error types for cell operations

use num_bigint::BigInt;
use thiserror::Error;

/// Main error type for cell building and parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    #[error(
        "Cell overflow: {bits} bits and {refs} refs requested, {remaining_bits} bits and {remaining_refs} refs left"
    )]
    CapacityExceeded {
        bits: usize,
        refs: usize,
        remaining_bits: usize,
        remaining_refs: usize,
    },

    #[error(
        "Cell underflow: {bits} bits and {refs} refs requested, {remaining_bits} bits and {remaining_refs} refs left"
    )]
    Underflow {
        bits: usize,
        refs: usize,
        remaining_bits: usize,
        remaining_refs: usize,
    },

    #[error("Builder used after finalize")]
    UseAfterFinalize,

    #[error("Value {value} does not fit in {width}-bit {} integer", signedness(.signed))]
    WidthViolation {
        value: BigInt,
        width: u16,
        signed: bool,
    },

    #[error("Unsupported address kind: tag {tag:#04b}, anycast {anycast}")]
    UnsupportedAddress { tag: u8, anycast: bool },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

fn signedness(signed: &bool) -> &'static str {
    if *signed { "signed" } else { "unsigned" }
}

/// Convenient Result type
pub type Result<T> = std::result::Result<T, CellError>;
