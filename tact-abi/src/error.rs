//! Error types for schema-driven encoding and decoding

use tact_cell::CellError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error(transparent)]
    Cell(#[from] CellError),

    #[error("Discriminator mismatch for {schema}: expected {expected:#010x}, found {found:#010x}")]
    DiscriminatorMismatch {
        schema: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("Unknown discriminator {0:#010x}")]
    UnknownDiscriminator(u32),

    #[error("Schema {0} has no discriminator")]
    MissingDiscriminator(&'static str),

    #[error("Discriminator {discriminator:#010x} of {schema} is already used by {existing}")]
    DuplicateDiscriminator {
        discriminator: u32,
        schema: &'static str,
        existing: &'static str,
    },

    #[error("Stack arity mismatch for {schema}: expected {expected} entries, found {found}")]
    ArityMismatch {
        schema: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Stack type mismatch for {schema}.{field}: expected {expected}, found {found}")]
    TypeMismatch {
        schema: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Record does not match {schema}.{field}: expected {expected}, found {found}")]
    FieldMismatch {
        schema: &'static str,
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("Record {found} does not match schema {expected}")]
    RecordMismatch { expected: &'static str, found: String },

    #[error("Trailing data after {schema}: {bits} bits and {refs} refs unread")]
    TrailingData {
        schema: &'static str,
        bits: usize,
        refs: usize,
    },

    #[error("Exit code {0} is in the reserved range")]
    ReservedCode(u32),
}

/// Convenient Result type
pub type Result<T> = std::result::Result<T, AbiError>;
