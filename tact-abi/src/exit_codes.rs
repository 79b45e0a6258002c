//! VM exit codes and per-contract error tables

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::error::{AbiError, Result};

/// Codes owned by the VM (0..=127) and the language runtime (128..=255).
/// Contract-defined codes start at 256.
pub const RESERVED_CODES: RangeInclusive<u32> = 0..=255;

/// Reserved exit codes with a fixed meaning
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExitCode {
    StackUnderflow = 2,
    StackOverflow = 3,
    IntegerOverflow = 4,
    IntegerOutOfRange = 5,
    InvalidOpcode = 6,
    TypeCheck = 7,
    CellOverflow = 8,
    CellUnderflow = 9,
    Dictionary = 10,
    OutOfGas = 13,
    MethodNotFound = 32,
    InvalidAction = 34,
    NotEnoughBalance = 37,
    NotEnoughExtraCurrencies = 38,
    NullReference = 128,
    InvalidSerializationPrefix = 129,
    InvalidIncomingMessage = 130,
    Constraints = 131,
    AccessDenied = 132,
    ContractStopped = 133,
    InvalidArgument = 134,
}

impl ExitCode {
    pub const ALL: [ExitCode; 21] = [
        ExitCode::StackUnderflow,
        ExitCode::StackOverflow,
        ExitCode::IntegerOverflow,
        ExitCode::IntegerOutOfRange,
        ExitCode::InvalidOpcode,
        ExitCode::TypeCheck,
        ExitCode::CellOverflow,
        ExitCode::CellUnderflow,
        ExitCode::Dictionary,
        ExitCode::OutOfGas,
        ExitCode::MethodNotFound,
        ExitCode::InvalidAction,
        ExitCode::NotEnoughBalance,
        ExitCode::NotEnoughExtraCurrencies,
        ExitCode::NullReference,
        ExitCode::InvalidSerializationPrefix,
        ExitCode::InvalidIncomingMessage,
        ExitCode::Constraints,
        ExitCode::AccessDenied,
        ExitCode::ContractStopped,
        ExitCode::InvalidArgument,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            2 => Some(ExitCode::StackUnderflow),
            3 => Some(ExitCode::StackOverflow),
            4 => Some(ExitCode::IntegerOverflow),
            5 => Some(ExitCode::IntegerOutOfRange),
            6 => Some(ExitCode::InvalidOpcode),
            7 => Some(ExitCode::TypeCheck),
            8 => Some(ExitCode::CellOverflow),
            9 => Some(ExitCode::CellUnderflow),
            10 => Some(ExitCode::Dictionary),
            13 => Some(ExitCode::OutOfGas),
            32 => Some(ExitCode::MethodNotFound),
            34 => Some(ExitCode::InvalidAction),
            37 => Some(ExitCode::NotEnoughBalance),
            38 => Some(ExitCode::NotEnoughExtraCurrencies),
            128 => Some(ExitCode::NullReference),
            129 => Some(ExitCode::InvalidSerializationPrefix),
            130 => Some(ExitCode::InvalidIncomingMessage),
            131 => Some(ExitCode::Constraints),
            132 => Some(ExitCode::AccessDenied),
            133 => Some(ExitCode::ContractStopped),
            134 => Some(ExitCode::InvalidArgument),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::StackUnderflow => "Stack underflow",
            ExitCode::StackOverflow => "Stack overflow",
            ExitCode::IntegerOverflow => "Integer overflow",
            ExitCode::IntegerOutOfRange => "Integer out of expected range",
            ExitCode::InvalidOpcode => "Invalid opcode",
            ExitCode::TypeCheck => "Type check error",
            ExitCode::CellOverflow => "Cell overflow",
            ExitCode::CellUnderflow => "Cell underflow",
            ExitCode::Dictionary => "Dictionary error",
            ExitCode::OutOfGas => "Out of gas error",
            ExitCode::MethodNotFound => "Method ID not found",
            ExitCode::InvalidAction => "Action is invalid or not supported",
            ExitCode::NotEnoughBalance => "Not enough balance",
            ExitCode::NotEnoughExtraCurrencies => "Not enough extra-currencies",
            ExitCode::NullReference => "Null reference exception",
            ExitCode::InvalidSerializationPrefix => "Invalid serialization prefix",
            ExitCode::InvalidIncomingMessage => "Invalid incoming message",
            ExitCode::Constraints => "Constraints error",
            ExitCode::AccessDenied => "Access denied",
            ExitCode::ContractStopped => "Contract stopped",
            ExitCode::InvalidArgument => "Invalid argument",
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Mapping from exit code to human-readable description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTable {
    entries: BTreeMap<u32, Cow<'static, str>>,
}

impl ErrorTable {
    /// An empty table, without even the reserved codes
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-filled with every [`ExitCode`]
    pub fn standard() -> Self {
        let entries = ExitCode::ALL
            .iter()
            .map(|code| (code.code(), Cow::Borrowed(code.description())))
            .collect();
        Self { entries }
    }

    pub fn is_reserved(code: u32) -> bool {
        RESERVED_CODES.contains(&code)
    }

    /// Add a contract-defined code; reserved codes are rejected
    pub fn with_entry(mut self, code: u32, description: impl Into<Cow<'static, str>>) -> Result<Self> {
        self.insert(code, description)?;
        Ok(self)
    }

    pub fn insert(&mut self, code: u32, description: impl Into<Cow<'static, str>>) -> Result<()> {
        if Self::is_reserved(code) {
            return Err(AbiError::ReservedCode(code));
        }
        self.entries.insert(code, description.into());
        Ok(())
    }

    pub fn describe(&self, code: u32) -> Option<&str> {
        self.entries.get(&code).map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.entries
            .iter()
            .map(|(code, description)| (*code, description.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_roundtrip() {
        for code in ExitCode::ALL {
            assert_eq!(ExitCode::from_code(code.code()), Some(code));
            assert!(ErrorTable::is_reserved(code.code()));
        }
        assert_eq!(ExitCode::from_code(0), None);
        assert_eq!(ExitCode::from_code(11), None);
        assert_eq!(ExitCode::from_code(256), None);
    }

    #[test]
    fn test_standard_table() {
        let table = ErrorTable::standard();
        assert_eq!(table.len(), ExitCode::ALL.len());
        assert_eq!(table.describe(13), Some("Out of gas error"));
        assert_eq!(table.describe(132), Some("Access denied"));
        assert_eq!(table.describe(1), None);
        assert_eq!(ExitCode::OutOfGas.to_string(), "Out of gas error (13)");
    }

    #[test]
    fn test_contract_entries() {
        let table = ErrorTable::standard()
            .with_entry(4429, "Invalid sender")
            .unwrap()
            .with_entry(8086, String::from("Not enough funds"))
            .unwrap();
        assert_eq!(table.describe(4429), Some("Invalid sender"));
        assert_eq!(table.describe(8086), Some("Not enough funds"));

        assert_eq!(
            ErrorTable::standard().with_entry(132, "override").unwrap_err(),
            AbiError::ReservedCode(132)
        );
        assert_eq!(
            ErrorTable::new().with_entry(255, "edge").unwrap_err(),
            AbiError::ReservedCode(255)
        );
        assert!(ErrorTable::new().with_entry(256, "first contract code").is_ok());
    }
}
