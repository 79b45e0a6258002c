//! The executor collaborator
//!
//! Contract code runs in a sandboxed VM that lives outside this crate. The
//! binding only needs to hand it internal messages and get-method calls and
//! read back the resulting stack and debug output.

use async_trait::async_trait;
use num_bigint::BigInt;
use tact_abi::StackValue;
use tact_cell::{Address, Cell};
use thiserror::Error;

/// Internal message submitted to the bound contract
#[derive(Clone, Debug, PartialEq)]
pub struct InternalMessage {
    pub to: Address,
    pub from: Address,
    pub bounce: bool,
    pub value: BigInt,
    pub body: Cell,
}

/// Successful run: the result stack plus any debug output
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionOutcome {
    pub stack: Vec<StackValue>,
    pub debug_logs: Vec<String>,
}

impl ExecutionOutcome {
    pub fn new(stack: Vec<StackValue>) -> Self {
        Self {
            stack,
            debug_logs: Vec::new(),
        }
    }

    pub fn with_logs<I, S>(mut self, logs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.debug_logs.extend(logs.into_iter().map(Into::into));
        self
    }
}

#[derive(Error, Debug)]
pub enum ExecutionFault {
    /// The contract terminated with a non-zero exit code
    #[error("Contract exited with code {exit_code}")]
    Exit {
        exit_code: u32,
        debug_logs: Vec<String>,
    },

    /// The executor itself failed
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

#[async_trait]
pub trait Executor: Send + Sync {
    /// Address of the contract this executor runs
    fn address(&self) -> Address;

    async fn internal(
        &self,
        message: InternalMessage,
        debug: bool,
    ) -> Result<ExecutionOutcome, ExecutionFault>;

    async fn get(
        &self,
        method: &str,
        stack: Vec<StackValue>,
        debug: bool,
    ) -> Result<ExecutionOutcome, ExecutionFault>;
}
