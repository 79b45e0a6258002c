//! In-memory executor with scripted responses
//!
//! Records every submission so tests can inspect exactly what a binding sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;
use async_trait::async_trait;
use tact_abi::{ExitCode, StackValue};
use tact_cell::Address;

use crate::executor::{ExecutionFault, ExecutionOutcome, Executor, InternalMessage};

pub type ScriptedResult = Result<ExecutionOutcome, ExecutionFault>;

#[derive(Clone, Debug, PartialEq)]
pub struct SubmittedMessage {
    pub message: InternalMessage,
    pub debug: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub stack: Vec<StackValue>,
    pub debug: bool,
}

#[derive(Default)]
struct FakeState {
    internal: VecDeque<ScriptedResult>,
    get: AHashMap<String, VecDeque<ScriptedResult>>,
    messages: Vec<SubmittedMessage>,
    calls: Vec<RecordedCall>,
}

/// Scripted [`Executor`].
///
/// Internal messages succeed with an empty outcome unless a response was
/// queued; get-methods without a queued response exit with
/// [`ExitCode::MethodNotFound`]. Clones share the same script and records.
#[derive(Clone)]
pub struct FakeExecutor {
    address: Address,
    state: Arc<Mutex<FakeState>>,
}

impl FakeExecutor {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the result of the next internal message
    pub fn push_internal(&self, result: ScriptedResult) -> &Self {
        self.state().internal.push_back(result);
        self
    }

    /// Queue the result of the next call to `method`
    pub fn push_get(&self, method: &str, result: ScriptedResult) -> &Self {
        self.state()
            .get
            .entry(method.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn messages(&self) -> Vec<SubmittedMessage> {
        self.state().messages.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    fn address(&self) -> Address {
        self.address
    }

    async fn internal(
        &self,
        message: InternalMessage,
        debug: bool,
    ) -> Result<ExecutionOutcome, ExecutionFault> {
        let mut state = self.state();
        state.messages.push(SubmittedMessage { message, debug });
        state
            .internal
            .pop_front()
            .unwrap_or_else(|| Ok(ExecutionOutcome::default()))
    }

    async fn get(
        &self,
        method: &str,
        stack: Vec<StackValue>,
        debug: bool,
    ) -> Result<ExecutionOutcome, ExecutionFault> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            method: method.to_string(),
            stack,
            debug,
        });
        state
            .get
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ExecutionFault::Exit {
                    exit_code: ExitCode::MethodNotFound.code(),
                    debug_logs: Vec::new(),
                })
            })
    }
}
