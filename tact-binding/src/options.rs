//! Binding configuration and per-send arguments

use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use tact_cell::Address;

/// Receives every debug log line the executor reports
pub type DebugLogHandler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone)]
pub struct BindingOptions {
    /// Ask the executor for debug output
    pub debug: bool,
    /// Bounce flag used when a send does not set one
    pub bounce: bool,
    pub log_handler: Option<DebugLogHandler>,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            debug: true,
            bounce: false,
            log_handler: None,
        }
    }
}

impl BindingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_log_handler(mut self, handler: DebugLogHandler) -> Self {
        self.log_handler = Some(handler);
        self
    }
}

impl fmt::Debug for BindingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingOptions")
            .field("debug", &self.debug)
            .field("bounce", &self.bounce)
            .field("log_handler", &self.log_handler.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Arguments of a single send.
///
/// Unset fields fall back to the binding: the sender defaults to the
/// contract's own address, `bounce` and `debug` to [`BindingOptions`].
#[derive(Clone, Debug, PartialEq)]
pub struct SendArgs {
    pub value: BigInt,
    pub from: Option<Address>,
    pub bounce: Option<bool>,
    pub debug: Option<bool>,
}

impl SendArgs {
    pub fn new(value: impl Into<BigInt>) -> Self {
        Self {
            value: value.into(),
            from: None,
            bounce: None,
            debug: None,
        }
    }

    pub fn from(mut self, sender: Address) -> Self {
        self.from = Some(sender);
        self
    }

    pub fn bounce(mut self, bounce: bool) -> Self {
        self.bounce = Some(bounce);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }
}
