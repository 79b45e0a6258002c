//! Contract binding facade
//!
//! A [`ContractBinding`] ties one [`Executor`] to the message schemas a
//! contract accepts, the get-methods it exposes and the error table used to
//! explain its exit codes.

use ahash::AHashMap;
use tact_abi::{ErrorTable, Message, MessageSchema, Record, SchemaRegistry, StackValue};
use tracing::{debug, error, warn};

use crate::error::{BindingError, Result};
use crate::executor::{ExecutionFault, ExecutionOutcome, Executor, InternalMessage};
use crate::options::{BindingOptions, SendArgs};

/// Signature of a get-method: its name plus argument and result layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetMethod {
    pub name: &'static str,
    pub args: &'static MessageSchema,
    pub returns: &'static MessageSchema,
}

impl GetMethod {
    pub const fn new(
        name: &'static str,
        args: &'static MessageSchema,
        returns: &'static MessageSchema,
    ) -> Self {
        Self {
            name,
            args,
            returns,
        }
    }
}

pub struct ContractBinding<E> {
    executor: E,
    registry: SchemaRegistry,
    methods: AHashMap<&'static str, GetMethod>,
    errors: ErrorTable,
    options: BindingOptions,
}

impl<E: Executor> ContractBinding<E> {
    pub fn builder(executor: E) -> ContractBindingBuilder<E> {
        ContractBindingBuilder::new(executor)
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn errors(&self) -> &ErrorTable {
        &self.errors
    }

    pub fn options(&self) -> &BindingOptions {
        &self.options
    }

    /// Pack a typed message and submit it as an internal message.
    ///
    /// Fails with [`BindingError::InvalidMessageType`] before reaching the
    /// executor when the message's schema is not registered.
    pub async fn send<M: Message>(&self, message: &M, args: SendArgs) -> Result<ExecutionOutcome> {
        let schema = M::schema();
        if !self.registry.contains(schema) {
            return Err(BindingError::InvalidMessageType(schema.name.to_string()));
        }
        let body = message.pack()?;
        self.submit(schema, body, args).await
    }

    /// Untyped counterpart of [`send`](Self::send), looked up by record name
    pub async fn send_record(&self, record: &Record, args: SendArgs) -> Result<ExecutionOutcome> {
        let schema = self
            .registry
            .by_name(record.name())
            .ok_or_else(|| BindingError::InvalidMessageType(record.name().to_string()))?;
        let body = tact_abi::pack(schema, record)?;
        self.submit(schema, body, args).await
    }

    async fn submit(
        &self,
        schema: &'static MessageSchema,
        body: tact_cell::Cell,
        args: SendArgs,
    ) -> Result<ExecutionOutcome> {
        let to = self.executor.address();
        let message = InternalMessage {
            to,
            from: args.from.unwrap_or(to),
            bounce: args.bounce.unwrap_or(self.options.bounce),
            value: args.value,
            body,
        };
        let debug_flag = args.debug.unwrap_or(self.options.debug);
        debug!(
            schema = schema.name,
            to = %message.to,
            from = %message.from,
            value = %message.value,
            bounce = message.bounce,
            "submitting internal message"
        );
        let result = self.executor.internal(message, debug_flag).await;
        self.finish(result)
    }

    /// Invoke a registered get-method.
    ///
    /// Results are read from the front of the returned stack; extra entries
    /// are ignored.
    pub async fn call(&self, method: &str, args: &Record) -> Result<Record> {
        let signature = self
            .methods
            .get(method)
            .copied()
            .ok_or_else(|| BindingError::UnknownMethod(method.to_string()))?;
        let stack = tact_abi::to_stack(signature.args, args)?;
        let outcome = self.call_raw(signature.name, stack).await?;
        let (record, _) = tact_abi::from_stack_prefix(signature.returns, &outcome.stack)?;
        Ok(record)
    }

    /// Invoke a get-method by name with a prepared stack, without a signature
    pub async fn call_raw(&self, method: &str, stack: Vec<StackValue>) -> Result<ExecutionOutcome> {
        debug!(method, entries = stack.len(), "calling get-method");
        let result = self.executor.get(method, stack, self.options.debug).await;
        self.finish(result)
    }

    fn finish(
        &self,
        result: std::result::Result<ExecutionOutcome, ExecutionFault>,
    ) -> Result<ExecutionOutcome> {
        match result {
            Ok(outcome) => {
                self.forward_logs(&outcome.debug_logs);
                Ok(outcome)
            }
            Err(ExecutionFault::Exit {
                exit_code,
                debug_logs,
            }) => {
                self.forward_logs(&debug_logs);
                let description = self.errors.describe(exit_code).map(str::to_string);
                error!(
                    exit_code,
                    description = description.as_deref().unwrap_or("unknown"),
                    "execution failed"
                );
                Err(BindingError::Execution {
                    code: exit_code,
                    description,
                    debug_logs,
                })
            }
            Err(ExecutionFault::Fault(fault)) => Err(BindingError::Executor(fault)),
        }
    }

    fn forward_logs(&self, lines: &[String]) {
        for line in lines {
            warn!(target: "tact_binding::executor", "{line}");
            if let Some(handler) = &self.options.log_handler {
                handler(line.as_str());
            }
        }
    }
}

pub struct ContractBindingBuilder<E> {
    executor: E,
    schemas: Vec<&'static MessageSchema>,
    methods: Vec<GetMethod>,
    errors: ErrorTable,
    options: BindingOptions,
}

impl<E: Executor> ContractBindingBuilder<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            schemas: Vec::new(),
            methods: Vec::new(),
            errors: ErrorTable::standard(),
            options: BindingOptions::default(),
        }
    }

    /// Accept messages of `schema` in `send`
    pub fn message(mut self, schema: &'static MessageSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn get_method(mut self, method: GetMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn errors(mut self, errors: ErrorTable) -> Self {
        self.errors = errors;
        self
    }

    pub fn options(mut self, options: BindingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<ContractBinding<E>> {
        let registry = SchemaRegistry::from_schemas(self.schemas)?;
        let methods = self
            .methods
            .into_iter()
            .map(|method| (method.name, method))
            .collect();
        Ok(ContractBinding {
            executor: self.executor,
            registry,
            methods,
            errors: self.errors,
            options: self.options,
        })
    }
}
