//! Binding for the `Payouts` contract

use num_bigint::BigInt;
use tact_abi::{
    AbiError, ErrorTable, Field, FieldRule, Message, MessageSchema, Record, SchemaRegistry,
};
use tact_cell::{Address, Cell};

use crate::arena::DependencyArena;
use crate::binding::{ContractBinding, GetMethod};
use crate::error::Result;
use crate::executor::{ExecutionOutcome, Executor};
use crate::options::{BindingOptions, SendArgs};

pub static STATE_INIT: MessageSchema = MessageSchema::record(
    "StateInit",
    &[
        Field::new("code", FieldRule::Cell),
        Field::new("data", FieldRule::Cell),
    ],
);

pub static CONTEXT: MessageSchema = MessageSchema::record(
    "Context",
    &[
        Field::new("bounced", FieldRule::Bit),
        Field::new("sender", FieldRule::Address),
        Field::new("value", FieldRule::Int(257)),
    ],
);

pub static SEND_PARAMETERS: MessageSchema = MessageSchema::record(
    "SendParameters",
    &[
        Field::new("bounce", FieldRule::Bit),
        Field::new("to", FieldRule::Address),
        Field::new("value", FieldRule::Int(257)),
        Field::new("mode", FieldRule::Int(257)),
        Field::new("body", FieldRule::OptionalCell),
        Field::new("code", FieldRule::OptionalCell),
        Field::new("data", FieldRule::OptionalCell),
    ],
);

pub static CHANGE_OWNER: MessageSchema = MessageSchema::message(
    "ChangeOwner",
    3067051791,
    &[Field::new("newOwner", FieldRule::Address)],
);

pub static CAN_PAYOUT: MessageSchema = MessageSchema::message(
    "CanPayout",
    1050587494,
    &[Field::new("amount", FieldRule::Int(257))],
);

pub static CAN_PAYOUT_RESPONSE: MessageSchema = MessageSchema::message(
    "CanPayoutResponse",
    1861678417,
    &[
        Field::new("amount", FieldRule::Int(257)),
        Field::new("address", FieldRule::Address),
        Field::new("ok", FieldRule::Bit),
    ],
);

static OWNER_ARGS: MessageSchema = MessageSchema::record("owner$args", &[]);
static OWNER_RESULT: MessageSchema =
    MessageSchema::record("owner$result", &[Field::new("owner", FieldRule::Address)]);

static INIT_ARGS: MessageSchema = MessageSchema::record(
    "init_Payouts$args",
    &[
        Field::new("system", FieldRule::Cell),
        Field::new("owner", FieldRule::Address),
        Field::new("publicKey", FieldRule::Int(257)),
    ],
);
static INIT_RESULT: MessageSchema =
    MessageSchema::record("init_Payouts$result", &[Field::new("data", FieldRule::Cell)]);

pub static OWNER: GetMethod = GetMethod::new("owner", &OWNER_ARGS, &OWNER_RESULT);
pub static INIT: GetMethod = GetMethod::new("init_Payouts", &INIT_ARGS, &INIT_RESULT);

#[derive(Clone, Debug, PartialEq)]
pub struct StateInit {
    pub code: Cell,
    pub data: Cell,
}

impl Message for StateInit {
    fn schema() -> &'static MessageSchema {
        &STATE_INIT
    }

    fn to_record(&self) -> Record {
        Record::new(STATE_INIT.name)
            .with("code", self.code.clone())
            .with("data", self.data.clone())
    }

    fn from_record(record: &Record) -> tact_abi::Result<Self> {
        Ok(Self {
            code: record.cell("code")?,
            data: record.cell("data")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Context {
    pub bounced: bool,
    pub sender: Address,
    pub value: BigInt,
}

impl Message for Context {
    fn schema() -> &'static MessageSchema {
        &CONTEXT
    }

    fn to_record(&self) -> Record {
        Record::new(CONTEXT.name)
            .with("bounced", self.bounced)
            .with("sender", self.sender)
            .with("value", self.value.clone())
    }

    fn from_record(record: &Record) -> tact_abi::Result<Self> {
        Ok(Self {
            bounced: record.bool("bounced")?,
            sender: record.address("sender")?,
            value: record.int("value")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SendParameters {
    pub bounce: bool,
    pub to: Address,
    pub value: BigInt,
    pub mode: BigInt,
    pub body: Option<Cell>,
    pub code: Option<Cell>,
    pub data: Option<Cell>,
}

impl Message for SendParameters {
    fn schema() -> &'static MessageSchema {
        &SEND_PARAMETERS
    }

    fn to_record(&self) -> Record {
        Record::new(SEND_PARAMETERS.name)
            .with("bounce", self.bounce)
            .with("to", self.to)
            .with("value", self.value.clone())
            .with("mode", self.mode.clone())
            .with("body", self.body.clone())
            .with("code", self.code.clone())
            .with("data", self.data.clone())
    }

    fn from_record(record: &Record) -> tact_abi::Result<Self> {
        Ok(Self {
            bounce: record.bool("bounce")?,
            to: record.address("to")?,
            value: record.int("value")?,
            mode: record.int("mode")?,
            body: record.optional_cell("body")?,
            code: record.optional_cell("code")?,
            data: record.optional_cell("data")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChangeOwner {
    pub new_owner: Address,
}

impl Message for ChangeOwner {
    fn schema() -> &'static MessageSchema {
        &CHANGE_OWNER
    }

    fn to_record(&self) -> Record {
        Record::new(CHANGE_OWNER.name).with("newOwner", self.new_owner)
    }

    fn from_record(record: &Record) -> tact_abi::Result<Self> {
        Ok(Self {
            new_owner: record.address("newOwner")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanPayout {
    pub amount: BigInt,
}

impl Message for CanPayout {
    fn schema() -> &'static MessageSchema {
        &CAN_PAYOUT
    }

    fn to_record(&self) -> Record {
        Record::new(CAN_PAYOUT.name).with("amount", self.amount.clone())
    }

    fn from_record(record: &Record) -> tact_abi::Result<Self> {
        Ok(Self {
            amount: record.int("amount")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanPayoutResponse {
    pub amount: BigInt,
    pub address: Address,
    pub ok: bool,
}

impl Message for CanPayoutResponse {
    fn schema() -> &'static MessageSchema {
        &CAN_PAYOUT_RESPONSE
    }

    fn to_record(&self) -> Record {
        Record::new(CAN_PAYOUT_RESPONSE.name)
            .with("amount", self.amount.clone())
            .with("address", self.address)
            .with("ok", self.ok)
    }

    fn from_record(record: &Record) -> tact_abi::Result<Self> {
        Ok(Self {
            amount: record.int("amount")?,
            address: record.address("address")?,
            ok: record.bool("ok")?,
        })
    }
}

/// Messages the contract accepts from outside
#[derive(Clone, Debug, PartialEq)]
pub enum PayoutsMessage {
    CanPayoutResponse(CanPayoutResponse),
    ChangeOwner(ChangeOwner),
}

impl PayoutsMessage {
    pub fn schemas() -> [&'static MessageSchema; 2] {
        [&CAN_PAYOUT_RESPONSE, &CHANGE_OWNER]
    }

    pub fn schema(&self) -> &'static MessageSchema {
        match self {
            PayoutsMessage::CanPayoutResponse(_) => &CAN_PAYOUT_RESPONSE,
            PayoutsMessage::ChangeOwner(_) => &CHANGE_OWNER,
        }
    }

    pub fn pack(&self) -> tact_abi::Result<Cell> {
        match self {
            PayoutsMessage::CanPayoutResponse(message) => message.pack(),
            PayoutsMessage::ChangeOwner(message) => message.pack(),
        }
    }

    /// Decode an incoming body by its leading discriminator
    pub fn decode(cell: &Cell) -> tact_abi::Result<Self> {
        let mut slice = cell.slice();
        match tact_abi::peek_discriminator(cell)? {
            1861678417 => Ok(Self::CanPayoutResponse(CanPayoutResponse::unpack(&mut slice)?)),
            3067051791 => Ok(Self::ChangeOwner(ChangeOwner::unpack(&mut slice)?)),
            other => Err(AbiError::UnknownDiscriminator(other)),
        }
    }

    pub fn registry() -> tact_abi::Result<SchemaRegistry> {
        SchemaRegistry::from_schemas(Self::schemas())
    }
}

impl From<ChangeOwner> for PayoutsMessage {
    fn from(message: ChangeOwner) -> Self {
        PayoutsMessage::ChangeOwner(message)
    }
}

impl From<CanPayoutResponse> for PayoutsMessage {
    fn from(message: CanPayoutResponse) -> Self {
        PayoutsMessage::CanPayoutResponse(message)
    }
}

/// Exit codes the contract can fail with
pub fn payouts_errors() -> ErrorTable {
    ErrorTable::standard()
}

/// Typed handle on a deployed `Payouts` contract
pub struct Payouts<E> {
    binding: ContractBinding<E>,
}

impl<E: Executor> Payouts<E> {
    pub fn new(executor: E) -> Result<Self> {
        Self::with_options(executor, BindingOptions::default())
    }

    pub fn with_options(executor: E, options: BindingOptions) -> Result<Self> {
        let binding = PayoutsMessage::schemas()
            .into_iter()
            .fold(ContractBinding::builder(executor), |builder, schema| {
                builder.message(schema)
            })
            .get_method(OWNER)
            .errors(payouts_errors())
            .options(options)
            .build()?;
        Ok(Self { binding })
    }

    pub fn binding(&self) -> &ContractBinding<E> {
        &self.binding
    }

    pub async fn send(
        &self,
        args: SendArgs,
        message: impl Into<PayoutsMessage>,
    ) -> Result<ExecutionOutcome> {
        match message.into() {
            PayoutsMessage::CanPayoutResponse(message) => self.binding.send(&message, args).await,
            PayoutsMessage::ChangeOwner(message) => self.binding.send(&message, args).await,
        }
    }

    pub async fn get_owner(&self) -> Result<Address> {
        let result = self
            .binding
            .call(OWNER.name, &Record::new(OWNER_ARGS.name))
            .await?;
        Ok(result.address("owner")?)
    }
}

/// Run the contract's init get-method and return the initial data cell.
///
/// `executor` must run the contract code; `dependencies` are passed through
/// the system cell.
pub async fn init_data<E: Executor>(
    executor: E,
    dependencies: &DependencyArena,
    owner: Address,
    public_key: BigInt,
) -> Result<Cell> {
    let binding = ContractBinding::builder(executor)
        .get_method(INIT)
        .errors(payouts_errors())
        .build()?;
    let args = Record::new(INIT_ARGS.name)
        .with("system", dependencies.system_cell()?)
        .with("owner", owner)
        .with("publicKey", public_key);
    let result = binding.call(INIT.name, &args).await?;
    Ok(result.cell("data")?)
}
