//! Static record schemas and dynamic record values

use num_bigint::BigInt;
use tact_cell::{Address, Cell, CellSlice};

use crate::error::{AbiError, Result};
use crate::stack::StackValue;

/// Encoding rule for a single record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Unsigned integer of the given bit width
    Uint(u16),
    /// Two's-complement signed integer of the given bit width
    Int(u16),
    /// Single-bit boolean
    Bit,
    /// Standard internal address (267 bits)
    Address,
    /// Opaque cell attached as an unconditional reference
    Cell,
    /// Opaque cell behind a presence bit
    OptionalCell,
    /// Nested record packed into its own cell, attached unconditionally.
    /// Also used for explicit "tail" continuations of oversized records.
    Ref(&'static MessageSchema),
    /// Nested record packed into its own cell behind a presence bit
    OptionalRef(&'static MessageSchema),
    /// Nested record written into the same cell, field by field
    Inline(&'static MessageSchema),
}

impl FieldRule {
    pub fn describe(&self) -> String {
        match self {
            FieldRule::Uint(width) => format!("uint{width}"),
            FieldRule::Int(width) => format!("int{width}"),
            FieldRule::Bit => "bool".to_string(),
            FieldRule::Address => "address".to_string(),
            FieldRule::Cell => "cell".to_string(),
            FieldRule::OptionalCell => "cell?".to_string(),
            FieldRule::Ref(schema) => format!("^{}", schema.name),
            FieldRule::OptionalRef(schema) => format!("^{}?", schema.name),
            FieldRule::Inline(schema) => schema.name.to_string(),
        }
    }

    /// Whether the absent value is allowed
    pub fn is_optional(&self) -> bool {
        matches!(self, FieldRule::OptionalCell | FieldRule::OptionalRef(_))
    }

    /// Worst-case (bits, refs) this rule adds to the enclosing cell
    pub fn max_size(&self) -> (usize, usize) {
        match self {
            FieldRule::Uint(width) | FieldRule::Int(width) => (usize::from(*width), 0),
            FieldRule::Bit => (1, 0),
            FieldRule::Address => (Address::BIT_LEN, 0),
            FieldRule::Cell | FieldRule::Ref(_) => (0, 1),
            FieldRule::OptionalCell | FieldRule::OptionalRef(_) => (1, 1),
            FieldRule::Inline(schema) => schema.body_size(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub rule: FieldRule,
}

impl Field {
    pub const fn new(name: &'static str, rule: FieldRule) -> Self {
        Self { name, rule }
    }
}

/// Ordered field layout of one record type.
///
/// Schemas with a discriminator are top-level messages; the discriminator
/// is written as the first 32 bits of their cell.
#[derive(Debug, PartialEq, Eq)]
pub struct MessageSchema {
    pub name: &'static str,
    pub discriminator: Option<u32>,
    pub fields: &'static [Field],
}

impl MessageSchema {
    /// A plain record without a discriminator
    pub const fn record(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            discriminator: None,
            fields,
        }
    }

    /// A top-level message tagged with `discriminator`
    pub const fn message(name: &'static str, discriminator: u32, fields: &'static [Field]) -> Self {
        Self {
            name,
            discriminator: Some(discriminator),
            fields,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.discriminator.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Number of stack entries; inline records are flattened
    pub fn stack_len(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match field.rule {
                FieldRule::Inline(schema) => schema.stack_len(),
                _ => 1,
            })
            .sum()
    }

    fn body_size(&self) -> (usize, usize) {
        self.fields.iter().fold((0, 0), |(bits, refs), field| {
            let (b, r) = field.rule.max_size();
            (bits + b, refs + r)
        })
    }

    /// Worst-case (bits, refs) of this schema's own cell, discriminator included
    pub fn max_size(&self) -> (usize, usize) {
        let (bits, refs) = self.body_size();
        let header = if self.is_top_level() { 32 } else { 0 };
        (bits + header, refs)
    }

    /// Whether every value of this schema fits in one cell without a tail
    pub fn fits_single_cell(&self) -> bool {
        let (bits, refs) = self.max_size();
        bits <= tact_cell::MAX_CELL_BITS && refs <= tact_cell::MAX_CELL_REFS
    }

    /// Pair each schema field with the record value at the same position.
    ///
    /// The record must carry this schema's name and exactly its fields, in
    /// declared order.
    pub(crate) fn zip_record<'r>(
        &self,
        record: &'r Record,
    ) -> Result<Vec<(&'static Field, &'r FieldValue)>> {
        if record.name() != self.name {
            return Err(AbiError::RecordMismatch {
                expected: self.name,
                found: record.name().to_string(),
            });
        }

        let mut pairs = Vec::with_capacity(self.fields.len());
        let mut values = record.fields().iter();
        for field in self.fields {
            match values.next() {
                Some((name, value)) if *name == field.name => pairs.push((field, value)),
                Some((name, _)) => {
                    return Err(AbiError::FieldMismatch {
                        schema: self.name,
                        field: field.name,
                        expected: field.rule.describe(),
                        found: format!("field {name}"),
                    });
                }
                None => {
                    return Err(AbiError::FieldMismatch {
                        schema: self.name,
                        field: field.name,
                        expected: field.rule.describe(),
                        found: "nothing".to_string(),
                    });
                }
            }
        }
        if let Some((name, _)) = values.next() {
            return Err(AbiError::RecordMismatch {
                expected: self.name,
                found: format!("{} with extra field {name}", record.name()),
            });
        }
        Ok(pairs)
    }

    pub(crate) fn mismatch(&self, field: &Field, found: &FieldValue) -> AbiError {
        AbiError::FieldMismatch {
            schema: self.name,
            field: field.name,
            expected: field.rule.describe(),
            found: found.kind().to_string(),
        }
    }
}

/// Value of a single record field
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(BigInt),
    Bool(bool),
    Address(Address),
    Cell(Cell),
    Record(Record),
    /// Absent optional value
    Null,
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Bool(_) => "bool",
            FieldValue::Address(_) => "address",
            FieldValue::Cell(_) => "cell",
            FieldValue::Record(_) => "record",
            FieldValue::Null => "null",
        }
    }
}

impl From<BigInt> for FieldValue {
    fn from(value: BigInt) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(BigInt::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Address> for FieldValue {
    fn from(value: Address) -> Self {
        FieldValue::Address(value)
    }
}

impl From<Cell> for FieldValue {
    fn from(value: Cell) -> Self {
        FieldValue::Cell(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Record(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Dynamic value of a schema: the record name plus its fields in order
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    name: &'static str,
    fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Builder-style field append
    pub fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        self.fields.push((name, value.into()));
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    fn expect(&self, name: &'static str, expected: &str) -> Result<&FieldValue> {
        self.get(name).ok_or_else(|| AbiError::FieldMismatch {
            schema: self.name,
            field: name,
            expected: expected.to_string(),
            found: "nothing".to_string(),
        })
    }

    fn wrong(&self, name: &'static str, expected: &str, found: &FieldValue) -> AbiError {
        AbiError::FieldMismatch {
            schema: self.name,
            field: name,
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }

    pub fn int(&self, name: &'static str) -> Result<BigInt> {
        match self.expect(name, "int")? {
            FieldValue::Int(value) => Ok(value.clone()),
            other => Err(self.wrong(name, "int", other)),
        }
    }

    pub fn bool(&self, name: &'static str) -> Result<bool> {
        match self.expect(name, "bool")? {
            FieldValue::Bool(value) => Ok(*value),
            other => Err(self.wrong(name, "bool", other)),
        }
    }

    pub fn address(&self, name: &'static str) -> Result<Address> {
        match self.expect(name, "address")? {
            FieldValue::Address(value) => Ok(*value),
            other => Err(self.wrong(name, "address", other)),
        }
    }

    pub fn cell(&self, name: &'static str) -> Result<Cell> {
        match self.expect(name, "cell")? {
            FieldValue::Cell(value) => Ok(value.clone()),
            other => Err(self.wrong(name, "cell", other)),
        }
    }

    pub fn optional_cell(&self, name: &'static str) -> Result<Option<Cell>> {
        match self.expect(name, "cell?")? {
            FieldValue::Cell(value) => Ok(Some(value.clone())),
            FieldValue::Null => Ok(None),
            other => Err(self.wrong(name, "cell?", other)),
        }
    }

    pub fn record(&self, name: &'static str) -> Result<&Record> {
        match self.expect(name, "record")? {
            FieldValue::Record(value) => Ok(value),
            other => Err(self.wrong(name, "record", other)),
        }
    }

    pub fn optional_record(&self, name: &'static str) -> Result<Option<&Record>> {
        match self.expect(name, "record?")? {
            FieldValue::Record(value) => Ok(Some(value)),
            FieldValue::Null => Ok(None),
            other => Err(self.wrong(name, "record?", other)),
        }
    }
}

/// A typed record bound to a static schema.
///
/// Implementors only describe the conversion to and from [`Record`]; the
/// provided methods route through the schema-driven codec and stack
/// marshaling so both projections stay in sync.
pub trait Message: Sized {
    fn schema() -> &'static MessageSchema;

    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> Result<Self>;

    fn pack(&self) -> Result<Cell> {
        crate::codec::pack(Self::schema(), &self.to_record())
    }

    fn unpack(slice: &mut CellSlice) -> Result<Self> {
        Self::from_record(&crate::codec::unpack(Self::schema(), slice)?)
    }

    fn to_stack(&self) -> Result<Vec<StackValue>> {
        crate::stack::to_stack(Self::schema(), &self.to_record())
    }

    fn from_stack(stack: &[StackValue]) -> Result<Self> {
        Self::from_record(&crate::stack::from_stack(Self::schema(), stack)?)
    }
}
