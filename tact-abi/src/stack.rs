//! Stack marshaling for get-method calls
//!
//! The same schemas that drive the cell codec also describe the argument and
//! result stacks of direct method invocations. Each field becomes one stack
//! entry; inline records are flattened in place.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use tact_cell::builder::{fits_signed, fits_unsigned};
use tact_cell::{Address, Cell, CellBuilder, CellError, CellSlice};

use crate::codec;
use crate::error::{AbiError, Result};
use crate::schema::{Field, FieldRule, FieldValue, MessageSchema, Record};

/// One entry of the VM call stack
#[derive(Clone, Debug, PartialEq)]
pub enum StackValue {
    Integer(BigInt),
    Cell(Cell),
    Slice(CellSlice),
    Null,
    Builder(CellBuilder),
}

impl StackValue {
    pub fn kind(&self) -> &'static str {
        match self {
            StackValue::Integer(_) => "integer",
            StackValue::Cell(_) => "cell",
            StackValue::Slice(_) => "slice",
            StackValue::Null => "null",
            StackValue::Builder(_) => "builder",
        }
    }

    /// Stack booleans are full integers: -1 for true, 0 for false
    pub fn bool(value: bool) -> Self {
        if value {
            StackValue::Integer(-BigInt::one())
        } else {
            StackValue::Integer(BigInt::zero())
        }
    }

    /// Slice over a cell holding only `address`
    pub fn address(address: &Address) -> Result<Self> {
        let mut builder = CellBuilder::new();
        builder.write_address(address)?;
        Ok(StackValue::Slice(builder.finalize()?.slice()))
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            StackValue::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            StackValue::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StackValue::Null)
    }
}

impl From<BigInt> for StackValue {
    fn from(value: BigInt) -> Self {
        StackValue::Integer(value)
    }
}

impl From<Cell> for StackValue {
    fn from(value: Cell) -> Self {
        StackValue::Cell(value)
    }
}

/// Flatten `record` into stack entries following `schema`
pub fn to_stack(schema: &'static MessageSchema, record: &Record) -> Result<Vec<StackValue>> {
    let mut stack = Vec::with_capacity(schema.stack_len());
    push_fields(schema, record, &mut stack)?;
    Ok(stack)
}

fn push_fields(
    schema: &'static MessageSchema,
    record: &Record,
    stack: &mut Vec<StackValue>,
) -> Result<()> {
    for (field, value) in schema.zip_record(record)? {
        push_field(schema, field, value, stack)?;
    }
    Ok(())
}

fn push_field(
    schema: &'static MessageSchema,
    field: &'static Field,
    value: &FieldValue,
    stack: &mut Vec<StackValue>,
) -> Result<()> {
    let entry = match (field.rule, value) {
        (FieldRule::Uint(width), FieldValue::Int(v)) => {
            ensure_width(v, width, false)?;
            StackValue::Integer(v.clone())
        }
        (FieldRule::Int(width), FieldValue::Int(v)) => {
            ensure_width(v, width, true)?;
            StackValue::Integer(v.clone())
        }
        (FieldRule::Bit, FieldValue::Bool(bit)) => StackValue::bool(*bit),
        (FieldRule::Address, FieldValue::Address(address)) => StackValue::address(address)?,
        (FieldRule::Cell | FieldRule::OptionalCell, FieldValue::Cell(cell)) => {
            StackValue::Cell(cell.clone())
        }
        (FieldRule::OptionalCell | FieldRule::OptionalRef(_), FieldValue::Null) => StackValue::Null,
        (FieldRule::Ref(nested) | FieldRule::OptionalRef(nested), FieldValue::Record(inner)) => {
            StackValue::Cell(codec::pack(nested, inner)?)
        }
        (FieldRule::Inline(nested), FieldValue::Record(inner)) => {
            return push_fields(nested, inner, stack);
        }
        (_, other) => return Err(schema.mismatch(field, other)),
    };
    stack.push(entry);
    Ok(())
}

fn ensure_width(value: &BigInt, width: u16, signed: bool) -> Result<()> {
    let fits = if signed {
        fits_signed(value, width)
    } else {
        fits_unsigned(value, width)
    };
    if fits {
        Ok(())
    } else {
        Err(CellError::WidthViolation {
            value: value.clone(),
            width,
            signed,
        }
        .into())
    }
}

/// Rebuild a record from exactly `schema.stack_len()` entries
pub fn from_stack(schema: &'static MessageSchema, stack: &[StackValue]) -> Result<Record> {
    let (record, rest) = from_stack_prefix(schema, stack)?;
    if !rest.is_empty() {
        return Err(AbiError::ArityMismatch {
            schema: schema.name,
            expected: schema.stack_len(),
            found: stack.len(),
        });
    }
    Ok(record)
}

/// Rebuild a record from the front of `stack` and return the unread rest
pub fn from_stack_prefix<'s>(
    schema: &'static MessageSchema,
    stack: &'s [StackValue],
) -> Result<(Record, &'s [StackValue])> {
    let expected = schema.stack_len();
    if stack.len() < expected {
        return Err(AbiError::ArityMismatch {
            schema: schema.name,
            expected,
            found: stack.len(),
        });
    }
    let (head, rest) = stack.split_at(expected);
    let mut entries = head.iter();
    let record = take_fields(schema, &mut entries)?;
    Ok((record, rest))
}

fn take_fields<'s>(
    schema: &'static MessageSchema,
    entries: &mut impl Iterator<Item = &'s StackValue>,
) -> Result<Record> {
    let mut record = Record::new(schema.name);
    for field in schema.fields {
        let value = match field.rule {
            FieldRule::Inline(nested) => FieldValue::Record(take_fields(nested, entries)?),
            _ => {
                let entry = entries.next().ok_or(AbiError::ArityMismatch {
                    schema: schema.name,
                    expected: schema.stack_len(),
                    found: 0,
                })?;
                take_field(schema, field, entry)?
            }
        };
        record.push(field.name, value);
    }
    Ok(record)
}

fn take_field(
    schema: &'static MessageSchema,
    field: &'static Field,
    entry: &StackValue,
) -> Result<FieldValue> {
    let value = match (field.rule, entry) {
        (FieldRule::Uint(width), StackValue::Integer(v)) => {
            ensure_width(v, width, false)?;
            FieldValue::Int(v.clone())
        }
        (FieldRule::Int(width), StackValue::Integer(v)) => {
            ensure_width(v, width, true)?;
            FieldValue::Int(v.clone())
        }
        (FieldRule::Bit, StackValue::Integer(v)) => {
            if v.is_zero() {
                FieldValue::Bool(false)
            } else if *v == -BigInt::one() {
                FieldValue::Bool(true)
            } else {
                return Err(type_mismatch(schema, field, "boolean integer (0 or -1)", entry));
            }
        }
        (FieldRule::Address, StackValue::Slice(slice)) => {
            let mut slice = slice.clone();
            FieldValue::Address(slice.read_address()?)
        }
        (FieldRule::Cell | FieldRule::OptionalCell, StackValue::Cell(cell)) => {
            FieldValue::Cell(cell.clone())
        }
        (FieldRule::OptionalCell | FieldRule::OptionalRef(_), StackValue::Null) => FieldValue::Null,
        (FieldRule::Ref(nested) | FieldRule::OptionalRef(nested), StackValue::Cell(cell)) => {
            FieldValue::Record(codec::unpack(nested, &mut cell.slice())?)
        }
        (rule, _) => return Err(type_mismatch(schema, field, stack_kind(rule), entry)),
    };
    Ok(value)
}

fn stack_kind(rule: FieldRule) -> &'static str {
    match rule {
        FieldRule::Uint(_) | FieldRule::Int(_) | FieldRule::Bit => "integer",
        FieldRule::Address => "slice",
        FieldRule::Cell | FieldRule::Ref(_) => "cell",
        FieldRule::OptionalCell | FieldRule::OptionalRef(_) => "cell or null",
        FieldRule::Inline(_) => "inline record",
    }
}

fn type_mismatch(
    schema: &'static MessageSchema,
    field: &'static Field,
    expected: &'static str,
    entry: &StackValue,
) -> AbiError {
    AbiError::TypeMismatch {
        schema: schema.name,
        field: field.name,
        expected,
        found: entry.kind(),
    }
}
