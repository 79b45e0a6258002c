//! Schema-driven cell codec

use tact_cell::{Cell, CellBuilder, CellSlice};
use tracing::trace;

use crate::error::{AbiError, Result};
use crate::schema::{Field, FieldRule, FieldValue, MessageSchema, Record};

/// Pack `record` into a fresh cell following `schema`.
///
/// Top-level schemas start with their 32-bit discriminator. Fields are
/// written in declared order; `Ref`/`OptionalRef` fields are packed into
/// their own cells. Nothing is split automatically: a record that needs more
/// room than one cell must declare an explicit `Ref` tail field.
pub fn pack(schema: &'static MessageSchema, record: &Record) -> Result<Cell> {
    trace!(schema = schema.name, "pack");
    let mut builder = CellBuilder::new();
    if let Some(discriminator) = schema.discriminator {
        builder.write_u32(discriminator)?;
    }
    store_fields(schema, record, &mut builder)?;
    Ok(builder.finalize()?)
}

fn store_fields(
    schema: &'static MessageSchema,
    record: &Record,
    builder: &mut CellBuilder,
) -> Result<()> {
    for (field, value) in schema.zip_record(record)? {
        store_field(schema, field, value, builder)?;
    }
    Ok(())
}

fn store_field(
    schema: &'static MessageSchema,
    field: &'static Field,
    value: &FieldValue,
    builder: &mut CellBuilder,
) -> Result<()> {
    match (field.rule, value) {
        (FieldRule::Uint(width), FieldValue::Int(v)) => {
            builder.write_uint(v, width)?;
        }
        (FieldRule::Int(width), FieldValue::Int(v)) => {
            builder.write_int(v, width)?;
        }
        (FieldRule::Bit, FieldValue::Bool(bit)) => {
            builder.write_bit(*bit)?;
        }
        (FieldRule::Address, FieldValue::Address(address)) => {
            builder.write_address(address)?;
        }
        (FieldRule::Cell, FieldValue::Cell(cell)) => {
            builder.write_ref(cell.clone())?;
        }
        (FieldRule::OptionalCell, FieldValue::Cell(cell)) => {
            builder.write_optional_ref(Some(cell.clone()))?;
        }
        (FieldRule::OptionalCell | FieldRule::OptionalRef(_), FieldValue::Null) => {
            builder.write_optional_ref(None)?;
        }
        (FieldRule::Ref(nested), FieldValue::Record(inner)) => {
            builder.write_ref(pack(nested, inner)?)?;
        }
        (FieldRule::OptionalRef(nested), FieldValue::Record(inner)) => {
            builder.write_optional_ref(Some(pack(nested, inner)?))?;
        }
        (FieldRule::Inline(nested), FieldValue::Record(inner)) => {
            store_fields(nested, inner, builder)?;
        }
        (_, other) => return Err(schema.mismatch(field, other)),
    }
    Ok(())
}

/// Read a record of `schema` from `slice`.
///
/// Consumes exactly the declared fields; anything left in the slice
/// afterwards is ignored. Use [`unpack_exact`] to reject trailing data.
pub fn unpack(schema: &'static MessageSchema, slice: &mut CellSlice) -> Result<Record> {
    trace!(schema = schema.name, "unpack");
    if let Some(expected) = schema.discriminator {
        let found = crate::dispatch::peek_slice_discriminator(slice)?;
        if found != expected {
            return Err(AbiError::DiscriminatorMismatch {
                schema: schema.name,
                expected,
                found,
            });
        }
        slice.read_u32()?;
    }
    load_fields(schema, slice)
}

/// Like [`unpack`], but the cell must contain nothing beyond the declared fields
pub fn unpack_exact(schema: &'static MessageSchema, cell: &Cell) -> Result<Record> {
    let mut slice = cell.slice();
    let record = unpack(schema, &mut slice)?;
    if !slice.is_exhausted() {
        return Err(AbiError::TrailingData {
            schema: schema.name,
            bits: slice.remaining_bits(),
            refs: slice.remaining_refs(),
        });
    }
    Ok(record)
}

fn load_fields(schema: &'static MessageSchema, slice: &mut CellSlice) -> Result<Record> {
    let mut record = Record::new(schema.name);
    for field in schema.fields {
        let value = load_field(field, slice)?;
        record.push(field.name, value);
    }
    Ok(record)
}

fn load_field(field: &Field, slice: &mut CellSlice) -> Result<FieldValue> {
    let value = match field.rule {
        FieldRule::Uint(width) => FieldValue::Int(slice.read_uint(width)?),
        FieldRule::Int(width) => FieldValue::Int(slice.read_int(width)?),
        FieldRule::Bit => FieldValue::Bool(slice.read_bit()?),
        FieldRule::Address => FieldValue::Address(slice.read_address()?),
        FieldRule::Cell => FieldValue::Cell(slice.read_ref()?.into_cell()),
        FieldRule::OptionalCell => slice
            .read_optional_ref()?
            .map_or(FieldValue::Null, |child| FieldValue::Cell(child.into_cell())),
        FieldRule::Ref(nested) => FieldValue::Record(unpack(nested, &mut slice.read_ref()?)?),
        FieldRule::OptionalRef(nested) => match slice.read_optional_ref()? {
            Some(mut child) => FieldValue::Record(unpack(nested, &mut child)?),
            None => FieldValue::Null,
        },
        FieldRule::Inline(nested) => FieldValue::Record(load_fields(nested, slice)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use tact_cell::CellError;

    static INNER: MessageSchema =
        MessageSchema::record("Inner", &[Field::new("value", FieldRule::Uint(8))]);

    static OUTER: MessageSchema = MessageSchema::message(
        "Outer",
        0x0000_00AA,
        &[
            Field::new("head", FieldRule::Inline(&INNER)),
            Field::new("link", FieldRule::Ref(&INNER)),
            Field::new("maybe", FieldRule::OptionalRef(&INNER)),
            Field::new("tail", FieldRule::Int(4)),
        ],
    );

    fn inner(value: i64) -> Record {
        Record::new("Inner").with("value", value)
    }

    fn outer(maybe: Option<Record>) -> Record {
        Record::new("Outer")
            .with("head", inner(1))
            .with("link", inner(2))
            .with("maybe", maybe)
            .with("tail", -3i64)
    }

    #[test]
    fn test_inline_and_ref_layout() {
        let cell = pack(&OUTER, &outer(Some(inner(3)))).unwrap();
        // 32 discriminator + 8 inline + 1 presence + 4 tail
        assert_eq!(cell.bit_len(), 45);
        assert_eq!(cell.refs().len(), 2);
        assert_eq!(cell.refs()[0].bit_len(), 8);

        let decoded = unpack(&OUTER, &mut cell.slice()).unwrap();
        assert_eq!(decoded, outer(Some(inner(3))));
    }

    #[test]
    fn test_absent_optional_keeps_following_fields_aligned() {
        let record = outer(None);
        let cell = pack(&OUTER, &record).unwrap();
        assert_eq!(cell.refs().len(), 1);
        assert_eq!(unpack(&OUTER, &mut cell.slice()).unwrap(), record);
    }

    #[test]
    fn test_value_kind_mismatch() {
        let record = Record::new("Outer")
            .with("head", inner(1))
            .with("link", true)
            .with("maybe", FieldValue::Null)
            .with("tail", 0i64);
        let err = pack(&OUTER, &record).unwrap_err();
        assert!(matches!(
            err,
            AbiError::FieldMismatch { field: "link", .. }
        ));
    }

    #[test]
    fn test_width_violation_propagates() {
        let record = Record::new("Outer")
            .with("head", inner(256))
            .with("link", inner(2))
            .with("maybe", FieldValue::Null)
            .with("tail", 0i64);
        assert_eq!(
            pack(&OUTER, &record).unwrap_err(),
            AbiError::Cell(CellError::WidthViolation {
                value: BigInt::from(256),
                width: 8,
                signed: false
            })
        );
    }

    #[test]
    fn test_trailing_data_policy() {
        let mut builder = CellBuilder::new();
        builder.write_uint(&BigInt::from(9), 8).unwrap();
        builder.write_bit(true).unwrap();
        let cell = builder.finalize().unwrap();

        // lenient by default
        assert_eq!(unpack(&INNER, &mut cell.slice()).unwrap(), inner(9));
        // strict on request
        assert_eq!(
            unpack_exact(&INNER, &cell).unwrap_err(),
            AbiError::TrailingData {
                schema: "Inner",
                bits: 1,
                refs: 0
            }
        );
    }
}
