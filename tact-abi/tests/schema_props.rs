use num_bigint::BigInt;
use proptest::prelude::*;
use tact_abi::{
    Address, Cell, CellBuilder, Field, FieldRule, FieldValue, MessageSchema, Record, from_stack,
    pack, to_stack, unpack, unpack_exact,
};

static CONTEXT: MessageSchema = MessageSchema::record(
    "Context",
    &[
        Field::new("bounced", FieldRule::Bit),
        Field::new("sender", FieldRule::Address),
        Field::new("value", FieldRule::Int(257)),
    ],
);

static ENVELOPE: MessageSchema = MessageSchema::message(
    "Envelope",
    0x0BAD_F00D,
    &[
        Field::new("seq", FieldRule::Uint(64)),
        Field::new("delta", FieldRule::Int(24)),
        Field::new("context", FieldRule::Ref(&CONTEXT)),
        Field::new("reply", FieldRule::OptionalRef(&CONTEXT)),
        Field::new("payload", FieldRule::OptionalCell),
    ],
);

fn arb_address() -> impl Strategy<Value = Address> {
    (any::<i8>(), any::<[u8; 32]>()).prop_map(|(wc, hash)| Address::new(wc, hash))
}

// Values cover zero, negatives and both ends of the 257-bit range.
fn arb_int257() -> impl Strategy<Value = BigInt> {
    let max = BigInt::from(2).pow(256) - 1;
    let min = -BigInt::from(2).pow(256);
    prop_oneof![
        Just(BigInt::from(0)),
        Just(max),
        Just(min),
        any::<i128>().prop_map(BigInt::from),
        (any::<i128>(), 0u32..=128).prop_map(|(v, shift)| BigInt::from(v) << shift),
    ]
}

fn arb_context() -> impl Strategy<Value = Record> {
    (any::<bool>(), arb_address(), arb_int257()).prop_map(|(bounced, sender, value)| {
        Record::new("Context")
            .with("bounced", bounced)
            .with("sender", sender)
            .with("value", value)
    })
}

fn arb_payload() -> impl Strategy<Value = Option<Cell>> {
    proptest::option::of(any::<u32>().prop_map(|word| {
        let mut builder = CellBuilder::new();
        builder.write_u32(word).unwrap();
        builder.finalize().unwrap()
    }))
}

fn arb_envelope() -> impl Strategy<Value = Record> {
    (
        any::<u64>(),
        -(1i64 << 23)..(1i64 << 23),
        arb_context(),
        proptest::option::of(arb_context()),
        arb_payload(),
    )
        .prop_map(|(seq, delta, context, reply, payload)| {
            Record::new("Envelope")
                .with("seq", BigInt::from(seq))
                .with("delta", delta)
                .with("context", context)
                .with("reply", reply)
                .with("payload", payload)
        })
}

proptest! {
    #[test]
    fn prop_cell_roundtrip(record in arb_envelope()) {
        let cell = pack(&ENVELOPE, &record).unwrap();
        prop_assert_eq!(unpack_exact(&ENVELOPE, &cell).unwrap(), record);
    }

    #[test]
    fn prop_stack_roundtrip(record in arb_envelope()) {
        let stack = to_stack(&ENVELOPE, &record).unwrap();
        prop_assert_eq!(stack.len(), ENVELOPE.stack_len());
        prop_assert_eq!(from_stack(&ENVELOPE, &stack).unwrap(), record);
    }

    #[test]
    fn prop_context_record_roundtrip(record in arb_context()) {
        let cell = pack(&CONTEXT, &record).unwrap();
        prop_assert_eq!(cell.bit_len(), 1 + Address::BIT_LEN + 257);
        prop_assert_eq!(unpack(&CONTEXT, &mut cell.slice()).unwrap(), record);
    }

    #[test]
    fn prop_absent_optionals_use_one_bit(context in arb_context()) {
        let record = Record::new("Envelope")
            .with("seq", 0i64)
            .with("delta", 0i64)
            .with("context", context)
            .with("reply", FieldValue::Null)
            .with("payload", FieldValue::Null);
        let cell = pack(&ENVELOPE, &record).unwrap();
        prop_assert_eq!(cell.bit_len(), 32 + 64 + 24 + 1 + 1);
        prop_assert_eq!(cell.refs().len(), 1);
    }
}
