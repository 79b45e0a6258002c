use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use tact_abi::{CellBuilder, ExitCode, Message, StackValue};
use tact_binding::contracts::payouts::{
    CanPayoutResponse, ChangeOwner, Payouts, PayoutsMessage, init_data, payouts_errors,
};
use tact_binding::{
    BindingError, DependencyArena, ExecutionFault, ExecutionOutcome, FakeExecutor, SendArgs,
};
use tact_cell::{Address, Cell};

fn contract() -> Address {
    Address::new(0, [0x01; 32])
}

fn owner() -> Address {
    Address::new(0, [0x02; 32])
}

fn data_cell() -> Cell {
    let mut builder = CellBuilder::new();
    builder.write_address(&owner()).unwrap();
    builder.finalize().unwrap()
}

#[tokio::test]
async fn test_send_change_owner() {
    let executor = FakeExecutor::new(contract());
    let payouts = Payouts::new(executor.clone()).unwrap();

    let change = ChangeOwner {
        new_owner: owner(),
    };
    payouts
        .send(SendArgs::new(BigInt::from(10)), change.clone())
        .await
        .unwrap();

    let messages = executor.messages();
    assert_eq!(messages.len(), 1);
    let body = &messages[0].message.body;
    assert_eq!(tact_abi::peek_discriminator(body).unwrap(), 3067051791);
    assert_eq!(
        PayoutsMessage::decode(body).unwrap(),
        PayoutsMessage::ChangeOwner(change)
    );
    assert!(!messages[0].message.bounce);
}

#[tokio::test]
async fn test_send_can_payout_response() {
    let executor = FakeExecutor::new(contract());
    let payouts = Payouts::new(executor.clone()).unwrap();

    let response = CanPayoutResponse {
        amount: BigInt::from(1000),
        address: owner(),
        ok: true,
    };
    payouts
        .send(SendArgs::new(1).from(owner()), PayoutsMessage::from(response.clone()))
        .await
        .unwrap();

    let messages = executor.messages();
    assert_eq!(messages[0].message.from, owner());
    let decoded = CanPayoutResponse::unpack(&mut messages[0].message.body.slice()).unwrap();
    assert_eq!(decoded, response);
}

#[tokio::test]
async fn test_access_denied_is_described() {
    let executor = FakeExecutor::new(contract());
    executor.push_internal(Err(ExecutionFault::Exit {
        exit_code: ExitCode::AccessDenied.code(),
        debug_logs: vec!["not the owner".to_string()],
    }));
    let payouts = Payouts::new(executor).unwrap();

    let err = payouts
        .send(SendArgs::new(1), ChangeOwner { new_owner: owner() })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Access denied (exit code 132)");
    assert_eq!(err.exit_code(), Some(132));
}

#[tokio::test]
async fn test_get_owner() {
    let executor = FakeExecutor::new(contract());
    executor.push_get(
        "owner",
        Ok(ExecutionOutcome::new(vec![StackValue::address(&owner()).unwrap()])),
    );
    let payouts = Payouts::new(executor.clone()).unwrap();

    assert_eq!(payouts.get_owner().await.unwrap(), owner());
    let calls = executor.calls();
    assert_eq!(calls[0].method, "owner");
    assert!(calls[0].stack.is_empty());
    assert!(calls[0].debug);
}

#[tokio::test]
async fn test_get_owner_wrong_stack_kind() {
    let executor = FakeExecutor::new(contract());
    executor.push_get(
        "owner",
        Ok(ExecutionOutcome::new(vec![StackValue::Integer(BigInt::from(1))])),
    );
    let payouts = Payouts::new(executor).unwrap();

    let err = payouts.get_owner().await.unwrap_err();
    assert!(matches!(
        err,
        BindingError::Abi(tact_abi::AbiError::TypeMismatch { field: "owner", .. })
    ));
}

#[tokio::test]
async fn test_init_data_passes_system_cell() {
    let dependency = Cell::empty();
    let arena = DependencyArena::builder()
        .insert(41210, dependency)
        .unwrap()
        .build();

    let executor = FakeExecutor::new(contract());
    executor.push_get(
        "init_Payouts",
        Ok(ExecutionOutcome::new(vec![StackValue::Cell(data_cell())])),
    );

    let data = init_data(executor.clone(), &arena, owner(), BigInt::from(42))
        .await
        .unwrap();
    assert_eq!(data, data_cell());

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "init_Payouts");
    assert_eq!(
        calls[0].stack,
        vec![
            StackValue::Cell(arena.system_cell().unwrap()),
            StackValue::address(&owner()).unwrap(),
            StackValue::Integer(BigInt::from(42)),
        ]
    );
}

#[test]
fn test_payouts_errors_cover_runtime_codes() {
    let errors = payouts_errors();
    for code in ExitCode::ALL {
        assert_eq!(errors.describe(code.code()), Some(code.description()));
    }
    assert_eq!(errors.describe(2), Some("Stack underflow"));
}
