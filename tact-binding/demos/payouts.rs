// Payouts binding walkthrough
// Drives the generated binding against the in-memory executor

use anyhow::Result;
use num_bigint::BigInt;
use tact_abi::{ExitCode, StackValue};
use tact_binding::contracts::payouts::{ChangeOwner, Payouts, PayoutsMessage};
use tact_binding::{ExecutionFault, ExecutionOutcome, FakeExecutor, SendArgs};
use tact_cell::Address;

#[tokio::main]
async fn main() -> Result<()> {
    let contract: Address = "0:1111111111111111111111111111111111111111111111111111111111111111".parse()?;
    let owner = Address::new(0, [0x22; 32]);

    let executor = FakeExecutor::new(contract);
    executor.push_get(
        "owner",
        Ok(ExecutionOutcome::new(vec![StackValue::address(&owner)?]).with_logs(["owner read"])),
    );
    executor.push_internal(Err(ExecutionFault::Exit {
        exit_code: ExitCode::AccessDenied.code(),
        debug_logs: vec!["sender is not the owner".to_string()],
    }));

    let payouts = Payouts::new(executor.clone())?;
    println!("Current owner: {}", payouts.get_owner().await?);

    let change = ChangeOwner {
        new_owner: Address::new(0, [0x33; 32]),
    };
    println!("ChangeOwner body: {}", PayoutsMessage::from(change.clone()).pack()?);

    match payouts.send(SendArgs::new(BigInt::from(1_000_000_000u64)), change).await {
        Ok(_) => println!("Owner changed"),
        Err(err) => println!("Send rejected: {err} (exit code {:?})", err.exit_code()),
    }

    for submitted in executor.messages() {
        println!(
            "Submitted {} nanotons from {} (bounce: {})",
            submitted.message.value, submitted.message.from, submitted.message.bounce
        );
    }
    Ok(())
}
