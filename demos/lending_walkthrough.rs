//! Walkthrough of a borrower's full lifecycle.
//!
//! Funds the reserve, deposits collateral, borrows, lets interest accrue,
//! repays, and finally liquidates a second borrower whose interest pushed
//! them under the collateralization ratio.

use chrono::Duration;
use lending_ledger::core::amount::format_amount;
use lending_ledger::prelude::*;

fn main() -> Result<(), LedgerError> {
    println!("╔══════════════════════════════════════════╗");
    println!("║   lending-ledger: Lending Walkthrough    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let owner = AccountId::new("owner");
    let alice = AccountId::new("alice");
    let bob = AccountId::new("bob");
    let keeper = AccountId::new("keeper");

    let clock = ManualClock::at_unix(1_700_000_000);
    let mut bank: SimulatedBank = Bank::new(owner.clone(), BankConfig::default(), clock.clone(), TransferLog::new());

    // --- Scenario 1: Borrow and repay ---
    println!("━━━ Scenario 1: Borrow and Repay ━━━\n");

    bank.reserve_deposit(&owner, ether(200))?;
    bank.vault_deposit(&alice, ether(100))?;
    bank.vault_borrow(&alice, ether(50))?;
    println!("Alice debt after borrow:   {}", format_amount(bank.vault_debt_amount(&alice)));

    clock.advance(Duration::days(2) + Duration::seconds(10));
    let owed = bank.vault_repay_amount(&alice)?;
    println!("Alice owes after 2 days:   {}", format_amount(owed));

    match bank.vault_repay(&alice, owed - 1) {
        Err(e) => println!("Short repayment rejected:  {}", e),
        Ok(()) => println!("Short repayment accepted?!"),
    }
    bank.vault_repay(&alice, owed)?;
    let released = bank.vault_withdraw(&alice)?;
    println!("Alice collateral released: {}", format_amount(released));
    println!();

    // --- Scenario 2: Liquidation ---
    println!("━━━ Scenario 2: Liquidation ━━━\n");

    bank.vault_deposit(&bob, ether(100))?;
    bank.vault_borrow(&bob, ether(65))?;
    println!("Bob debt after borrow:     {}", format_amount(bank.vault_debt_amount(&bob)));

    if let Err(e) = bank.liquidate(&keeper, &bob) {
        println!("Early liquidation:         {}", e);
    }

    clock.advance(Duration::days(60));
    println!("{}", bank.report());

    let outcome = bank.liquidate(&keeper, &bob)?;
    println!("Debt settled:              {}", format_amount(outcome.debt_settled));
    println!("Penalty:                   {}", format_amount(outcome.penalty));
    println!("Seized by reserve:         {}", format_amount(outcome.seized));
    println!("Returned to bob:           {}", format_amount(outcome.remainder));
    println!();

    // --- Payouts ---
    println!("━━━ Payouts ━━━\n");
    for transfer in bank.transfer_agent().transfers() {
        println!(
            "{:<22} {:<8} {}",
            transfer.kind().to_string(),
            transfer.recipient().as_str(),
            format_amount(transfer.amount())
        );
    }
    println!("\nReserve balance:           {}", format_amount(bank.reserve_balance()));

    Ok(())
}
