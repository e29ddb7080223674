use chrono::Duration;
use lending_ledger::engine::fee::FeeCalculator;
use lending_ledger::engine::interest::InterestAccrualEngine;
use lending_ledger::prelude::*;
use lending_ledger::simulation::script::replay;
use lending_ledger::simulation::stress_test::{generate_script_with, ScriptConfig};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn owner() -> AccountId {
    AccountId::new("owner")
}

fn borrower() -> AccountId {
    AccountId::new("borrower")
}

/// Generate an amount between 0.001 and 10,000 tokens with a non-round tail.
fn arb_amount() -> impl Strategy<Value = Amount> {
    (1u128..10_000_000u128, 0u128..1_000_000_000_000_000u128)
        .prop_map(|(milli, dust)| milli * (ETHER / 1_000) + dust)
}

/// Generate a caller that is never the owner.
fn arb_outsider() -> impl Strategy<Value = AccountId> {
    "[a-z]{1,12}"
        .prop_filter("outsider must not be the owner", |s| s != "owner")
        .prop_map(AccountId::new)
}

fn funded_bank(reserve: Amount, collateral: Amount) -> SimulatedBank {
    let mut bank = Bank::new(
        owner(),
        BankConfig::default(),
        ManualClock::at_unix(1_700_000_000),
        TransferLog::new(),
    );
    bank.reserve_deposit(&owner(), reserve).unwrap();
    bank.vault_deposit(&borrower(), collateral).unwrap();
    bank
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Compounding truncates at every daily step.
    //
    // The closed loop in the engine must agree with a naive day-by-day
    // reference, never with a single-shot exponentiation.
    // ===================================================================
    #[test]
    fn compound_matches_daily_reference(
        principal in arb_amount(),
        rate in 0u32..100,
        days in 0u64..800,
    ) {
        let mut expected = principal;
        for _ in 0..days {
            expected += expected * rate as u128 / 100 / 365;
        }
        prop_assert_eq!(
            InterestAccrualEngine::compound(principal, rate, days).unwrap(),
            expected
        );
    }

    // ===================================================================
    // INVARIANT 2: Debt never shrinks with time.
    // ===================================================================
    #[test]
    fn compound_is_monotone_in_days(
        principal in arb_amount(),
        days in 0u64..800,
        extra in 0u64..100,
    ) {
        let earlier = InterestAccrualEngine::compound(principal, 12, days).unwrap();
        let later = InterestAccrualEngine::compound(principal, 12, days + extra).unwrap();
        prop_assert!(earlier >= principal);
        prop_assert!(later >= earlier, "{} days owed {}, {} days owed {}", days, earlier, days + extra, later);
    }

    // ===================================================================
    // INVARIANT 3: Borrowing adds exactly amount + floor(amount * fee / 100).
    // ===================================================================
    #[test]
    fn borrow_adds_amount_plus_fee(borrow in arb_amount()) {
        let mut bank = funded_bank(ether(100_000), ether(100_000));
        bank.vault_borrow(&borrower(), borrow).unwrap();

        let fee = FeeCalculator::origination_fee(borrow, 1).unwrap();
        prop_assert_eq!(fee, borrow / 100);
        prop_assert_eq!(bank.vault_debt_amount(&borrower()), borrow + fee);
        prop_assert_eq!(bank.reserve_balance(), ether(100_000) - borrow);
    }

    // ===================================================================
    // INVARIANT 4: The collateralization guard is exact.
    //
    // A borrow succeeds iff collateral * 100 >= (amount + fee) * ratio,
    // given enough liquidity. A rejected borrow changes nothing.
    // ===================================================================
    #[test]
    fn guard_accepts_exactly_the_covered_borrows(
        collateral in arb_amount(),
        borrow in arb_amount(),
    ) {
        let mut bank = funded_bank(ether(100_000), collateral);
        let before = bank.snapshot();
        let debt = borrow + borrow / 100;
        let covered = collateral * 100 >= debt * 150;

        match bank.vault_borrow(&borrower(), borrow) {
            Ok(()) => {
                prop_assert!(covered);
                prop_assert_eq!(bank.vault_debt_amount(&borrower()), debt);
            }
            Err(LedgerError::InsufficientCollateral { .. }) => {
                prop_assert!(!covered);
                prop_assert_eq!(bank.snapshot(), before);
            }
            Err(other) => prop_assert!(false, "unexpected rejection: {}", other),
        }
    }

    // ===================================================================
    // INVARIANT 5: Only the owner touches the reserve.
    // ===================================================================
    #[test]
    fn outsiders_never_move_the_reserve(
        caller in arb_outsider(),
        amount in arb_amount(),
    ) {
        let mut bank = funded_bank(ether(1_000), ether(1));
        let before = bank.snapshot();

        let deposit = bank.reserve_deposit(&caller, amount);
        let withdraw = bank.reserve_withdraw(&caller, amount);
        let is_unauthorized = |r: &Result<(), LedgerError>| {
            matches!(r, Err(LedgerError::Unauthorized { .. }))
        };
        prop_assert!(is_unauthorized(&deposit));
        prop_assert!(is_unauthorized(&withdraw));
        prop_assert_eq!(bank.snapshot(), before);
        prop_assert!(bank.transfer_agent().is_empty());
    }

    // ===================================================================
    // INVARIANT 6: Interest only accrues on whole days.
    //
    // Any instant inside the same day yields the same repay amount.
    // ===================================================================
    #[test]
    fn partial_days_do_not_accrue(
        days in 0i64..400,
        seconds in 0i64..86_400,
    ) {
        let mut bank = funded_bank(ether(1_000), ether(1_000));
        bank.vault_borrow(&borrower(), ether(100)).unwrap();

        bank.clock().advance(Duration::days(days));
        let at_day_start = bank.vault_repay_amount(&borrower()).unwrap();
        bank.clock().advance(Duration::seconds(seconds));
        prop_assert_eq!(bank.vault_repay_amount(&borrower()).unwrap(), at_day_start);
    }

    // ===================================================================
    // INVARIANT 7: Repayment is all-or-nothing.
    //
    // Anything short of the accrued debt is rejected without effect; the
    // exact amount clears the debt.
    // ===================================================================
    #[test]
    fn repayment_is_all_or_nothing(
        borrow in 1u128..60,
        days in 0i64..365,
        short_by in 1u128..1_000_000,
    ) {
        let mut bank = funded_bank(ether(1_000), ether(100));
        bank.vault_borrow(&borrower(), ether(borrow)).unwrap();
        bank.clock().advance(Duration::days(days));

        let required = bank.vault_repay_amount(&borrower()).unwrap();
        let before = bank.snapshot();
        let short = bank.vault_repay(&borrower(), required - short_by);
        let is_partial = matches!(short, Err(LedgerError::PartialRepaymentNotAllowed { .. }));
        prop_assert!(is_partial);
        prop_assert_eq!(bank.snapshot(), before);

        bank.vault_repay(&borrower(), required).unwrap();
        prop_assert_eq!(bank.vault_debt_amount(&borrower()), 0);
        prop_assert_eq!(bank.reserve_balance(), ether(1_000) - ether(borrow) + required);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // ===================================================================
    // INVARIANT 8: Value is conserved across any call sequence.
    //
    // Reserve plus all collateral always equals value attached by callers
    // minus value paid out, rejected calls included.
    // ===================================================================
    #[test]
    fn random_scripts_conserve_value(seed in any::<u64>()) {
        let config = ScriptConfig {
            account_count: 4,
            step_count: 80,
            ..Default::default()
        };
        let script = generate_script_with(&config, &mut StdRng::seed_from_u64(seed));
        let result = replay(&script).unwrap();

        prop_assert!(
            result.is_conserved(),
            "inbound {} - outbound {} != holdings {}",
            result.inbound,
            result.outbound,
            result.final_state.holdings()
        );
        for (_, vault) in result.final_state.vaults.iter() {
            prop_assert_eq!(vault.borrow_timestamp().is_some(), vault.debt_amount() > 0);
        }
    }
}
