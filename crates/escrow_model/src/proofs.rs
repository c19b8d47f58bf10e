//! Kani harnesses over the escrow model
//!
//! Small symbolic inputs on a two-party state; each harness checks one
//! property across every transition that could violate it.

use crate::{helpers::*, state::*, transitions::*};

const RENT: u64 = 100;

fn any_participant() -> Participant {
    let p: Participant = kani::any();
    kani::assume((p as usize) < 3);
    p
}

fn any_amount() -> u64 {
    let a: u64 = kani::any();
    kani::assume(a <= 1_000);
    a
}

/// Two wallets and one escrow A->B in a symbolic lifecycle position
fn any_state() -> State {
    let mut s = State::with_balances(&[kani::any::<u16>() as u64, 0, 500], Params { rent: RENT });
    let amount = any_amount();
    kani::assume(amount > 0);
    let funded: bool = kani::any();
    let released: bool = kani::any();
    kani::assume(funded || !released);

    let balance = if funded { RENT + amount } else { RENT };
    s.escrows.push(Escrow {
        initializer: 0,
        receiver: 1,
        amount,
        is_released: released,
        balance: if released { RENT } else { balance },
    });
    s
}

#[kani::proof]
fn release_is_monotonic() {
    let s = any_state();
    let signer = any_participant();
    let supplied = any_participant();

    for outcome in [
        release(&s, signer, 0, 1, supplied),
        cancel(&s, signer, 0, 1, supplied),
        deposit(&s, signer, 0, 1),
    ] {
        if let Ok(after) = outcome {
            assert!(release_at_most_once(&s, &after));
        }
    }
}

#[kani::proof]
fn only_initializer_moves_escrow_funds() {
    let s = any_state();
    let signer = any_participant();
    kani::assume(signer != 0);
    let supplied = any_participant();

    assert_eq!(release(&s, signer, 0, 1, supplied), Err(Rejection::Unauthorized));
    assert_eq!(cancel(&s, signer, 0, 1, supplied), Err(Rejection::Unauthorized));
    assert_eq!(deposit(&s, signer, 0, 1), Err(Rejection::Unauthorized));
}

#[kani::proof]
fn transitions_conserve_lamports() {
    let s = any_state();
    let signer = any_participant();
    let supplied = any_participant();
    let amount = any_amount();

    for outcome in [
        initialize(&s, signer, 0, 2, amount),
        deposit(&s, signer, 0, 1),
        release(&s, signer, 0, 1, supplied),
        cancel(&s, signer, 0, 1, supplied),
    ] {
        if let Ok(after) = outcome {
            assert!(conservation_ok(&s, &after));
            assert!(custody_floor_ok(&after));
        }
    }
}

#[kani::proof]
fn release_pays_exact_amount() {
    let s = any_state();
    if let Ok(after) = release(&s, 0, 0, 1, 1) {
        let amount = s.escrows[0].amount;
        assert_eq!(after.balance(1), s.balance(1) + amount);
        assert_eq!(after.escrows[0].balance, s.escrows[0].balance - amount);
    }
}
