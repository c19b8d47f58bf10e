//! Invariant checking helpers

use crate::state::*;

/// Lamports held by participants and escrows together
pub fn total_lamports(s: &State) -> u128 {
    let wallets = s.balances.iter().fold(0u128, |acc, &b| acc + b as u128);
    s.escrows
        .iter()
        .fold(wallets, |acc, e| acc + e.balance as u128)
}

/// Transitions only move lamports, never mint or burn them
pub fn conservation_ok(before: &State, after: &State) -> bool {
    total_lamports(before) == total_lamports(after)
}

/// A released escrow stays released and pays out nothing further
pub fn release_at_most_once(before: &State, after: &State) -> bool {
    before.escrows.iter().filter(|e| e.is_released).all(|e| {
        after
            .escrow(e.initializer, e.receiver)
            .is_some_and(|a| a.is_released && a.balance == e.balance && a.amount == e.amount)
    })
}

/// Every live escrow keeps at least the rent-exempt minimum
pub fn custody_floor_ok(s: &State) -> bool {
    s.escrows.iter().all(|e| e.balance >= s.params.rent)
}

/// At most one escrow per ordered participant pair
pub fn unique_slots_ok(s: &State) -> bool {
    s.escrows.iter().enumerate().all(|(i, e)| {
        s.escrows[i + 1..]
            .iter()
            .all(|o| (o.initializer, o.receiver) != (e.initializer, e.receiver))
    })
}

