//! State transition functions - all total, no panics
//!
//! Every transition either returns the successor state or a [`Rejection`]
//! and leaves the input untouched. Checks run in the same order as the
//! on-chain program so rejections line up one to one.

use crate::state::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    Unauthorized,
    AlreadyReleased,
    AddressMismatch,
    AlreadyExists,
    InvalidAmount,
    InsufficientFunds,
    InsufficientEscrow,
    NotFound,
    AlreadyFunded,
    /// Model-only: participant index or table bound exceeded
    OutOfBounds,
    /// Model-only: a balance would exceed u64
    Overflow,
}

pub type Outcome = Result<State, Rejection>;

fn participant_ok(s: &State, who: Participant) -> bool {
    (who as usize) < s.balances.len()
}

fn debit(s: &mut State, who: Participant, amount: u64) -> Result<(), Rejection> {
    let slot = s
        .balances
        .get_mut(who as usize)
        .ok_or(Rejection::OutOfBounds)?;
    *slot = slot.checked_sub(amount).ok_or(Rejection::InsufficientFunds)?;
    Ok(())
}

fn credit(s: &mut State, who: Participant, amount: u64) -> Result<(), Rejection> {
    let slot = s
        .balances
        .get_mut(who as usize)
        .ok_or(Rejection::OutOfBounds)?;
    *slot = slot.checked_add(amount).ok_or(Rejection::Overflow)?;
    Ok(())
}

/// Locate the escrow and run the shared guard
fn guard(
    s: &State,
    signer: Participant,
    initializer: Participant,
    receiver: Participant,
    supplied_receiver: Option<Participant>,
) -> Result<usize, Rejection> {
    let idx = s.find(initializer, receiver).ok_or(Rejection::NotFound)?;
    let e = &s.escrows[idx];

    if signer != e.initializer {
        return Err(Rejection::Unauthorized);
    }
    if let Some(supplied) = supplied_receiver {
        if supplied != e.receiver {
            return Err(Rejection::AddressMismatch);
        }
    }
    if e.is_released {
        return Err(Rejection::AlreadyReleased);
    }
    Ok(idx)
}

/// Create the escrow for (initializer, receiver), paying rent
pub fn initialize(
    s: &State,
    signer: Participant,
    initializer: Participant,
    receiver: Participant,
    amount: u64,
) -> Outcome {
    if !participant_ok(s, initializer) || !participant_ok(s, receiver) {
        return Err(Rejection::OutOfBounds);
    }
    if signer != initializer {
        return Err(Rejection::Unauthorized);
    }
    if s.find(initializer, receiver).is_some() {
        return Err(Rejection::AlreadyExists);
    }
    if amount == 0 || s.params.rent.checked_add(amount).is_none() {
        return Err(Rejection::InvalidAmount);
    }
    if s.escrows.is_full() {
        return Err(Rejection::OutOfBounds);
    }

    let mut next = s.clone();
    let rent = next.params.rent;
    debit(&mut next, initializer, rent)?;
    next.escrows.push(Escrow {
        initializer,
        receiver,
        amount,
        is_released: false,
        balance: rent,
    });
    Ok(next)
}

/// Move `amount` from the initializer into the escrow
pub fn deposit(
    s: &State,
    signer: Participant,
    initializer: Participant,
    receiver: Participant,
) -> Outcome {
    let idx = guard(s, signer, initializer, receiver, None)?;
    let rent = s.params.rent;
    if s.escrows[idx].is_funded(rent) {
        return Err(Rejection::AlreadyFunded);
    }

    let mut next = s.clone();
    let amount = next.escrows[idx].amount;
    debit(&mut next, initializer, amount)?;
    let e = &mut next.escrows[idx];
    e.balance = e.balance.checked_add(amount).ok_or(Rejection::Overflow)?;
    Ok(next)
}

/// Pay `amount` to the receiver and flip the released flag
pub fn release(
    s: &State,
    signer: Participant,
    initializer: Participant,
    receiver: Participant,
    supplied_receiver: Participant,
) -> Outcome {
    let idx = guard(s, signer, initializer, receiver, Some(supplied_receiver))?;
    let rent = s.params.rent;
    if !s.escrows[idx].is_funded(rent) {
        return Err(Rejection::InsufficientEscrow);
    }

    let mut next = s.clone();
    let amount = next.escrows[idx].amount;
    {
        let e = &mut next.escrows[idx];
        e.balance = e.balance.saturating_sub(amount);
        e.is_released = true;
    }
    credit(&mut next, receiver, amount)?;
    Ok(next)
}

/// Refund the whole escrow balance to the initializer and drop the slot
pub fn cancel(
    s: &State,
    signer: Participant,
    initializer: Participant,
    receiver: Participant,
    supplied_receiver: Participant,
) -> Outcome {
    let idx = guard(s, signer, initializer, receiver, Some(supplied_receiver))?;

    let mut next = s.clone();
    let refund = next.escrows[idx].balance;
    next.escrows.remove(idx);
    credit(&mut next, initializer, refund)?;
    Ok(next)
}
