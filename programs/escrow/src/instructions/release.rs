//! Release escrow instruction

use crate::error::EscrowError;
use crate::guard::authorize;
use crate::ledger::Ledger;
use crate::processor::log_lamports;
use crate::state::ESCROW_ACCOUNT_LEN;
use pinocchio::{msg, pubkey::Pubkey, ProgramResult};

/// Pay `amount` from the escrow to the receiver and set the released flag.
///
/// The escrow must still cover rent after the payout; otherwise nothing moves
/// and the flag stays clear.
pub fn process_release<L: Ledger>(
    ledger: &mut L,
    program_id: &Pubkey,
    initializer: &Pubkey,
    receiver: &Pubkey,
    escrow: &Pubkey,
) -> ProgramResult {
    let guarded = authorize(ledger, program_id, escrow, Some(receiver))?;
    let mut state = guarded.state;

    if state.initializer != *initializer {
        msg!("Error: Initializer does not match escrow");
        return Err(EscrowError::Unauthorized.into());
    }

    let rent = ledger.minimum_balance(ESCROW_ACCOUNT_LEN)?;
    let required = rent
        .checked_add(state.amount)
        .ok_or(EscrowError::InsufficientEscrow)?;
    if ledger.balance(escrow)? < required {
        msg!("Error: Escrow holds less than amount");
        return Err(EscrowError::InsufficientEscrow.into());
    }

    ledger.transfer_signed(escrow, receiver, state.amount, &guarded.seeds)?;

    state.mark_released()?;
    ledger.write_data(escrow, &state.to_bytes())?;

    log_lamports("Escrow released: ", state.amount);
    Ok(())
}
