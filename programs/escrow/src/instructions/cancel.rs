//! Cancel escrow instruction

use crate::error::EscrowError;
use crate::guard::authorize;
use crate::ledger::Ledger;
use crate::processor::log_lamports;
use pinocchio::{msg, pubkey::Pubkey, ProgramResult};

/// Refund the whole escrow balance, rent included, and close the account.
pub fn process_cancel<L: Ledger>(
    ledger: &mut L,
    program_id: &Pubkey,
    initializer: &Pubkey,
    receiver: &Pubkey,
    escrow: &Pubkey,
) -> ProgramResult {
    let guarded = authorize(ledger, program_id, escrow, Some(receiver))?;

    if guarded.state.initializer != *initializer {
        msg!("Error: Initializer does not match escrow");
        return Err(EscrowError::Unauthorized.into());
    }

    let refund = ledger.balance(escrow)?;
    ledger.close(escrow, initializer)?;

    log_lamports("Escrow cancelled, refunded: ", refund);
    Ok(())
}
