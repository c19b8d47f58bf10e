//! Initialize escrow instruction

use crate::error::EscrowError;
use crate::ledger::Ledger;
use crate::pda::{derive_escrow_address, EscrowSeeds};
use crate::processor::log_lamports;
use crate::state::{EscrowState, ESCROW_ACCOUNT_LEN};
use pinocchio::{msg, pubkey::Pubkey, ProgramResult};

/// Create the escrow PDA for (initializer, receiver) and record `amount`.
///
/// The account is funded to the rent-exempt minimum only; custody arrives
/// with a later Deposit.
pub fn process_initialize<L: Ledger>(
    ledger: &mut L,
    program_id: &Pubkey,
    initializer: &Pubkey,
    receiver: &Pubkey,
    escrow: &Pubkey,
    amount: u64,
) -> ProgramResult {
    if !ledger.is_signer(initializer) {
        msg!("Error: Initializer must sign");
        return Err(EscrowError::Unauthorized.into());
    }

    let (expected, bump) = derive_escrow_address(initializer, receiver, program_id);
    if *escrow != expected {
        msg!("Error: Escrow account is not the correct PDA");
        return Err(EscrowError::AddressMismatch.into());
    }

    if ledger.is_owned_by(escrow, program_id) {
        msg!("Error: Escrow already exists");
        return Err(EscrowError::AlreadyExists.into());
    }

    if amount == 0 {
        msg!("Error: Escrow amount must be positive");
        return Err(EscrowError::InvalidAmount.into());
    }

    // Custody target rent + amount must be representable
    let rent = ledger.minimum_balance(ESCROW_ACCOUNT_LEN)?;
    if rent.checked_add(amount).is_none() {
        msg!("Error: Escrow amount overflows custody");
        return Err(EscrowError::InvalidAmount.into());
    }

    // Lamports already parked at the address count toward rent
    let shortfall = rent.saturating_sub(ledger.balance(escrow)?);
    if ledger.balance(initializer)? < shortfall {
        msg!("Error: Initializer cannot pay rent");
        return Err(EscrowError::InsufficientFunds.into());
    }

    let seeds = EscrowSeeds::new(*initializer, *receiver, bump);
    ledger.allocate(initializer, escrow, ESCROW_ACCOUNT_LEN, program_id, &seeds)?;

    let state = EscrowState::new(*initializer, *receiver, amount, bump);
    ledger.write_data(escrow, &state.to_bytes())?;

    log_lamports("Escrow initialized, amount: ", amount);
    Ok(())
}
