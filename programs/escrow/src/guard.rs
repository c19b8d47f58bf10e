//! Authorization guard
//!
//! Runs before every mutating operation on an existing escrow:
//! existence -> decode -> address derivation -> initializer signature ->
//! receiver match -> terminal flag. The receiver is never required to sign.

use crate::error::EscrowError;
use crate::ledger::Ledger;
use crate::pda::EscrowSeeds;
use crate::state::{EscrowState, ESCROW_ACCOUNT_LEN};
use pinocchio::{msg, program_error::ProgramError, pubkey::Pubkey};

/// Escrow that passed the guard, with the seeds that sign for it
#[derive(Debug, Clone, Copy)]
pub struct GuardedEscrow {
    pub state: EscrowState,
    pub seeds: EscrowSeeds,
}

/// Read and decode the escrow at `escrow`; it must be a live program account
pub fn load_escrow<L: Ledger>(
    ledger: &L,
    program_id: &Pubkey,
    escrow: &Pubkey,
) -> Result<EscrowState, ProgramError> {
    if !ledger.is_owned_by(escrow, program_id) {
        msg!("Error: Escrow account does not exist");
        return Err(EscrowError::NotFound.into());
    }

    let mut buf = [0u8; ESCROW_ACCOUNT_LEN];
    let n = ledger.read_data(escrow, &mut buf)?;
    EscrowState::unpack(&buf[..n]).map_err(|e| {
        msg!("Error: Escrow account data is malformed");
        e.into()
    })
}

/// Supplied address must be the PDA of the stored participants and bump
pub fn check_escrow_address(
    program_id: &Pubkey,
    escrow: &Pubkey,
    state: &EscrowState,
) -> Result<EscrowSeeds, EscrowError> {
    let seeds = EscrowSeeds::new(state.initializer, state.receiver, state.bump);
    match seeds.address(program_id) {
        Ok(expected) if expected == *escrow => Ok(seeds),
        _ => {
            msg!("Error: Escrow account is not the correct PDA");
            Err(EscrowError::AddressMismatch)
        }
    }
}

/// `principal` must have signed the transaction
pub fn require_signer<L: Ledger>(ledger: &L, principal: &Pubkey) -> Result<(), EscrowError> {
    if !ledger.is_signer(principal) {
        msg!("Error: Initializer must sign");
        return Err(EscrowError::Unauthorized);
    }
    Ok(())
}

pub fn check_receiver(state: &EscrowState, supplied: &Pubkey) -> Result<(), EscrowError> {
    if state.receiver != *supplied {
        msg!("Error: Receiver does not match escrow");
        return Err(EscrowError::AddressMismatch);
    }
    Ok(())
}

pub fn require_not_released(state: &EscrowState) -> Result<(), EscrowError> {
    if state.is_released {
        msg!("Error: Escrow already released");
        return Err(EscrowError::AlreadyReleased);
    }
    Ok(())
}

/// Full guard for Deposit (no receiver) and Release/Cancel (receiver checked)
pub fn authorize<L: Ledger>(
    ledger: &L,
    program_id: &Pubkey,
    escrow: &Pubkey,
    receiver: Option<&Pubkey>,
) -> Result<GuardedEscrow, ProgramError> {
    let state = load_escrow(ledger, program_id, escrow)?;
    let seeds = check_escrow_address(program_id, escrow, &state)?;
    require_signer(ledger, &state.initializer)?;
    if let Some(receiver) = receiver {
        check_receiver(&state, receiver)?;
    }
    require_not_released(&state)?;

    Ok(GuardedEscrow { state, seeds })
}
