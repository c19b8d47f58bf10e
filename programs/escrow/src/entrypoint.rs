//! Escrow program entrypoint

use pinocchio::{
    account_info::AccountInfo, msg, program_error::ProgramError, pubkey::Pubkey, ProgramResult,
};

use crate::instruction::EscrowInstruction;
use crate::ledger::AccountsLedger;
use crate::processor;

#[cfg(feature = "bpf-entrypoint")]
use pinocchio::entrypoint;

#[cfg(feature = "bpf-entrypoint")]
entrypoint!(process_instruction);

/// Most accounts any escrow instruction takes
const MAX_ACCOUNTS: usize = 4;

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = EscrowInstruction::unpack(instruction_data).map_err(|err| {
        msg!("Error: Invalid instruction data");
        err
    })?;

    validate_writable(&instruction, accounts)?;

    let mut keys: [Pubkey; MAX_ACCOUNTS] = [[0; 32]; MAX_ACCOUNTS];
    let len = accounts.len().min(MAX_ACCOUNTS);
    for (key, account) in keys.iter_mut().zip(accounts) {
        *key = *account.key();
    }

    let mut ledger = AccountsLedger::new(program_id, accounts);
    processor::process_instruction(&mut ledger, program_id, &keys[..len], instruction_data)
}

/// Positions that must be writable, per instruction
fn writable_positions(instruction: &EscrowInstruction) -> &'static [usize] {
    match instruction {
        // initializer, escrow
        EscrowInstruction::InitializeEscrow { .. } => &[0, 2],
        // initializer, escrow
        EscrowInstruction::DepositEscrow => &[0, 1],
        // receiver, escrow
        EscrowInstruction::ReleaseEscrow => &[1, 2],
        // initializer, escrow
        EscrowInstruction::CancelEscrow => &[0, 2],
    }
}

fn validate_writable(instruction: &EscrowInstruction, accounts: &[AccountInfo]) -> ProgramResult {
    for &index in writable_positions(instruction) {
        // Short lists are reported by the processor
        if let Some(account) = accounts.get(index) {
            if !account.is_writable() {
                msg!("Error: Account must be writable");
                return Err(ProgramError::InvalidAccountData);
            }
        }
    }
    Ok(())
}
