//! Instruction dispatch over a [`Ledger`]
//!
//! Shared by the on-chain entrypoint and the in-memory ledger. Accounts are
//! passed by key; the ledger resolves them.

use crate::instruction::EscrowInstruction;
use crate::instructions::{process_cancel, process_deposit, process_initialize, process_release};
use crate::ledger::Ledger;
use pinocchio::{msg, program_error::ProgramError, pubkey::Pubkey, ProgramResult};
use pinocchio_log::logger::Logger;

pub fn process_instruction<L: Ledger>(
    ledger: &mut L,
    program_id: &Pubkey,
    accounts: &[Pubkey],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = EscrowInstruction::unpack(instruction_data).map_err(|err| {
        msg!("Error: Invalid instruction data");
        err
    })?;

    let required = instruction.account_count();
    if accounts.len() < required {
        msg!("Error: Not enough accounts");
        return Err(ProgramError::NotEnoughAccountKeys);
    }
    if accounts[required - 1] != pinocchio_system::ID {
        msg!("Error: Last account must be the system program");
        return Err(ProgramError::IncorrectProgramId);
    }

    match instruction {
        EscrowInstruction::InitializeEscrow { amount } => {
            msg!("Instruction: InitializeEscrow");
            process_initialize(ledger, program_id, &accounts[0], &accounts[1], &accounts[2], amount)
        }
        EscrowInstruction::DepositEscrow => {
            msg!("Instruction: DepositEscrow");
            process_deposit(ledger, program_id, &accounts[0], &accounts[1])
        }
        EscrowInstruction::ReleaseEscrow => {
            msg!("Instruction: ReleaseEscrow");
            process_release(ledger, program_id, &accounts[0], &accounts[1], &accounts[2])
        }
        EscrowInstruction::CancelEscrow => {
            msg!("Instruction: CancelEscrow");
            process_cancel(ledger, program_id, &accounts[0], &accounts[1], &accounts[2])
        }
    }
}

/// Log `label` followed by a lamport amount
pub(crate) fn log_lamports(label: &str, lamports: u64) {
    let mut logger = Logger::<96>::default();
    logger.append(label);
    logger.append(lamports);
    logger.log();
}
