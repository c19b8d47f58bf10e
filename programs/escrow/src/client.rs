//! Off-chain instruction builders
//!
//! Thin wrappers producing `solana_program` instructions with the account
//! metas each escrow instruction expects.

use crate::error::EscrowError;
use crate::instruction::EscrowInstruction;
use crate::pda::derive_escrow_address;
use crate::state::EscrowState;
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use solana_program::system_program;

/// Escrow PDA and bump for a participant pair
pub fn find_escrow_address(
    initializer: &Pubkey,
    receiver: &Pubkey,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    let (address, bump) = derive_escrow_address(
        &initializer.to_bytes(),
        &receiver.to_bytes(),
        &program_id.to_bytes(),
    );
    (Pubkey::new_from_array(address), bump)
}

pub fn initialize_escrow(
    program_id: &Pubkey,
    initializer: &Pubkey,
    receiver: &Pubkey,
    amount: u64,
) -> Instruction {
    let (escrow, _) = find_escrow_address(initializer, receiver, program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*initializer, true),
            AccountMeta::new_readonly(*receiver, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: EscrowInstruction::InitializeEscrow { amount }.pack(),
    }
}

pub fn deposit_escrow(program_id: &Pubkey, initializer: &Pubkey, receiver: &Pubkey) -> Instruction {
    let (escrow, _) = find_escrow_address(initializer, receiver, program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*initializer, true),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: EscrowInstruction::DepositEscrow.pack(),
    }
}

pub fn release_escrow(program_id: &Pubkey, initializer: &Pubkey, receiver: &Pubkey) -> Instruction {
    let (escrow, _) = find_escrow_address(initializer, receiver, program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*initializer, true),
            AccountMeta::new(*receiver, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: EscrowInstruction::ReleaseEscrow.pack(),
    }
}

pub fn cancel_escrow(program_id: &Pubkey, initializer: &Pubkey, receiver: &Pubkey) -> Instruction {
    let (escrow, _) = find_escrow_address(initializer, receiver, program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*initializer, true),
            AccountMeta::new_readonly(*receiver, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: EscrowInstruction::CancelEscrow.pack(),
    }
}

/// Decode fetched escrow account data
pub fn decode_escrow(data: &[u8]) -> Result<EscrowState, EscrowError> {
    EscrowState::unpack(data)
}
