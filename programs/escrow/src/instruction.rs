//! Instruction data encoding
//!
//! One discriminator byte, then arguments little-endian. Only
//! `InitializeEscrow` carries data; trailing bytes are ignored.

use crate::reader::ByteReader;
use pinocchio::program_error::ProgramError;

/// Encoded size of the largest instruction
pub const MAX_INSTRUCTION_LEN: usize = 1 + 8;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowTag {
    InitializeEscrow = 0,
    DepositEscrow = 1,
    ReleaseEscrow = 2,
    CancelEscrow = 3,
}

impl TryFrom<u8> for EscrowTag {
    type Error = ProgramError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(EscrowTag::InitializeEscrow),
            1 => Ok(EscrowTag::DepositEscrow),
            2 => Ok(EscrowTag::ReleaseEscrow),
            3 => Ok(EscrowTag::CancelEscrow),
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowInstruction {
    /// Create the escrow PDA and record the terms
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Initializer (pays rent)
    /// 1. `[]` Receiver
    /// 2. `[writable]` Escrow account (PDA, must not exist)
    /// 3. `[]` System program
    InitializeEscrow { amount: u64 },

    /// Move `amount` lamports from the initializer into the escrow
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Initializer
    /// 1. `[writable]` Escrow account (PDA)
    /// 2. `[]` System program
    DepositEscrow,

    /// Pay `amount` to the receiver and mark the escrow released
    ///
    /// Accounts expected:
    /// 0. `[signer]` Initializer
    /// 1. `[writable]` Receiver
    /// 2. `[writable]` Escrow account (PDA)
    /// 3. `[]` System program
    ReleaseEscrow,

    /// Refund the whole escrow balance to the initializer and close the PDA
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Initializer
    /// 1. `[]` Receiver
    /// 2. `[writable]` Escrow account (PDA)
    /// 3. `[]` System program
    CancelEscrow,
}

impl EscrowInstruction {
    pub fn tag(&self) -> EscrowTag {
        match self {
            EscrowInstruction::InitializeEscrow { .. } => EscrowTag::InitializeEscrow,
            EscrowInstruction::DepositEscrow => EscrowTag::DepositEscrow,
            EscrowInstruction::ReleaseEscrow => EscrowTag::ReleaseEscrow,
            EscrowInstruction::CancelEscrow => EscrowTag::CancelEscrow,
        }
    }

    /// Number of accounts the instruction expects, system program included
    pub fn account_count(&self) -> usize {
        match self {
            EscrowInstruction::DepositEscrow => 3,
            _ => 4,
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut reader = ByteReader::new(data);
        let tag = reader
            .read_u8()
            .map_err(|_| ProgramError::InvalidInstructionData)?;

        Ok(match EscrowTag::try_from(tag)? {
            EscrowTag::InitializeEscrow => {
                let amount = reader
                    .read_u64()
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                EscrowInstruction::InitializeEscrow { amount }
            }
            EscrowTag::DepositEscrow => EscrowInstruction::DepositEscrow,
            EscrowTag::ReleaseEscrow => EscrowInstruction::ReleaseEscrow,
            EscrowTag::CancelEscrow => EscrowInstruction::CancelEscrow,
        })
    }

    /// Encode into a fixed buffer; returns the used prefix length
    pub fn pack_into(&self, dst: &mut [u8; MAX_INSTRUCTION_LEN]) -> usize {
        dst[0] = self.tag() as u8;
        match self {
            EscrowInstruction::InitializeEscrow { amount } => {
                dst[1..9].copy_from_slice(&amount.to_le_bytes());
                MAX_INSTRUCTION_LEN
            }
            _ => 1,
        }
    }

    #[cfg(not(target_os = "solana"))]
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = [0u8; MAX_INSTRUCTION_LEN];
        let len = self.pack_into(&mut buf);
        buf[..len].to_vec()
    }
}
