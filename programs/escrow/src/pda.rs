//! Escrow address derivation
//!
//! Seeds: `["ESCROW_SEED", initializer, receiver, [bump]]`, bump searched
//! downward from 255 until the hash falls off the ed25519 curve. On-chain the
//! runtime syscalls do the work; off-chain the identical algorithm from
//! `solana-program` is used so clients and tests agree with the program.

use pinocchio::{program_error::ProgramError, pubkey::Pubkey};

/// Domain separator, first seed of every escrow PDA
pub const ESCROW_SEED: &[u8] = b"ESCROW_SEED";

/// Signing witness for an escrow PDA
///
/// Possession of the seeds and bump is what lets the program debit the
/// derived address; the ledger re-derives the address before honoring them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowSeeds {
    pub initializer: Pubkey,
    pub receiver: Pubkey,
    pub bump: [u8; 1],
}

impl EscrowSeeds {
    pub fn new(initializer: Pubkey, receiver: Pubkey, bump: u8) -> Self {
        Self {
            initializer,
            receiver,
            bump: [bump],
        }
    }

    #[inline]
    pub fn bump(&self) -> u8 {
        self.bump[0]
    }

    /// Full seed list including the bump
    #[inline]
    pub fn as_slices(&self) -> [&[u8]; 4] {
        [ESCROW_SEED, &self.initializer[..], &self.receiver[..], &self.bump[..]]
    }

    /// Address these seeds sign for
    pub fn address(&self, program_id: &Pubkey) -> Result<Pubkey, ProgramError> {
        create_program_address(&self.as_slices(), program_id)
    }
}

/// Derive the escrow PDA and its canonical bump for a participant pair
pub fn derive_escrow_address(
    initializer: &Pubkey,
    receiver: &Pubkey,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    find_program_address(&[ESCROW_SEED, &initializer[..], &receiver[..]], program_id)
}

/// Re-derive the escrow PDA from stored terms and bump
pub fn create_escrow_address(
    initializer: &Pubkey,
    receiver: &Pubkey,
    bump: u8,
    program_id: &Pubkey,
) -> Result<Pubkey, ProgramError> {
    EscrowSeeds::new(*initializer, *receiver, bump).address(program_id)
}

#[cfg(target_os = "solana")]
#[inline]
fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> (Pubkey, u8) {
    pinocchio::pubkey::find_program_address(seeds, program_id)
}

#[cfg(target_os = "solana")]
#[inline]
fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, ProgramError> {
    pinocchio::pubkey::create_program_address(seeds, program_id)
}

#[cfg(not(target_os = "solana"))]
fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> (Pubkey, u8) {
    use solana_program::pubkey::Pubkey as SolPubkey;

    let (address, bump) =
        SolPubkey::find_program_address(seeds, &SolPubkey::new_from_array(*program_id));
    (address.to_bytes(), bump)
}

#[cfg(not(target_os = "solana"))]
fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, ProgramError> {
    use solana_program::pubkey::Pubkey as SolPubkey;

    SolPubkey::create_program_address(seeds, &SolPubkey::new_from_array(*program_id))
        .map(|address| address.to_bytes())
        .map_err(|_| ProgramError::InvalidSeeds)
}
