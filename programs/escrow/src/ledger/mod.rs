//! Host runtime primitives consumed by the escrow handlers
//!
//! The handlers never touch `AccountInfo` directly. Everything they need from
//! the runtime (signers, balances, account storage, lamport movement) goes
//! through [`Ledger`], so the same code runs on-chain and in tests.

pub mod accounts;

#[cfg(not(target_os = "solana"))]
pub mod memory;

pub use accounts::AccountsLedger;

use crate::pda::EscrowSeeds;
use pinocchio::{program_error::ProgramError, pubkey::Pubkey};

pub trait Ledger {
    /// Whether `address` signed the current transaction
    fn is_signer(&self, address: &Pubkey) -> bool;

    /// Lamport balance; an address with no account holds 0
    fn balance(&self, address: &Pubkey) -> Result<u64, ProgramError>;

    /// Whether an account exists at `address` and is owned by `owner`
    fn is_owned_by(&self, address: &Pubkey, owner: &Pubkey) -> bool;

    /// Rent-exempt minimum for an account holding `data_len` bytes
    fn minimum_balance(&self, data_len: usize) -> Result<u64, ProgramError>;

    /// Copy account data into `dst`; returns how many bytes were copied
    fn read_data(&self, address: &Pubkey, dst: &mut [u8]) -> Result<usize, ProgramError>;

    /// Overwrite the leading bytes of the account data with `src`
    fn write_data(&mut self, address: &Pubkey, src: &[u8]) -> Result<(), ProgramError>;

    /// Create `address` with `space` zeroed bytes owned by `owner`, funded to
    /// the rent-exempt minimum by `payer`. `seeds` sign for `address`.
    ///
    /// A system-owned account with no data already at `address` is taken
    /// over; its lamports count toward the minimum.
    fn allocate(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        space: usize,
        owner: &Pubkey,
        seeds: &EscrowSeeds,
    ) -> Result<(), ProgramError>;

    /// Native transfer; `from` must have signed the transaction
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<(), ProgramError>;

    /// Debit a program-owned derived account using the program's authority
    fn transfer_signed(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        lamports: u64,
        seeds: &EscrowSeeds,
    ) -> Result<(), ProgramError>;

    /// Zero the account and move every lamport to `refund_to`
    fn close(&mut self, address: &Pubkey, refund_to: &Pubkey) -> Result<(), ProgramError>;
}
