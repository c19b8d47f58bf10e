//! In-memory ledger for tests and the simulator
//!
//! Models the slice of runtime behaviour the escrow relies on: per-transaction
//! signer sets, all-or-nothing transactions, fee charging, rent, ownership and
//! program-derived signing. Not available on-chain.

use super::Ledger;
use crate::pda::EscrowSeeds;
use crate::{error::EscrowError, processor};
use pinocchio::{program_error::ProgramError, pubkey::Pubkey, ProgramResult};
use std::collections::BTreeMap;

/// Owner of plain wallet accounts (all-zero key)
pub const SYSTEM_PROGRAM_ID: Pubkey = [0; 32];

/// Solana's default fee per signature
pub const DEFAULT_TRANSACTION_FEE: u64 = 5_000;

/// Rent schedule, integer form of the runtime's rent-exempt formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentSchedule {
    pub lamports_per_byte_year: u64,
    pub exemption_threshold_years: u64,
}

impl RentSchedule {
    /// Bytes charged for every account regardless of data length
    pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

    pub fn minimum_balance(&self, data_len: usize) -> u64 {
        (Self::ACCOUNT_STORAGE_OVERHEAD + data_len as u64)
            .saturating_mul(self.lamports_per_byte_year)
            .saturating_mul(self.exemption_threshold_years)
    }
}

impl Default for RentSchedule {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: 3_480,
            exemption_threshold_years: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryAccount {
    pub lamports: u64,
    pub data: Vec<u8>,
    pub owner: Pubkey,
}

impl MemoryAccount {
    pub fn wallet(lamports: u64) -> Self {
        Self {
            lamports,
            data: Vec::new(),
            owner: SYSTEM_PROGRAM_ID,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryLedger {
    program_id: Pubkey,
    rent: RentSchedule,
    transaction_fee: u64,
    accounts: BTreeMap<Pubkey, MemoryAccount>,
    signers: Vec<Pubkey>,
}

impl MemoryLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            rent: RentSchedule::default(),
            transaction_fee: 0,
            accounts: BTreeMap::new(),
            signers: Vec::new(),
        }
    }

    pub fn with_rent(mut self, rent: RentSchedule) -> Self {
        self.rent = rent;
        self
    }

    /// Flat fee charged to the first signer of every transaction, even failed ones
    pub fn with_transaction_fee(mut self, fee: u64) -> Self {
        self.transaction_fee = fee;
        self
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn rent(&self) -> RentSchedule {
        self.rent
    }

    pub fn transaction_fee(&self) -> u64 {
        self.transaction_fee
    }

    /// Credit a wallet, creating it if needed
    pub fn airdrop(&mut self, address: Pubkey, lamports: u64) {
        let account = self
            .accounts
            .entry(address)
            .or_insert_with(|| MemoryAccount::wallet(0));
        account.lamports = account.lamports.saturating_add(lamports);
    }

    /// Install an account verbatim
    pub fn set_account(&mut self, address: Pubkey, account: MemoryAccount) {
        self.accounts.insert(address, account);
    }

    pub fn account(&self, address: &Pubkey) -> Option<&MemoryAccount> {
        self.accounts.get(address)
    }

    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.lamports)
    }

    /// Sum of every balance held by the ledger
    pub fn total_lamports(&self) -> u128 {
        self.accounts.values().map(|a| a.lamports as u128).sum()
    }

    /// Run one instruction as an atomic transaction.
    ///
    /// The fee is charged to `signers[0]` up front and kept on failure; every
    /// other change is rolled back if the instruction errors.
    pub fn process_transaction(
        &mut self,
        signers: &[Pubkey],
        instruction_data: &[u8],
        accounts: &[Pubkey],
    ) -> ProgramResult {
        self.charge_fee(signers)?;

        let snapshot = self.accounts.clone();
        self.signers = signers.to_vec();

        let program_id = self.program_id;
        let result = processor::process_instruction(self, &program_id, accounts, instruction_data);

        self.signers.clear();
        if let Err(ref err) = result {
            log::debug!("transaction failed, rolling back: {:?}", err);
            self.accounts = snapshot;
        }
        result
    }

    fn charge_fee(&mut self, signers: &[Pubkey]) -> ProgramResult {
        if self.transaction_fee == 0 {
            return Ok(());
        }
        let payer = signers.first().ok_or(ProgramError::MissingRequiredSignature)?;
        let account = self
            .accounts
            .get_mut(payer)
            .filter(|a| a.lamports >= self.transaction_fee)
            .ok_or(EscrowError::InsufficientFunds)?;
        account.lamports -= self.transaction_fee;
        log::trace!("charged fee of {} lamports", self.transaction_fee);
        Ok(())
    }

    fn existing_mut(&mut self, address: &Pubkey) -> Result<&mut MemoryAccount, ProgramError> {
        self.accounts
            .get_mut(address)
            .ok_or(ProgramError::UninitializedAccount)
    }

    fn credit(&mut self, address: &Pubkey, lamports: u64) -> Result<(), ProgramError> {
        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| MemoryAccount::wallet(0));
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl Ledger for MemoryLedger {
    fn is_signer(&self, address: &Pubkey) -> bool {
        self.signers.contains(address)
    }

    fn balance(&self, address: &Pubkey) -> Result<u64, ProgramError> {
        Ok(self.lamports(address))
    }

    fn is_owned_by(&self, address: &Pubkey, owner: &Pubkey) -> bool {
        self.accounts
            .get(address)
            .is_some_and(|a| a.lamports > 0 && &a.owner == owner)
    }

    fn minimum_balance(&self, data_len: usize) -> Result<u64, ProgramError> {
        Ok(self.rent.minimum_balance(data_len))
    }

    fn read_data(&self, address: &Pubkey, dst: &mut [u8]) -> Result<usize, ProgramError> {
        let data = self.accounts.get(address).map_or(&[][..], |a| &a.data[..]);
        let n = data.len().min(dst.len());
        dst[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write_data(&mut self, address: &Pubkey, src: &[u8]) -> Result<(), ProgramError> {
        let program_id = self.program_id;
        let account = self.existing_mut(address)?;
        if account.owner != program_id {
            return Err(ProgramError::IllegalOwner);
        }
        if account.data.len() < src.len() {
            return Err(ProgramError::AccountDataTooSmall);
        }
        account.data[..src.len()].copy_from_slice(src);
        Ok(())
    }

    fn allocate(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        space: usize,
        owner: &Pubkey,
        seeds: &EscrowSeeds,
    ) -> Result<(), ProgramError> {
        if seeds.address(&self.program_id)? != *address {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if !self.is_signer(payer) {
            return Err(ProgramError::MissingRequiredSignature);
        }
        // Lamports sent to the address beforehand stay; only the shortfall is charged
        let existing = match self.accounts.get(address) {
            Some(a) if a.owner != SYSTEM_PROGRAM_ID || !a.data.is_empty() => {
                return Err(ProgramError::AccountAlreadyInitialized);
            }
            Some(a) => a.lamports,
            None => 0,
        };

        let rent = self.rent.minimum_balance(space);
        let top_up = rent.saturating_sub(existing);
        let payer_account = self
            .accounts
            .get_mut(payer)
            .filter(|a| a.lamports >= top_up)
            .ok_or(EscrowError::InsufficientFunds)?;
        payer_account.lamports -= top_up;

        self.accounts.insert(
            *address,
            MemoryAccount {
                lamports: existing + top_up,
                data: vec![0; space],
                owner: *owner,
            },
        );
        log::debug!("allocated {} bytes, topped up {} lamports", space, top_up);
        Ok(())
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<(), ProgramError> {
        if !self.is_signer(from) {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let source = self.existing_mut(from)?;
        if source.owner != SYSTEM_PROGRAM_ID || !source.data.is_empty() {
            return Err(ProgramError::InvalidAccountData);
        }
        source.lamports = source
            .lamports
            .checked_sub(lamports)
            .ok_or(EscrowError::InsufficientFunds)?;
        self.credit(to, lamports)?;
        log::debug!("transfer {} lamports", lamports);
        Ok(())
    }

    fn transfer_signed(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        lamports: u64,
        seeds: &EscrowSeeds,
    ) -> Result<(), ProgramError> {
        if seeds.address(&self.program_id)? != *from {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if from == to {
            return Err(ProgramError::InvalidArgument);
        }
        let program_id = self.program_id;
        let source = self.existing_mut(from)?;
        if source.owner != program_id {
            return Err(ProgramError::IllegalOwner);
        }
        source.lamports = source
            .lamports
            .checked_sub(lamports)
            .ok_or(ProgramError::InsufficientFunds)?;
        self.credit(to, lamports)?;
        log::debug!("signed transfer {} lamports", lamports);
        Ok(())
    }

    fn close(&mut self, address: &Pubkey, refund_to: &Pubkey) -> Result<(), ProgramError> {
        if address == refund_to {
            return Err(ProgramError::InvalidArgument);
        }
        let program_id = self.program_id;
        let account = self.existing_mut(address)?;
        if account.owner != program_id {
            return Err(ProgramError::IllegalOwner);
        }
        let lamports = account.lamports;
        self.credit(refund_to, lamports)?;
        self.accounts.remove(address);
        log::debug!("closed account, refunded {} lamports", lamports);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::derive_escrow_address;

    const PROGRAM: Pubkey = [7; 32];
    const ALICE: Pubkey = [1; 32];
    const BOB: Pubkey = [2; 32];

    fn seeds() -> (Pubkey, EscrowSeeds) {
        let (address, bump) = derive_escrow_address(&ALICE, &BOB, &PROGRAM);
        (address, EscrowSeeds::new(ALICE, BOB, bump))
    }

    #[test]
    fn test_default_rent_matches_runtime() {
        // (128 + 82) * 3480 * 2
        assert_eq!(RentSchedule::default().minimum_balance(82), 1_461_600);
        assert_eq!(RentSchedule::default().minimum_balance(0), 890_880);
    }

    #[test]
    fn test_transfer_requires_signature() {
        let mut ledger = MemoryLedger::new(PROGRAM);
        ledger.airdrop(ALICE, 100);

        assert_eq!(
            ledger.transfer(&ALICE, &BOB, 10),
            Err(ProgramError::MissingRequiredSignature)
        );

        ledger.signers = vec![ALICE];
        ledger.transfer(&ALICE, &BOB, 10).unwrap();
        assert_eq!(ledger.lamports(&ALICE), 90);
        assert_eq!(ledger.lamports(&BOB), 10);

        assert_eq!(
            ledger.transfer(&ALICE, &BOB, 91),
            Err(EscrowError::InsufficientFunds.into())
        );
    }

    #[test]
    fn test_allocate_and_signed_transfer() {
        let mut ledger = MemoryLedger::new(PROGRAM);
        ledger.airdrop(ALICE, 10_000_000);
        ledger.signers = vec![ALICE];
        let (escrow, seeds) = seeds();

        ledger.allocate(&ALICE, &escrow, 82, &PROGRAM, &seeds).unwrap();
        let rent = ledger.rent().minimum_balance(82);
        assert_eq!(ledger.lamports(&escrow), rent);
        assert!(ledger.is_owned_by(&escrow, &PROGRAM));
        assert_eq!(ledger.account(&escrow).unwrap().data, vec![0; 82]);

        // Second allocation at the same address is refused
        assert_eq!(
            ledger.allocate(&ALICE, &escrow, 82, &PROGRAM, &seeds),
            Err(ProgramError::AccountAlreadyInitialized)
        );

        ledger.transfer_signed(&escrow, &BOB, 100, &seeds).unwrap();
        assert_eq!(ledger.lamports(&BOB), 100);

        // Seeds for another pair do not sign for this escrow
        let (_, other_bump) = derive_escrow_address(&BOB, &ALICE, &PROGRAM);
        let forged = EscrowSeeds::new(BOB, ALICE, other_bump);
        assert_eq!(
            ledger.transfer_signed(&escrow, &BOB, 1, &forged),
            Err(ProgramError::MissingRequiredSignature)
        );
    }

    #[test]
    fn test_allocate_over_prefunded_address() {
        let mut ledger = MemoryLedger::new(PROGRAM);
        ledger.airdrop(ALICE, 10_000_000);
        ledger.signers = vec![ALICE];
        let (escrow, seeds) = seeds();
        let rent = ledger.rent().minimum_balance(82);

        // A stranger funds the address before it is created
        ledger.airdrop(escrow, 1_000);
        ledger.allocate(&ALICE, &escrow, 82, &PROGRAM, &seeds).unwrap();
        assert_eq!(ledger.lamports(&escrow), rent);
        assert_eq!(ledger.lamports(&ALICE), 10_000_000 - (rent - 1_000));
        assert!(ledger.is_owned_by(&escrow, &PROGRAM));

        // More than rent already present: nothing is charged, nothing is lost
        let mut ledger = MemoryLedger::new(PROGRAM);
        ledger.airdrop(ALICE, 10);
        ledger.signers = vec![ALICE];
        ledger.airdrop(escrow, rent + 5);
        ledger.allocate(&ALICE, &escrow, 82, &PROGRAM, &seeds).unwrap();
        assert_eq!(ledger.lamports(&escrow), rent + 5);
        assert_eq!(ledger.lamports(&ALICE), 10);
    }

    #[test]
    fn test_close_refunds_and_removes() {
        let mut ledger = MemoryLedger::new(PROGRAM);
        ledger.airdrop(ALICE, 10_000_000);
        ledger.signers = vec![ALICE];
        let (escrow, seeds) = seeds();
        ledger.allocate(&ALICE, &escrow, 82, &PROGRAM, &seeds).unwrap();

        let before = ledger.total_lamports();
        ledger.close(&escrow, &ALICE).unwrap();
        assert!(ledger.account(&escrow).is_none());
        assert_eq!(ledger.lamports(&ALICE), 10_000_000);
        assert_eq!(ledger.total_lamports(), before);
        assert!(!ledger.is_owned_by(&escrow, &PROGRAM));
    }

    #[test]
    fn test_failed_transaction_rolls_back_but_keeps_fee() {
        let mut ledger = MemoryLedger::new(PROGRAM).with_transaction_fee(DEFAULT_TRANSACTION_FEE);
        ledger.airdrop(ALICE, 1_000_000);

        // Unknown discriminator fails inside the program
        let result = ledger.process_transaction(&[ALICE], &[42], &[]);
        assert_eq!(result, Err(ProgramError::InvalidInstructionData));
        assert_eq!(ledger.lamports(&ALICE), 1_000_000 - DEFAULT_TRANSACTION_FEE);
        assert!(ledger.signers.is_empty());
    }

    #[test]
    fn test_fee_payer_without_funds_is_rejected() {
        let mut ledger = MemoryLedger::new(PROGRAM).with_transaction_fee(DEFAULT_TRANSACTION_FEE);
        assert_eq!(
            ledger.process_transaction(&[ALICE], &[1], &[]),
            Err(EscrowError::InsufficientFunds.into())
        );
        assert_eq!(
            ledger.process_transaction(&[], &[1], &[]),
            Err(ProgramError::MissingRequiredSignature)
        );
    }
}
