//! On-chain ledger backed by the transaction's accounts

use super::Ledger;
use crate::pda::EscrowSeeds;
use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvars::{rent::Rent, Sysvar},
};
use pinocchio_system::instructions::{Allocate, Assign, CreateAccount, Transfer};

pub struct AccountsLedger<'a> {
    program_id: &'a Pubkey,
    accounts: &'a [AccountInfo],
}

impl<'a> AccountsLedger<'a> {
    pub fn new(program_id: &'a Pubkey, accounts: &'a [AccountInfo]) -> Self {
        Self {
            program_id,
            accounts,
        }
    }

    fn find(&self, address: &Pubkey) -> Result<&'a AccountInfo, ProgramError> {
        self.accounts
            .iter()
            .find(|account| account.key() == address)
            .ok_or(ProgramError::NotEnoughAccountKeys)
    }
}

#[inline]
fn signer_seeds(seeds: &EscrowSeeds) -> [Seed<'_>; 4] {
    let [tag, initializer, receiver, bump] = seeds.as_slices();
    [
        Seed::from(tag),
        Seed::from(initializer),
        Seed::from(receiver),
        Seed::from(bump),
    ]
}

impl Ledger for AccountsLedger<'_> {
    fn is_signer(&self, address: &Pubkey) -> bool {
        self.accounts
            .iter()
            .any(|account| account.key() == address && account.is_signer())
    }

    fn balance(&self, address: &Pubkey) -> Result<u64, ProgramError> {
        Ok(self.find(address)?.lamports())
    }

    fn is_owned_by(&self, address: &Pubkey, owner: &Pubkey) -> bool {
        self.find(address)
            .map(|account| account.lamports() > 0 && account.is_owned_by(owner))
            .unwrap_or(false)
    }

    fn minimum_balance(&self, data_len: usize) -> Result<u64, ProgramError> {
        Ok(Rent::get()?.minimum_balance(data_len))
    }

    fn read_data(&self, address: &Pubkey, dst: &mut [u8]) -> Result<usize, ProgramError> {
        let data = self.find(address)?.try_borrow_data()?;
        let n = data.len().min(dst.len());
        dst[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write_data(&mut self, address: &Pubkey, src: &[u8]) -> Result<(), ProgramError> {
        let mut data = self.find(address)?.try_borrow_mut_data()?;
        if data.len() < src.len() {
            msg!("Error: Account data too small");
            return Err(ProgramError::AccountDataTooSmall);
        }
        data[..src.len()].copy_from_slice(src);
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
        let from = self.find(payer)?;
        let to = self.find(address)?;
        let rent = self.minimum_balance(space)?;

        let seed_list = signer_seeds(seeds);

        if to.lamports() == 0 {
            return CreateAccount {
                from,
                to,
                lamports: rent,
                space: space as u64,
                owner,
            }
            .invoke_signed(&[Signer::from(&seed_list[..])]);
        }

        // Someone already sent lamports to the address. CreateAccount refuses a
        // funded target, so top up, allocate and assign instead.
        if !to.is_owned_by(&pinocchio_system::ID) || to.data_len() != 0 {
            msg!("Error: Escrow address holds foreign state");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let top_up = rent.saturating_sub(to.lamports());
        if top_up > 0 {
            Transfer {
                from,
                to,
                lamports: top_up,
            }
            .invoke()?;
        }

        Allocate {
            account: to,
            space: space as u64,
        }
        .invoke_signed(&[Signer::from(&seed_list[..])])?;

        Assign { account: to, owner }.invoke_signed(&[Signer::from(&seed_list[..])])
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<(), ProgramError> {
        Transfer {
            from: self.find(from)?,
            to: self.find(to)?,
            lamports,
        }
        .invoke()
    }

    fn transfer_signed(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        lamports: u64,
        seeds: &EscrowSeeds,
    ) -> Result<(), ProgramError> {
        // A data-carrying account cannot be the source of a system transfer.
        // The program owns `from`, so it debits directly once the seeds check out.
        if seeds.address(self.program_id)? != *from {
            msg!("Error: Seeds do not sign for source account");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let source = self.find(from)?;
        let destination = self.find(to)?;
        if !source.is_owned_by(self.program_id) {
            return Err(ProgramError::IllegalOwner);
        }

        let source_lamports = source
            .lamports()
            .checked_sub(lamports)
            .ok_or(ProgramError::InsufficientFunds)?;
        let destination_lamports = destination
            .lamports()
            .checked_add(lamports)
            .ok_or(ProgramError::ArithmeticOverflow)?;

        *source.try_borrow_mut_lamports()? = source_lamports;
        *destination.try_borrow_mut_lamports()? = destination_lamports;
        Ok(())
    }

    fn close(&mut self, address: &Pubkey, refund_to: &Pubkey) -> Result<(), ProgramError> {
        let account = self.find(address)?;
        let destination = self.find(refund_to)?;

        let destination_lamports = destination
            .lamports()
            .checked_add(account.lamports())
            .ok_or(ProgramError::ArithmeticOverflow)?;

        account.try_borrow_mut_data()?.fill(0);
        *destination.try_borrow_mut_lamports()? = destination_lamports;
        *account.try_borrow_mut_lamports()? = 0;

        // Zeroes owner and data length; the runtime reclaims the slot
        account.close()
    }
}
