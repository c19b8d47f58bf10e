//! Deposit escrow instruction

use crate::error::EscrowError;
use crate::guard::authorize;
use crate::ledger::Ledger;
use crate::processor::log_lamports;
use crate::state::ESCROW_ACCOUNT_LEN;
use pinocchio::{msg, pubkey::Pubkey, ProgramResult};

/// Move the recorded `amount` from the initializer into the escrow.
///
/// Rejected once the escrow already covers rent plus `amount`.
pub fn process_deposit<L: Ledger>(
    ledger: &mut L,
    program_id: &Pubkey,
    initializer: &Pubkey,
    escrow: &Pubkey,
) -> ProgramResult {
    let guarded = authorize(ledger, program_id, escrow, None)?;
    let state = guarded.state;

    if state.initializer != *initializer {
        msg!("Error: Initializer does not match escrow");
        return Err(EscrowError::Unauthorized.into());
    }

    let rent = ledger.minimum_balance(ESCROW_ACCOUNT_LEN)?;
    let target = rent
        .checked_add(state.amount)
        .ok_or(EscrowError::InvalidAmount)?;
    if ledger.balance(escrow)? >= target {
        msg!("Error: Escrow already funded");
        return Err(EscrowError::AlreadyFunded.into());
    }

    if ledger.balance(initializer)? < state.amount {
        msg!("Error: Initializer cannot fund escrow");
        return Err(EscrowError::InsufficientFunds.into());
    }

    ledger.transfer(initializer, escrow, state.amount)?;

    log_lamports("Escrow funded: ", state.amount);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::MemoryLedger;
    use crate::pda::derive_escrow_address;

    const PROGRAM: Pubkey = [7; 32];
    const ALICE: Pubkey = [1; 32];
    const BOB: Pubkey = [2; 32];
    const SYSTEM: Pubkey = pinocchio_system::ID;

    fn initialized(amount: u64, funds: u64) -> (MemoryLedger, Pubkey) {
        let mut ledger = MemoryLedger::new(PROGRAM);
        ledger.airdrop(ALICE, funds);
        let (escrow, _) = derive_escrow_address(&ALICE, &BOB, &PROGRAM);
        let mut data = [0u8; 9];
        data[1..].copy_from_slice(&amount.to_le_bytes());
        ledger
            .process_transaction(&[ALICE], &data, &[ALICE, BOB, escrow, SYSTEM])
            .unwrap();
        (ledger, escrow)
    }

    #[test]
    fn test_deposit_moves_amount() {
        let (mut ledger, escrow) = initialized(1_000, 10_000_000);
        let rent = ledger.rent().minimum_balance(ESCROW_ACCOUNT_LEN);
        let before = ledger.lamports(&ALICE);

        ledger
            .process_transaction(&[ALICE], &[1], &[ALICE, escrow, SYSTEM])
            .unwrap();

        assert_eq!(ledger.lamports(&escrow), rent + 1_000);
        assert_eq!(ledger.lamports(&ALICE), before - 1_000);
    }

    #[test]
    fn test_second_deposit_rejected() {
        let (mut ledger, escrow) = initialized(1_000, 10_000_000);
        ledger
            .process_transaction(&[ALICE], &[1], &[ALICE, escrow, SYSTEM])
            .unwrap();
        assert_eq!(
            ledger.process_transaction(&[ALICE], &[1], &[ALICE, escrow, SYSTEM]),
            Err(EscrowError::AlreadyFunded.into())
        );
    }

    #[test]
    fn test_deposit_without_funds() {
        let rent = MemoryLedger::new(PROGRAM).rent().minimum_balance(ESCROW_ACCOUNT_LEN);
        let (mut ledger, escrow) = initialized(1_000_000, rent + 10);
        assert_eq!(
            ledger.process_transaction(&[ALICE], &[1], &[ALICE, escrow, SYSTEM]),
            Err(EscrowError::InsufficientFunds.into())
        );
        assert_eq!(ledger.lamports(&escrow), rent);
    }

    #[test]
    fn test_deposit_by_stranger() {
        let (mut ledger, escrow) = initialized(1_000, 10_000_000);
        ledger.airdrop(BOB, 10_000_000);
        // Initializer did not sign
        assert_eq!(
            ledger.process_transaction(&[BOB], &[1], &[BOB, escrow, SYSTEM]),
            Err(EscrowError::Unauthorized.into())
        );
    }

    #[test]
    fn test_deposit_into_missing_escrow() {
        let mut ledger = MemoryLedger::new(PROGRAM);
        ledger.airdrop(ALICE, 10_000_000);
        let (escrow, _) = derive_escrow_address(&ALICE, &BOB, &PROGRAM);
        assert_eq!(
            ledger.process_transaction(&[ALICE], &[1], &[ALICE, escrow, SYSTEM]),
            Err(EscrowError::NotFound.into())
        );
    }
}
