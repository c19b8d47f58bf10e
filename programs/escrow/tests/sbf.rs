//! BPF tests against the compiled program
//!
//! Requires `cargo build-sbf` output; run with `cargo test-sbf --features test-sbf`.

#![cfg(feature = "test-sbf")]

use escrow_program::client::{
    cancel_escrow, decode_escrow, deposit_escrow, find_escrow_address, initialize_escrow,
    release_escrow,
};
use escrow_program::EscrowError;
use solana_program_test::{BanksClient, ProgramTest};
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::{Transaction, TransactionError},
};

const AMOUNT: u64 = 2 * LAMPORTS_PER_SOL;

fn program_id() -> Pubkey {
    Pubkey::new_from_array(escrow_program::ID)
}

async fn setup() -> (BanksClient, Keypair, Keypair, Pubkey) {
    let program_test = ProgramTest::new("escrow_program", program_id(), None);
    let (mut banks, payer, _) = program_test.start().await;

    let initializer = Keypair::new();
    let receiver = Pubkey::new_unique();
    let recent = banks.get_latest_blockhash().await.unwrap();
    let fund = Transaction::new_signed_with_payer(
        &[system_instruction::transfer(
            &payer.pubkey(),
            &initializer.pubkey(),
            10 * LAMPORTS_PER_SOL,
        )],
        Some(&payer.pubkey()),
        &[&payer],
        recent,
    );
    banks.process_transaction(fund).await.unwrap();

    (banks, payer, initializer, receiver)
}

async fn send(
    banks: &mut BanksClient,
    signer: &Keypair,
    ix: Instruction,
) -> Result<(), TransactionError> {
    let recent = banks.get_latest_blockhash().await.unwrap();
    let tx = Transaction::new_signed_with_payer(&[ix], Some(&signer.pubkey()), &[signer], recent);
    banks
        .process_transaction(tx)
        .await
        .map_err(|e| e.unwrap())
}

fn custom(err: EscrowError) -> TransactionError {
    TransactionError::InstructionError(0, InstructionError::Custom(err.code()))
}

#[tokio::test]
async fn test_initialize_deposit_release() {
    let (mut banks, _payer, initializer, receiver) = setup().await;
    let pid = program_id();
    let (escrow, bump) = find_escrow_address(&initializer.pubkey(), &receiver, &pid);

    let init = initialize_escrow(&pid, &initializer.pubkey(), &receiver, AMOUNT);
    send(&mut banks, &initializer, init).await.unwrap();
    send(&mut banks, &initializer, deposit_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap();

    let account = banks.get_account(escrow).await.unwrap().unwrap();
    let state = decode_escrow(&account.data).unwrap();
    assert_eq!(state.amount, AMOUNT);
    assert_eq!(state.bump, bump);
    assert!(!state.is_released);

    send(&mut banks, &initializer, release_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap();
    assert_eq!(banks.get_balance(receiver).await.unwrap(), AMOUNT);

    let account = banks.get_account(escrow).await.unwrap().unwrap();
    assert!(decode_escrow(&account.data).unwrap().is_released);

    let err = send(&mut banks, &initializer, cancel_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap_err();
    assert_eq!(err, custom(EscrowError::AlreadyReleased));
}

#[tokio::test]
async fn test_cancel_closes_escrow() {
    let (mut banks, _payer, initializer, receiver) = setup().await;
    let pid = program_id();
    let (escrow, _) = find_escrow_address(&initializer.pubkey(), &receiver, &pid);

    let init = initialize_escrow(&pid, &initializer.pubkey(), &receiver, AMOUNT);
    send(&mut banks, &initializer, init).await.unwrap();
    send(&mut banks, &initializer, deposit_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap();
    let before = banks.get_balance(initializer.pubkey()).await.unwrap();

    send(&mut banks, &initializer, cancel_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap();

    assert!(banks.get_account(escrow).await.unwrap().is_none());
    assert!(banks.get_balance(initializer.pubkey()).await.unwrap() >= before + AMOUNT - 5_000);
}

#[tokio::test]
async fn test_attacker_cannot_release() {
    let (mut banks, payer, initializer, receiver) = setup().await;
    let pid = program_id();

    let init = initialize_escrow(&pid, &initializer.pubkey(), &receiver, AMOUNT);
    send(&mut banks, &initializer, init).await.unwrap();
    send(&mut banks, &initializer, deposit_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap();

    // Attacker names itself as initializer; the stored initializer never signed
    let mut ix = release_escrow(&pid, &initializer.pubkey(), &receiver);
    ix.accounts[0].pubkey = payer.pubkey();
    let err = send(&mut banks, &payer, ix).await.unwrap_err();
    assert_eq!(err, custom(EscrowError::Unauthorized));
    assert_eq!(banks.get_balance(receiver).await.unwrap(), 0);
}

#[tokio::test]
async fn test_initialize_over_funded_address() {
    let (mut banks, payer, initializer, receiver) = setup().await;
    let pid = program_id();
    let (escrow, _) = find_escrow_address(&initializer.pubkey(), &receiver, &pid);

    // Leaves a system-owned, data-less account at the escrow address
    let gift = system_instruction::transfer(&payer.pubkey(), &escrow, LAMPORTS_PER_SOL);
    send(&mut banks, &payer, gift).await.unwrap();

    let init = initialize_escrow(&pid, &initializer.pubkey(), &receiver, AMOUNT);
    send(&mut banks, &initializer, init).await.unwrap();

    let account = banks.get_account(escrow).await.unwrap().unwrap();
    assert_eq!(account.owner, pid);
    assert_eq!(account.lamports, LAMPORTS_PER_SOL);
    assert_eq!(decode_escrow(&account.data).unwrap().amount, AMOUNT);

    send(&mut banks, &initializer, deposit_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap();
    send(&mut banks, &initializer, release_escrow(&pid, &initializer.pubkey(), &receiver))
        .await
        .unwrap();
    assert_eq!(banks.get_balance(receiver).await.unwrap(), AMOUNT);
}
