//! Native Escrow Program
//!
//! Custodial account holding a fixed amount of lamports on behalf of an
//! initializer and a receiver. Only the initializer may fund, release or
//! cancel; the receiver is a passive beneficiary.
//!
//! ## Instructions
//!
//! - **InitializeEscrow** (0): Create the escrow PDA and record the terms
//! - **DepositEscrow** (1): Move `amount` lamports from initializer to escrow
//! - **ReleaseEscrow** (2): Pay `amount` to the receiver, mark released
//! - **CancelEscrow** (3): Refund everything to the initializer, close the PDA
//!
//! ## Account Structure
//!
//! ```text
//! Escrow (82 bytes), PDA ["ESCROW_SEED", initializer, receiver]:
//!   discriminator: [u8; 8] - b"ESCROW\0\x01"
//!   initializer: Pubkey    - Creates, funds and terminates
//!   receiver: Pubkey       - Payout recipient
//!   amount: u64            - Lamports to hold (LE)
//!   is_released: u8        - 0 or 1, monotonic
//!   bump: u8               - PDA bump seed
//! ```
//!
//! Handlers are generic over [`ledger::Ledger`]; on-chain they run against
//! the transaction's accounts, off-chain against [`ledger::memory::MemoryLedger`].

#![cfg_attr(target_os = "solana", no_std)]

// Always expose entrypoint for testing, but only register as entrypoint when feature enabled
pub mod entrypoint;

pub mod error;
pub mod guard;
pub mod instruction;
pub mod instructions;
pub mod ledger;
pub mod pda;
pub mod processor;
pub mod reader;
pub mod state;

#[cfg(not(target_os = "solana"))]
pub mod client;

// Panic handler for no_std builds (only for Solana BPF)
#[cfg(all(target_os = "solana", not(test)))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

pub use error::EscrowError;
pub use instruction::EscrowInstruction;
pub use pda::{derive_escrow_address, EscrowSeeds, ESCROW_SEED};
pub use state::{EscrowState, ESCROW_ACCOUNT_LEN};

pinocchio_pubkey::declare_id!("9JkhmwBvJ4kU9V8Ggu2HXXZkRZsqyZmNpd7HbnChbnkU");
