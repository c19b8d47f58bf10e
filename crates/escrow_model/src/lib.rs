//! Pure escrow model for property testing and Kani verification
//! No Solana dependencies, no unwrap/panic, all transitions total

pub mod helpers;
pub mod state;
pub mod transitions;

#[cfg(kani)]
mod proofs;

// Re-export commonly used types
pub use helpers::*;
pub use state::*;
pub use transitions::*;
