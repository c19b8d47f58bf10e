//! Escrow instruction handlers
//!
//! Each handler receives resolved account keys and a [`Ledger`](crate::ledger::Ledger);
//! dispatch and account-list validation live in [`crate::processor`].

pub mod cancel;
pub mod deposit;
pub mod initialize;
pub mod release;

pub use cancel::*;
pub use deposit::*;
pub use initialize::*;
pub use release::*;
