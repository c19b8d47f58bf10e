//! Escrow error kinds
//!
//! Every kind maps to `ProgramError::Custom(code)`; the code is stable and is
//! what clients see in a failed transaction.

use core::fmt;
use pinocchio::program_error::ProgramError;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowError {
    /// Required initializer did not sign
    Unauthorized = 0,
    /// Escrow has already been released
    AlreadyReleased = 1,
    /// Escrow address or receiver does not match the stored terms
    AddressMismatch = 2,
    /// Escrow address already holds program-owned state
    AlreadyExists = 3,
    /// Amount must be greater than zero
    InvalidAmount = 4,
    /// Payer cannot cover the transfer
    InsufficientFunds = 5,
    /// Escrow balance is below the declared amount
    InsufficientEscrow = 6,
    /// Stored bytes do not decode
    MalformedAccount = 7,
    /// No escrow lives at the supplied address
    NotFound = 8,
    /// Escrow already holds the declared amount
    AlreadyFunded = 9,
}

impl EscrowError {
    pub const ALL: [EscrowError; 10] = [
        EscrowError::Unauthorized,
        EscrowError::AlreadyReleased,
        EscrowError::AddressMismatch,
        EscrowError::AlreadyExists,
        EscrowError::InvalidAmount,
        EscrowError::InsufficientFunds,
        EscrowError::InsufficientEscrow,
        EscrowError::MalformedAccount,
        EscrowError::NotFound,
        EscrowError::AlreadyFunded,
    ];

    /// Custom error code carried by `ProgramError::Custom`
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Recover the escrow kind from a program error, if it is one of ours
    pub fn from_program_error(err: &ProgramError) -> Option<Self> {
        match err {
            ProgramError::Custom(code) => Self::try_from(*code).ok(),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EscrowError::Unauthorized => "Unauthorized action",
            EscrowError::AlreadyReleased => "Escrow already released",
            EscrowError::AddressMismatch => "Account does not match escrow terms",
            EscrowError::AlreadyExists => "Escrow already exists",
            EscrowError::InvalidAmount => "Amount must be greater than zero",
            EscrowError::InsufficientFunds => "Insufficient balance",
            EscrowError::InsufficientEscrow => "Escrow balance below declared amount",
            EscrowError::MalformedAccount => "Escrow account data is malformed",
            EscrowError::NotFound => "Escrow does not exist",
            EscrowError::AlreadyFunded => "Escrow already funded",
        }
    }
}

impl TryFrom<u32> for EscrowError {
    type Error = u32;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL.get(code as usize).copied().ok_or(code)
    }
}

impl fmt::Display for EscrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EscrowError> for ProgramError {
    fn from(e: EscrowError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
