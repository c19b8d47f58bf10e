//! Escrow account state and its fixed-width codec
//!
//! Layout (little-endian, 82 bytes):
//!
//! ```text
//! [0..8]    discriminator  b"ESCROW\0\x01"
//! [8..40]   initializer
//! [40..72]  receiver
//! [72..80]  amount (u64)
//! [80]      is_released (0 | 1)
//! [81]      bump
//! ```
//!
//! Bytes past the record inside a larger allocation are ignored on decode.

use crate::error::EscrowError;
use crate::reader::{ByteReader, ByteWriter, ShortRead};
use pinocchio::pubkey::Pubkey;

/// Type tag and layout version prepended to every escrow record
pub const ESCROW_DISCRIMINATOR: [u8; 8] = *b"ESCROW\0\x01";

/// Encoded record without discriminator
pub const ESCROW_RECORD_LEN: usize = 32 + 32 + 8 + 1 + 1;

/// Size of the escrow account allocation: 82 bytes
pub const ESCROW_ACCOUNT_LEN: usize = ESCROW_DISCRIMINATOR.len() + ESCROW_RECORD_LEN;

/// Escrow account state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowState {
    /// Party who creates, funds and alone may terminate the escrow
    pub initializer: Pubkey,
    /// Passive payout recipient
    pub receiver: Pubkey,
    /// Lamports expected in custody once deposited
    pub amount: u64,
    /// Terminal flag, false -> true exactly once
    pub is_released: bool,
    /// Canonical bump of the escrow PDA
    pub bump: u8,
}

impl EscrowState {
    pub const LEN: usize = ESCROW_ACCOUNT_LEN;

    pub fn new(initializer: Pubkey, receiver: Pubkey, amount: u64, bump: u8) -> Self {
        Self {
            initializer,
            receiver,
            amount,
            is_released: false,
            bump,
        }
    }

    /// Decode from account data
    pub fn unpack(data: &[u8]) -> Result<Self, EscrowError> {
        let mut r = ByteReader::new(data);
        let discriminator = r.read_bytes::<8>().map_err(|_| EscrowError::MalformedAccount)?;
        if discriminator != ESCROW_DISCRIMINATOR {
            return Err(EscrowError::MalformedAccount);
        }

        let initializer = r.read_bytes::<32>().map_err(|_| EscrowError::MalformedAccount)?;
        let receiver = r.read_bytes::<32>().map_err(|_| EscrowError::MalformedAccount)?;
        let amount = r.read_u64().map_err(|_| EscrowError::MalformedAccount)?;
        let is_released = match r.read_u8().map_err(|_| EscrowError::MalformedAccount)? {
            0 => false,
            1 => true,
            _ => return Err(EscrowError::MalformedAccount),
        };
        let bump = r.read_u8().map_err(|_| EscrowError::MalformedAccount)?;

        Ok(Self {
            initializer,
            receiver,
            amount,
            is_released,
            bump,
        })
    }

    /// Encode into the first [`ESCROW_ACCOUNT_LEN`] bytes of `dst`
    pub fn pack_into(&self, dst: &mut [u8]) -> Result<(), EscrowError> {
        self.write(&mut ByteWriter::new(dst))
            .map_err(|_| EscrowError::MalformedAccount)
    }

    fn write(&self, w: &mut ByteWriter<'_>) -> Result<(), ShortRead> {
        w.write_bytes(&ESCROW_DISCRIMINATOR)?;
        w.write_bytes(&self.initializer)?;
        w.write_bytes(&self.receiver)?;
        w.write_u64(self.amount)?;
        w.write_u8(self.is_released as u8)?;
        w.write_u8(self.bump)
    }

    /// Encode into a fresh buffer of exactly [`ESCROW_ACCOUNT_LEN`] bytes
    pub fn to_bytes(&self) -> [u8; ESCROW_ACCOUNT_LEN] {
        let mut buf = [0u8; ESCROW_ACCOUNT_LEN];
        // Buffer is exactly LEN bytes, so the write cannot run short
        let _ = self.pack_into(&mut buf);
        buf
    }

    /// Flip the terminal flag
    pub fn mark_released(&mut self) -> Result<(), EscrowError> {
        if self.is_released {
            return Err(EscrowError::AlreadyReleased);
        }
        self.is_released = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EscrowState {
        EscrowState::new([1; 32], [2; 32], 2_000_000_000, 254)
    }

    #[test]
    fn test_escrow_size() {
        assert_eq!(ESCROW_RECORD_LEN, 74);
        assert_eq!(ESCROW_ACCOUNT_LEN, 82);
        assert_eq!(EscrowState::LEN, ESCROW_ACCOUNT_LEN);
    }

    #[test]
    fn test_field_offsets() {
        let bytes = sample().to_bytes();

        assert_eq!(&bytes[0..8], b"ESCROW\0\x01");
        assert_eq!(&bytes[8..40], &[1; 32]);
        assert_eq!(&bytes[40..72], &[2; 32]);
        assert_eq!(&bytes[72..80], &2_000_000_000u64.to_le_bytes());
        assert_eq!(bytes[80], 0);
        assert_eq!(bytes[81], 254);
    }

    #[test]
    fn test_unpack_after_release() {
        let mut escrow = sample();
        escrow.mark_released().unwrap();
        let bytes = escrow.to_bytes();
        assert_eq!(bytes[80], 1);

        let decoded = EscrowState::unpack(&bytes).unwrap();
        assert!(decoded.is_released);
        assert_eq!(decoded, escrow);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut buf = [0xAAu8; ESCROW_ACCOUNT_LEN + 16];
        sample().pack_into(&mut buf).unwrap();
        assert_eq!(EscrowState::unpack(&buf).unwrap(), sample());
    }

    #[test]
    fn test_short_data_is_malformed() {
        let bytes = sample().to_bytes();
        for len in [0, 7, 8, 40, 72, 80, ESCROW_ACCOUNT_LEN - 1] {
            assert_eq!(
                EscrowState::unpack(&bytes[..len]),
                Err(EscrowError::MalformedAccount),
                "len {}",
                len
            );
        }
    }

    #[test]
    fn test_bad_release_flag_is_malformed() {
        let mut bytes = sample().to_bytes();
        bytes[80] = 2;
        assert_eq!(EscrowState::unpack(&bytes), Err(EscrowError::MalformedAccount));
    }

    #[test]
    fn test_wrong_discriminator_is_malformed() {
        let mut bytes = sample().to_bytes();
        bytes[7] = 0x02;
        assert_eq!(EscrowState::unpack(&bytes), Err(EscrowError::MalformedAccount));

        let zeroed = [0u8; ESCROW_ACCOUNT_LEN];
        assert_eq!(EscrowState::unpack(&zeroed), Err(EscrowError::MalformedAccount));
    }

    #[test]
    fn test_pack_into_short_buffer_fails() {
        let mut buf = [0u8; ESCROW_ACCOUNT_LEN - 1];
        assert_eq!(sample().pack_into(&mut buf), Err(EscrowError::MalformedAccount));
    }

    #[test]
    fn test_release_is_monotonic() {
        let mut escrow = sample();
        assert!(!escrow.is_released);
        escrow.mark_released().unwrap();
        assert_eq!(escrow.mark_released(), Err(EscrowError::AlreadyReleased));
        assert!(escrow.is_released);
    }
}
