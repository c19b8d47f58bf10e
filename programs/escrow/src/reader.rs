//! Little-endian byte reading helpers
//!
//! Shared by instruction decoding and the escrow account codec. Every read is
//! bounds checked; callers map [`ShortRead`] to the error that fits their input.

/// Input ended before the requested field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortRead;

/// Read a u8 at `offset`
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, ShortRead> {
    data.get(offset).copied().ok_or(ShortRead)
}

/// Read a u64 (little-endian) at `offset`
#[inline]
pub fn read_u64(data: &[u8], offset: usize) -> Result<u64, ShortRead> {
    read_bytes::<8>(data, offset).map(u64::from_le_bytes)
}

/// Read a fixed-size byte array at `offset`
#[inline]
pub fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], ShortRead> {
    let end = offset.checked_add(N).ok_or(ShortRead)?;
    if end > data.len() {
        return Err(ShortRead);
    }
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[offset..end]);
    Ok(bytes)
}

/// Sequential reader with tracked offset
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, ShortRead> {
        let val = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(val)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, ShortRead> {
        let val = read_u64(self.data, self.offset)?;
        self.offset += 8;
        Ok(val)
    }

    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], ShortRead> {
        let val = read_bytes(self.data, self.offset)?;
        self.offset += N;
        Ok(val)
    }
}

/// Sequential writer over a fixed buffer; the caller sizes the buffer
pub struct ByteWriter<'a> {
    data: &'a mut [u8],
    offset: usize,
}

impl<'a> ByteWriter<'a> {
    #[inline]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ShortRead> {
        let end = self.offset.checked_add(bytes.len()).ok_or(ShortRead)?;
        let dst = self.data.get_mut(self.offset..end).ok_or(ShortRead)?;
        dst.copy_from_slice(bytes);
        self.offset = end;
        Ok(())
    }

    #[inline]
    pub fn write_u8(&mut self, val: u8) -> Result<(), ShortRead> {
        self.write_bytes(&[val])
    }

    #[inline]
    pub fn write_u64(&mut self, val: u64) -> Result<(), ShortRead> {
        self.write_bytes(&val.to_le_bytes())
    }
}
