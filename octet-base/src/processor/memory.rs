use std::ops::Range;

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
#[error("access of {len} bytes at address {address:#05X} exceeds the memory length {:#X}", Memory::LEN)]
pub struct OutOfBoundsError {
    pub address: u16,
    pub len: usize,
}

/// The byte addressable memory of the CHIP-8.
///
/// All accesses are bounds checked and fail with an [`OutOfBoundsError`]
/// instead of wrapping around or panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: [u8; Self::LEN],
}

impl Memory {
    /// Length of memory in bytes.
    pub const LEN: usize = 4096;

    /// Address at which programs are loaded and execution starts.
    pub const PROGRAM_START: u16 = 0x200;

    /// Number of bytes available to a program, from [`Self::PROGRAM_START`] to the end of memory.
    pub const PROGRAM_CAPACITY: usize = Self::LEN - Self::PROGRAM_START as usize;

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn range(address: u16, len: usize) -> Result<Range<usize>, OutOfBoundsError> {
        let start = address as usize;
        match start.checked_add(len) {
            Some(end) if end <= Self::LEN => Ok(start..end),
            _ => Err(OutOfBoundsError { address, len }),
        }
    }

    pub fn read(&self, address: u16, len: usize) -> Result<&[u8], OutOfBoundsError> {
        Ok(&self.bytes[Self::range(address, len)?])
    }

    pub(crate) fn read_mut(&mut self, address: u16, len: usize) -> Result<&mut [u8], OutOfBoundsError> {
        Ok(&mut self.bytes[Self::range(address, len)?])
    }

    pub fn write(&mut self, address: u16, data: &[u8]) -> Result<(), OutOfBoundsError> {
        self.read_mut(address, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Read the big-endian word at `address`.
    pub fn read_word(&self, address: u16) -> Result<u16, OutOfBoundsError> {
        let word = self.read(address, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            bytes: [0; Self::LEN],
        }
    }
}
