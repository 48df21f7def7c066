use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

use crate::processor::Memory;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read the ROM file `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "a program with a length ({program_len:#X}) greater than the memory available to programs ({capacity:#X}) was supplied"
    )]
    ProgramTooLarge { program_len: usize, capacity: usize },
}

/// A program image, guaranteed to fit into memory at [`Memory::PROGRAM_START`].
///
/// ROMs are raw big-endian instruction words without any header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    bytes: Box<[u8]>,
}

impl Rom {
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Result<Self, LoadError> {
        let bytes = bytes.into();
        if bytes.len() > Memory::PROGRAM_CAPACITY {
            return Err(LoadError::ProgramTooLarge {
                program_len: bytes.len(),
                capacity: Memory::PROGRAM_CAPACITY,
            });
        }
        Ok(Self { bytes })
    }

    /// Read the ROM file at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let rom = Self::from_bytes(bytes)?;
        info!(path = %path.display(), len = rom.len(), "loaded ROM");
        Ok(rom)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
