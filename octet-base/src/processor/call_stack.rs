use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
#[error("call stack capacity exceeded, pushing of address {address_not_pushed:X} failed")]
pub struct CallStackCapacityExceededError {
    pub address_not_pushed: u16,
}

/// Return addresses of the active subroutine calls, bounded to a fixed depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    addresses: Vec<u16>,
    max_len: usize,
}

impl CallStack {
    /// Maximum call depth of the CHIP-8.
    pub const DEFAULT_MAX_LEN: usize = 16;

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            addresses: Vec::with_capacity(max_len),
            max_len,
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.addresses.len() >= self.max_len
    }

    pub fn pop(&mut self) -> Option<u16> {
        self.addresses.pop()
    }

    pub fn push(&mut self, address: u16) -> Result<(), CallStackCapacityExceededError> {
        if self.is_full() {
            return Err(CallStackCapacityExceededError {
                address_not_pushed: address,
            });
        }
        self.addresses.push(address);
        Ok(())
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::with_max_len(Self::DEFAULT_MAX_LEN)
    }
}
