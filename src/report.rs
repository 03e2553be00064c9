//! Request encoding and the response layout shared by all peripherals.
//!
//! Every response starts with a fixed header:
//!
//! | Byte | Content            |
//! |------|--------------------|
//! | 0    | opcode echo        |
//! | 1    | status (OK / NOK)  |
//! | 2    | pin id echo        |
//! | 3..  | opcode payload     |
//!
//! Multi-byte payload fields are little-endian `u32`. On NOK, byte 3 holds
//! an opcode-scoped error code when present.

use crate::consts;
use crate::error::{Error, Result};

/// Builds the two-byte `[opcode, pin]` request every peripheral command uses.
#[inline]
pub fn encode_command(opcode: u8, pin: u8) -> [u8; 2] {
    [opcode, pin]
}

/// Decoded status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Nok,
    /// Anything else; always surfaced as `UnexpectedFirmwareResponse`.
    Other(u8),
}

impl From<u8> for Status {
    fn from(raw: u8) -> Self {
        match raw {
            consts::STATUS_OK => Status::Ok,
            consts::STATUS_NOK => Status::Nok,
            other => Status::Other(other),
        }
    }
}

/// A response whose header has been length-checked.
#[derive(Debug, Clone, Copy)]
pub struct Response<'a> {
    opcode: u8,
    bytes: &'a [u8],
}

impl<'a> Response<'a> {
    /// Wraps raw response bytes for `opcode`, requiring at least the
    /// opcode echo and status byte.
    pub fn parse(opcode: u8, bytes: &'a [u8]) -> Result<Self> {
        let response = Response { opcode, bytes };
        response.require_len(consts::RESP_HEADER_MIN_LEN)?;
        Ok(response)
    }

    pub fn status(&self) -> Status {
        Status::from(self.bytes[consts::RESP_OFFSET_STATUS])
    }

    pub fn raw_status(&self) -> u8 {
        self.bytes[consts::RESP_OFFSET_STATUS]
    }

    /// Pin echo, if the firmware sent one.
    pub fn pin(&self) -> Option<u8> {
        self.bytes.get(consts::RESP_OFFSET_PIN).copied()
    }

    /// Error code at byte 3, or 0 when the response stops before it.
    pub fn error_code(&self) -> u8 {
        self.bytes
            .get(consts::RESP_OFFSET_PAYLOAD)
            .copied()
            .unwrap_or(0)
    }

    /// Fails with `IncompleteResponse` when fewer than `min_len` bytes arrived.
    pub fn require_len(&self, min_len: usize) -> Result<()> {
        if self.bytes.len() < min_len {
            return Err(Error::IncompleteResponse {
                opcode: self.opcode,
                expected: min_len,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    /// Little-endian `u32` at `offset`.
    pub fn u32_le_at(&self, offset: usize) -> Result<u32> {
        self.require_len(offset + 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[offset..offset + 4]);
        Ok(u32::from_le_bytes(raw))
    }

    pub fn unexpected(&self) -> Error {
        Error::UnexpectedFirmwareResponse {
            opcode: self.opcode,
            status: self.raw_status(),
        }
    }
}
