// src/error.rs
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum O2Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid length: expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("Magic mismatch: expected \"O2O2\", found {found:02x?}")]
    MagicMismatch { found: [u8; 4] },

    #[error("Truncated buffer at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid header size {hdrsz} at offset {offset} (minimum {minimum})")]
    InvalidHeaderSize {
        offset: usize,
        hdrsz: u32,
        minimum: usize,
    },

    #[error("Header type mismatch: expected {expected:?}, found {found:?}")]
    HeaderTypeMismatch { expected: String, found: String },

    #[error("Header stack exceeds {limit} headers")]
    TooManyHeaders { limit: usize },
}

impl O2Error {
    pub(crate) fn truncated(offset: usize, needed: usize, available: usize) -> Self {
        O2Error::TruncatedBuffer {
            offset,
            needed,
            available,
        }
    }

    /// Shifts a buffer-relative offset by `base`, for errors raised on a
    /// sub-slice of a larger buffer.
    pub(crate) fn at_offset(self, base: usize) -> Self {
        match self {
            O2Error::TruncatedBuffer {
                offset,
                needed,
                available,
            } => O2Error::TruncatedBuffer {
                offset: offset + base,
                needed,
                available,
            },
            O2Error::InvalidHeaderSize {
                offset,
                hdrsz,
                minimum,
            } => O2Error::InvalidHeaderSize {
                offset: offset + base,
                hdrsz,
                minimum,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, O2Error>;
