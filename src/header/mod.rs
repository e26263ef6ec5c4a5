// src/header/mod.rs
//! Headers of the O2 header stack.
//!
//! Every header starts with a [`BaseHeader`] preamble and continues with its
//! own fixed-width fields. [`O2Header`] ties a header kind to the type tag
//! and version a dispatcher matches on after reading the preamble.

mod base;
mod data;
mod heartbeat;
mod name;

pub use base::BaseHeader;
pub use data::{DataHeader, DataIdentifier};
pub use heartbeat::{HeartbeatHeader, HeartbeatStatistics, HeartbeatTrailer};
pub use name::NameHeader;

use crate::error::{O2Error, Result};
use crate::tag::{HeaderType, SerializationMethod};
use bytes::{Bytes, BytesMut};

/// A header kind that can live in a header stack.
pub trait O2Header: Sized {
    /// Type tag written into the preamble.
    const HEADER_TYPE: HeaderType;
    const VERSION: u32;
    /// Encoded size, preamble included.
    const SIZE: usize;
    const SERIALIZATION: SerializationMethod = SerializationMethod::NONE;

    fn base(&self) -> &BaseHeader;

    fn base_mut(&mut self) -> &mut BaseHeader;

    /// Decodes the header at the start of `buf`.
    fn decode(buf: &[u8]) -> Result<Self>;

    /// Appends the fields that follow the preamble.
    fn encode_body(&self, out: &mut BytesMut);

    fn encode_into(&self, out: &mut BytesMut) {
        out.reserve(Self::SIZE);
        self.base().encode_into(out);
        self.encode_body(out);
    }

    fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(Self::SIZE);
        self.encode_into(&mut out);
        out.freeze()
    }

    /// A preamble carrying this kind's identity.
    fn default_base() -> BaseHeader {
        BaseHeader::new(
            Self::HEADER_TYPE,
            Self::SERIALIZATION,
            Self::SIZE as u32,
            Self::VERSION,
        )
    }
}

/// Decodes the preamble of a `T` and checks that the buffer really holds one.
pub(crate) fn decode_preamble<T: O2Header>(buf: &[u8]) -> Result<BaseHeader> {
    let base = BaseHeader::decode(buf)?;

    if base.header_type != T::HEADER_TYPE {
        return Err(O2Error::HeaderTypeMismatch {
            expected: T::HEADER_TYPE.trimmed(),
            found: base.header_type.trimmed(),
        });
    }

    if (base.hdrsz as usize) < T::SIZE {
        return Err(O2Error::InvalidHeaderSize {
            offset: 0,
            hdrsz: base.hdrsz,
            minimum: T::SIZE,
        });
    }

    if buf.len() < T::SIZE {
        return Err(O2Error::truncated(0, T::SIZE, buf.len()));
    }

    Ok(base)
}
