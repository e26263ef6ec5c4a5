// src/header/name.rs
use crate::error::Result;
use crate::header::{decode_preamble, BaseHeader, O2Header};
use crate::tag::{HeaderName, HeaderType};
use bytes::{BufMut, BytesMut};

/// Header carrying the name of an object, zero-padded to 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameHeader {
    pub base: BaseHeader,
    pub name: HeaderName,
}

impl NameHeader {
    /// Fails with `InvalidLength` if `name` is longer than 32 bytes.
    pub fn new(name: &str) -> Result<Self> {
        Ok(NameHeader {
            base: Self::default_base(),
            name: HeaderName::from_str_padded(name)?,
        })
    }

    pub fn name(&self) -> String {
        self.name.trimmed()
    }
}

impl O2Header for NameHeader {
    const HEADER_TYPE: HeaderType = HeaderType::new_padded(b"NameHead");
    const VERSION: u32 = 1;
    const SIZE: usize = BaseHeader::SIZE + HeaderName::SIZE;

    fn base(&self) -> &BaseHeader {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseHeader {
        &mut self.base
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let base = decode_preamble::<Self>(buf)?;
        Ok(NameHeader {
            base,
            name: HeaderName::from_bytes(&buf[BaseHeader::SIZE..Self::SIZE])?,
        })
    }

    fn encode_body(&self, out: &mut BytesMut) {
        out.put_slice(self.name.as_bytes());
    }
}
