// src/header/base.rs
use crate::error::{O2Error, Result};
use crate::tag::{HeaderType, Magic, SerializationMethod};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use bytes::{BufMut, BytesMut};
use std::io::Write;
use tracing::debug;

/// Common preamble of every header in a stack.
///
/// ```text
/// offset  size  field
///      0     4  magic "O2O2"
///      4     4  hdrsz          size of this header, preamble included
///      8     4  flags          bit 0: another header follows
///     12     4  version
///     16    16  header type
///     32     8  serialization
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseHeader {
    pub hdrsz: u32,
    pub flags: u32,
    pub version: u32,
    pub header_type: HeaderType,
    pub serialization: SerializationMethod,
}

impl BaseHeader {
    pub const SIZE: usize = 40;
    pub const FLAG_NEXT_HEADER: u32 = 1 << 0;

    const HDRSZ_OFFSET: usize = 4;
    const FLAGS_OFFSET: usize = 8;
    const VERSION_OFFSET: usize = 12;
    const TYPE_OFFSET: usize = 16;
    const SERIALIZATION_OFFSET: usize = 32;

    pub fn new(
        header_type: HeaderType,
        serialization: SerializationMethod,
        hdrsz: u32,
        version: u32,
    ) -> Self {
        BaseHeader {
            hdrsz,
            flags: 0,
            version,
            header_type,
            serialization,
        }
    }

    /// True if another header follows this one in the stack.
    pub fn has_next(&self) -> bool {
        self.flags & Self::FLAG_NEXT_HEADER != 0
    }

    pub fn set_next(&mut self, value: bool) {
        if value {
            self.flags |= Self::FLAG_NEXT_HEADER;
        } else {
            self.flags &= !Self::FLAG_NEXT_HEADER;
        }
    }

    /// Decodes the preamble at the start of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_at(buf, 0)
    }

    /// Decodes the preamble starting at `offset`. Error offsets are absolute.
    pub fn decode_at(buf: &[u8], offset: usize) -> Result<Self> {
        let rest = buf.get(offset..).unwrap_or(&[]);

        if rest.len() < Magic::SIZE {
            debug!(offset, available = rest.len(), "buffer too short for magic");
            return Err(O2Error::truncated(offset, Self::SIZE, rest.len()));
        }

        let magic = Magic::from_bytes(&rest[..Magic::SIZE])?;
        if magic != Magic::O2 {
            debug!(offset, found = ?magic, "magic mismatch");
            return Err(O2Error::MagicMismatch {
                found: *magic.as_bytes(),
            });
        }

        if rest.len() < Self::SIZE {
            debug!(offset, available = rest.len(), "buffer too short for preamble");
            return Err(O2Error::truncated(offset, Self::SIZE, rest.len()));
        }

        Ok(BaseHeader {
            hdrsz: LittleEndian::read_u32(&rest[Self::HDRSZ_OFFSET..]),
            flags: LittleEndian::read_u32(&rest[Self::FLAGS_OFFSET..]),
            version: LittleEndian::read_u32(&rest[Self::VERSION_OFFSET..]),
            header_type: HeaderType::from_bytes(
                &rest[Self::TYPE_OFFSET..Self::TYPE_OFFSET + HeaderType::SIZE],
            )?,
            serialization: SerializationMethod::from_bytes(
                &rest[Self::SERIALIZATION_OFFSET..Self::SERIALIZATION_OFFSET + SerializationMethod::SIZE],
            )?,
        })
    }

    pub fn encode_into(&self, out: &mut BytesMut) {
        out.reserve(Self::SIZE);
        out.put_slice(Magic::O2.as_bytes());
        out.put_u32_le(self.hdrsz);
        out.put_u32_le(self.flags);
        out.put_u32_le(self.version);
        out.put_slice(self.header_type.as_bytes());
        out.put_slice(self.serialization.as_bytes());
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(Magic::O2.as_bytes())?;
        writer.write_u32::<LittleEndian>(self.hdrsz)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_all(self.header_type.as_bytes())?;
        writer.write_all(self.serialization.as_bytes())?;
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..Magic::SIZE].copy_from_slice(Magic::O2.as_bytes());
        LittleEndian::write_u32(&mut bytes[Self::HDRSZ_OFFSET..], self.hdrsz);
        LittleEndian::write_u32(&mut bytes[Self::FLAGS_OFFSET..], self.flags);
        LittleEndian::write_u32(&mut bytes[Self::VERSION_OFFSET..], self.version);
        bytes[Self::TYPE_OFFSET..Self::SERIALIZATION_OFFSET]
            .copy_from_slice(self.header_type.as_bytes());
        bytes[Self::SERIALIZATION_OFFSET..].copy_from_slice(self.serialization.as_bytes());
        bytes
    }

    /// Sets or clears the continuation bit of an already encoded preamble.
    pub(crate) fn patch_hdrsz(encoded: &mut [u8], hdrsz: u32) {
        LittleEndian::write_u32(&mut encoded[Self::HDRSZ_OFFSET..Self::HDRSZ_OFFSET + 4], hdrsz);
    }

    pub(crate) fn patch_next_flag(encoded: &mut [u8], value: bool) {
        let field = &mut encoded[Self::FLAGS_OFFSET..Self::FLAGS_OFFSET + 4];
        let mut flags = LittleEndian::read_u32(field);
        if value {
            flags |= Self::FLAG_NEXT_HEADER;
        } else {
            flags &= !Self::FLAG_NEXT_HEADER;
        }
        LittleEndian::write_u32(field, flags);
    }
}
