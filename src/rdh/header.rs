// src/rdh/header.rs
use crate::error::{O2Error, Result};
use crate::rdh::layout::{RdhField, RdhLayout};
use byteorder::{ByteOrder, LittleEndian};
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// RAWDataHeader: the 32-byte descriptor in front of every raw readout page.
///
/// Four little-endian 64-bit words. Field positions come from the
/// [`RdhLayout`] selected by the version byte (byte 0 of word 0), so every
/// accessor reads through the layout table rather than fixed offsets.
///
/// ```
/// use o2_headers::rdh::RawDataHeader;
///
/// let mut bytes = [0u8; 32];
/// bytes[..8].copy_from_slice(&[0x01, 0x08, 0x00, 0x12, 0x34, 0x05, 0x08, 0x00]);
/// let rdh = RawDataHeader::from_bytes(&bytes).unwrap();
/// assert_eq!(rdh.version(), 1);
/// assert_eq!(rdh.block_length(), 8);
/// assert_eq!(rdh.fee_id(), 0x3412);
/// assert_eq!(rdh.link_id(), 5);
/// assert_eq!(rdh.header_size(), 8);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(C)]
pub struct RawDataHeader {
    bytes: [u8; 32],
}

/// Plain values of every field the layout pins down, used to build a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RdhFields {
    pub version: u8,
    pub block_length: u16,
    pub fee_id: u16,
    pub link_id: u8,
    /// Header size in 64-bit words.
    pub header_size: u8,
    pub trigger_orbit: u32,
    pub heartbeat_orbit: u32,
    pub stop_code: u8,
    pub detector_field: u16,
    pub par: u16,
    pub pages_counter: u16,
}

impl RawDataHeader {
    pub const SIZE: usize = 32;
    pub const WORDS: usize = 4;

    /// Reads a record from exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = <[u8; Self::SIZE]>::try_from(bytes).map_err(|_| O2Error::InvalidLength {
            expected: Self::SIZE,
            found: bytes.len(),
        })?;
        Ok(RawDataHeader { bytes })
    }

    pub fn from_words(words: [u64; Self::WORDS]) -> Self {
        let mut bytes = [0u8; Self::SIZE];
        LittleEndian::write_u64_into(&words, &mut bytes);
        RawDataHeader { bytes }
    }

    /// Views a buffer of back-to-back records without copying.
    pub fn cast_slice(buf: &[u8]) -> Result<&[RawDataHeader]> {
        if buf.len() % Self::SIZE != 0 {
            return Err(O2Error::InvalidLength {
                expected: (buf.len() / Self::SIZE + 1) * Self::SIZE,
                found: buf.len(),
            });
        }
        Ok(bytemuck::cast_slice(buf))
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.bytes
    }

    pub fn words(&self) -> [u64; Self::WORDS] {
        let mut words = [0u64; Self::WORDS];
        LittleEndian::read_u64_into(&self.bytes, &mut words);
        words
    }

    pub fn layout(&self) -> &'static RdhLayout {
        let version = RdhLayout::VERSION_FIELD.unpack(&self.words()) as u8;
        RdhLayout::for_version(version)
    }

    /// Raw value of `field`, or `None` if this record's layout does not place it.
    pub fn get(&self, field: RdhField) -> Option<u64> {
        let words = self.words();
        self.layout().field(field).map(|bits| bits.unpack(&words))
    }

    fn pinned(&self, field: RdhField) -> u64 {
        self.get(field).unwrap_or(0)
    }

    pub fn version(&self) -> u8 {
        self.bytes[0]
    }

    pub fn block_length(&self) -> u16 {
        self.pinned(RdhField::BlockLength) as u16
    }

    pub fn fee_id(&self) -> u16 {
        self.pinned(RdhField::FeeId) as u16
    }

    pub fn link_id(&self) -> u8 {
        self.pinned(RdhField::LinkId) as u8
    }

    pub fn header_size(&self) -> u8 {
        self.pinned(RdhField::HeaderSize) as u8
    }

    pub fn trigger_orbit(&self) -> u32 {
        self.pinned(RdhField::TriggerOrbit) as u32
    }

    pub fn heartbeat_orbit(&self) -> u32 {
        self.pinned(RdhField::HeartbeatOrbit) as u32
    }

    pub fn trigger_bc_id(&self) -> Option<u32> {
        self.get(RdhField::TriggerBcId).map(|v| v as u32)
    }

    pub fn trigger_type(&self) -> Option<u32> {
        self.get(RdhField::TriggerType).map(|v| v as u32)
    }

    pub fn heartbeat_bc_id(&self) -> Option<u32> {
        self.get(RdhField::HeartbeatBcId).map(|v| v as u32)
    }

    /// Bit 0 is set on the last page of a block.
    pub fn stop_code(&self) -> u8 {
        self.pinned(RdhField::StopCode) as u8
    }

    pub fn detector_field(&self) -> u16 {
        self.pinned(RdhField::DetectorField) as u16
    }

    pub fn par(&self) -> u16 {
        self.pinned(RdhField::Par) as u16
    }

    /// Page index within a block, counting from 0.
    pub fn pages_counter(&self) -> u16 {
        self.pinned(RdhField::PagesCounter) as u16
    }

    pub fn is_last_page(&self) -> bool {
        self.stop_code() & 0x1 != 0
    }

    /// Packs `fields` using the layout of `fields.version`. Bits outside
    /// every placed field stay zero.
    pub fn from_fields(fields: &RdhFields) -> Self {
        let layout = RdhLayout::for_version(fields.version);
        let mut words = [0u64; Self::WORDS];

        let values = [
            (RdhField::Version, fields.version as u64),
            (RdhField::BlockLength, fields.block_length as u64),
            (RdhField::FeeId, fields.fee_id as u64),
            (RdhField::LinkId, fields.link_id as u64),
            (RdhField::HeaderSize, fields.header_size as u64),
            (RdhField::TriggerOrbit, fields.trigger_orbit as u64),
            (RdhField::HeartbeatOrbit, fields.heartbeat_orbit as u64),
            (RdhField::StopCode, fields.stop_code as u64),
            (RdhField::DetectorField, fields.detector_field as u64),
            (RdhField::Par, fields.par as u64),
            (RdhField::PagesCounter, fields.pages_counter as u64),
        ];
        for (field, value) in values {
            if let Some(bits) = layout.field(field) {
                bits.pack(&mut words, value);
            }
        }

        Self::from_words(words)
    }

    pub fn fields(&self) -> RdhFields {
        RdhFields {
            version: self.version(),
            block_length: self.block_length(),
            fee_id: self.fee_id(),
            link_id: self.link_id(),
            header_size: self.header_size(),
            trigger_orbit: self.trigger_orbit(),
            heartbeat_orbit: self.heartbeat_orbit(),
            stop_code: self.stop_code(),
            detector_field: self.detector_field(),
            par: self.par(),
            pages_counter: self.pages_counter(),
        }
    }
}

impl From<&RdhFields> for RawDataHeader {
    fn from(fields: &RdhFields) -> Self {
        RawDataHeader::from_fields(fields)
    }
}

impl TryFrom<&[u8]> for RawDataHeader {
    type Error = O2Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        RawDataHeader::from_bytes(bytes)
    }
}

impl fmt::Debug for RawDataHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDataHeader")
            .field("version", &self.version())
            .field("block_length", &self.block_length())
            .field("fee_id", &format_args!("{:#06x}", self.fee_id()))
            .field("link_id", &self.link_id())
            .field("header_size", &self.header_size())
            .field("trigger_orbit", &self.trigger_orbit())
            .field("heartbeat_orbit", &self.heartbeat_orbit())
            .field("stop_code", &self.stop_code())
            .field("detector_field", &self.detector_field())
            .field("par", &self.par())
            .field("pages_counter", &self.pages_counter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_word(index: usize, word: [u8; 8]) -> RawDataHeader {
        let mut bytes = [0u8; 32];
        bytes[index * 8..index * 8 + 8].copy_from_slice(&word);
        RawDataHeader::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<RawDataHeader>(), 32);
        assert_eq!(std::mem::align_of::<RawDataHeader>(), 1);
    }

    #[test]
    fn test_word1_orbits() {
        let rdh = with_word(1, [0x78, 0x56, 0x34, 0x12, 0xef, 0xcd, 0xab, 0x90]);
        assert_eq!(rdh.trigger_orbit(), 0x1234_5678);
        assert_eq!(rdh.heartbeat_orbit(), 0x90ab_cdef);
    }

    #[test]
    fn test_word2_fields() {
        let rdh = with_word(2, [0xff, 0xff, 0x01, 0x22, 0x11, 0x44, 0x33, 0xff]);
        assert_eq!(rdh.stop_code(), 1);
        assert!(rdh.is_last_page());
        assert_eq!(rdh.detector_field(), 0x1122);
        assert_eq!(rdh.par(), 0x3344);
    }

    #[test]
    fn test_word3_pages() {
        let rdh = with_word(3, [0x02, 0x01, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(rdh.pages_counter(), 0x0102);
    }

    #[test]
    fn test_unpinned_fields_are_none() {
        let rdh = with_word(2, [0xff; 8]);
        assert_eq!(rdh.trigger_bc_id(), None);
        assert_eq!(rdh.trigger_type(), None);
        assert_eq!(rdh.heartbeat_bc_id(), None);
    }

    #[test]
    fn test_encode_zero_fills() {
        let fields = RdhFields {
            version: 1,
            block_length: u16::MAX,
            fee_id: u16::MAX,
            link_id: u8::MAX,
            header_size: u8::MAX,
            trigger_orbit: u32::MAX,
            heartbeat_orbit: u32::MAX,
            stop_code: u8::MAX,
            detector_field: u16::MAX,
            par: u16::MAX,
            pages_counter: u16::MAX,
        };
        let words = RawDataHeader::from_fields(&fields).words();
        assert_eq!(words[0], 0x00ff_ffff_ffff_ff01);
        assert_eq!(words[1], u64::MAX);
        assert_eq!(words[2], 0x00ff_ffff_ffff_0000);
        assert_eq!(words[3], 0x0000_0000_0000_ffff);
    }

    #[test]
    fn test_cast_slice() {
        let a = RawDataHeader::from_fields(&RdhFields { version: 1, pages_counter: 0, ..Default::default() });
        let b = RawDataHeader::from_fields(&RdhFields { version: 1, pages_counter: 1, stop_code: 1, ..Default::default() });
        let mut buf = Vec::new();
        buf.extend_from_slice(a.as_bytes());
        buf.extend_from_slice(b.as_bytes());

        let pages = RawDataHeader::cast_slice(&buf).unwrap();
        assert_eq!(pages, &[a, b]);
        assert!(pages[1].is_last_page());

        assert!(matches!(
            RawDataHeader::cast_slice(&buf[..40]),
            Err(O2Error::InvalidLength { expected: 64, found: 40 })
        ));
    }
}
