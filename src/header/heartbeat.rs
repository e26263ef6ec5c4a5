// src/header/heartbeat.rs
//! Heartbeat frame headers.
//!
//! A heartbeat frame is framed by two 64-bit words, [`HeartbeatHeader`] and
//! [`HeartbeatTrailer`]. [`HeartbeatStatistics`] travels in the header stack
//! of the frame and records when the frame was produced.

use crate::error::{O2Error, Result};
use crate::header::{decode_preamble, BaseHeader, O2Header};
use crate::tag::HeaderType;
use crate::utils::BitField;
use byteorder::{ByteOrder, LittleEndian};
use bytemuck::{Pod, Zeroable};
use bytes::{BufMut, BytesMut};

/// Timing statistics of a heartbeat frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeartbeatStatistics {
    pub base: BaseHeader,
    /// Time tick when the statistics were created.
    pub time_tick_ns: u64,
    /// Difference to the previous time tick.
    pub duration_ns: u64,
}

impl HeartbeatStatistics {
    pub fn new(time_tick_ns: u64, duration_ns: u64) -> Self {
        HeartbeatStatistics {
            base: Self::default_base(),
            time_tick_ns,
            duration_ns,
        }
    }
}

impl O2Header for HeartbeatStatistics {
    const HEADER_TYPE: HeaderType = HeaderType::new_padded(b"HBStats");
    const VERSION: u32 = 1;
    const SIZE: usize = BaseHeader::SIZE + 16;

    fn base(&self) -> &BaseHeader {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseHeader {
        &mut self.base
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let base = decode_preamble::<Self>(buf)?;
        Ok(HeartbeatStatistics {
            base,
            time_tick_ns: LittleEndian::read_u64(&buf[BaseHeader::SIZE..]),
            duration_ns: LittleEndian::read_u64(&buf[BaseHeader::SIZE + 8..]),
        })
    }

    fn encode_body(&self, out: &mut BytesMut) {
        out.put_u64_le(self.time_tick_ns);
        out.put_u64_le(self.duration_ns);
    }
}

fn word_from_bytes(bytes: &[u8]) -> Result<u64> {
    if bytes.len() != 8 {
        return Err(O2Error::InvalidLength {
            expected: 8,
            found: bytes.len(),
        });
    }
    Ok(LittleEndian::read_u64(bytes))
}

/// Opening word of a heartbeat frame.
///
/// ```text
/// bits  0..8   block type (1)
/// bits  8..16  header length in 64-bit words (1)
/// bits 16..64  orbit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct HeartbeatHeader(u64);

impl HeartbeatHeader {
    pub const BLOCK_TYPE: u8 = 0x1;

    const BLOCK_TYPE_FIELD: BitField = BitField::new(0, 0, 8);
    const LENGTH_FIELD: BitField = BitField::new(0, 8, 8);
    const ORBIT_FIELD: BitField = BitField::new(0, 16, 48);

    pub fn new(orbit: u64) -> Self {
        let mut words = [0u64];
        Self::BLOCK_TYPE_FIELD.pack(&mut words, Self::BLOCK_TYPE as u64);
        Self::LENGTH_FIELD.pack(&mut words, 1);
        Self::ORBIT_FIELD.pack(&mut words, orbit);
        HeartbeatHeader(words[0])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        word_from_bytes(bytes).map(HeartbeatHeader)
    }

    pub fn word(&self) -> u64 {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub fn block_type(&self) -> u8 {
        Self::BLOCK_TYPE_FIELD.unpack(&[self.0]) as u8
    }

    pub fn header_length(&self) -> u8 {
        Self::LENGTH_FIELD.unpack(&[self.0]) as u8
    }

    pub fn orbit(&self) -> u64 {
        Self::ORBIT_FIELD.unpack(&[self.0])
    }

    pub fn is_valid(&self) -> bool {
        self.block_type() == Self::BLOCK_TYPE
    }
}

impl Default for HeartbeatHeader {
    fn default() -> Self {
        HeartbeatHeader::new(0)
    }
}

/// Closing word of a heartbeat frame.
///
/// ```text
/// bits  0..8   block type (5)
/// bits  8..16  trailer length in 64-bit words (1)
/// bits 16..48  data length
/// bits 48..63  status
/// bit  63      heartbeat accepted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct HeartbeatTrailer(u64);

impl HeartbeatTrailer {
    pub const BLOCK_TYPE: u8 = 0x5;

    const BLOCK_TYPE_FIELD: BitField = BitField::new(0, 0, 8);
    const LENGTH_FIELD: BitField = BitField::new(0, 8, 8);
    const DATA_LENGTH_FIELD: BitField = BitField::new(0, 16, 32);
    const STATUS_FIELD: BitField = BitField::new(0, 48, 15);
    const ACCEPT_FIELD: BitField = BitField::new(0, 63, 1);

    pub fn new(data_length: u32, status: u16, accepted: bool) -> Self {
        let mut words = [0u64];
        Self::BLOCK_TYPE_FIELD.pack(&mut words, Self::BLOCK_TYPE as u64);
        Self::LENGTH_FIELD.pack(&mut words, 1);
        Self::DATA_LENGTH_FIELD.pack(&mut words, data_length as u64);
        Self::STATUS_FIELD.pack(&mut words, status as u64);
        Self::ACCEPT_FIELD.pack(&mut words, accepted as u64);
        HeartbeatTrailer(words[0])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        word_from_bytes(bytes).map(HeartbeatTrailer)
    }

    pub fn word(&self) -> u64 {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub fn block_type(&self) -> u8 {
        Self::BLOCK_TYPE_FIELD.unpack(&[self.0]) as u8
    }

    pub fn trailer_length(&self) -> u8 {
        Self::LENGTH_FIELD.unpack(&[self.0]) as u8
    }

    pub fn data_length(&self) -> u32 {
        Self::DATA_LENGTH_FIELD.unpack(&[self.0]) as u32
    }

    /// 15-bit status; higher bits passed to `new` are dropped.
    pub fn status(&self) -> u16 {
        Self::STATUS_FIELD.unpack(&[self.0]) as u16
    }

    pub fn accepted(&self) -> bool {
        Self::ACCEPT_FIELD.unpack(&[self.0]) != 0
    }

    pub fn is_valid(&self) -> bool {
        self.block_type() == Self::BLOCK_TYPE
    }
}

impl Default for HeartbeatTrailer {
    fn default() -> Self {
        HeartbeatTrailer::new(0, 0, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_word() {
        let hb = HeartbeatHeader::default();
        assert_eq!(hb.word(), 0x0000_0000_0000_0101);
        assert!(hb.is_valid());
    }

    #[test]
    fn test_header_orbit() {
        let hb = HeartbeatHeader::new(0x1234_5678_9abc);
        assert_eq!(hb.orbit(), 0x1234_5678_9abc);
        assert_eq!(hb.block_type(), 1);
        assert_eq!(hb.header_length(), 1);
        assert_eq!(HeartbeatHeader::from_bytes(&hb.to_bytes()).unwrap(), hb);
    }

    #[test]
    fn test_trailer_fields() {
        let trailer = HeartbeatTrailer::new(4096, 0x7fff, true);
        assert_eq!(trailer.block_type(), 5);
        assert_eq!(trailer.trailer_length(), 1);
        assert_eq!(trailer.data_length(), 4096);
        assert_eq!(trailer.status(), 0x7fff);
        assert!(trailer.accepted());

        let trailer = HeartbeatTrailer::new(1, 0xffff, false);
        assert_eq!(trailer.status(), 0x7fff);
        assert!(!trailer.accepted());
    }

    #[test]
    fn test_word_length_checked() {
        assert!(matches!(
            HeartbeatTrailer::from_bytes(&[0u8; 7]),
            Err(O2Error::InvalidLength { expected: 8, found: 7 })
        ));
    }

    #[test]
    fn test_words_cast_from_frame() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&HeartbeatHeader::new(42).to_bytes());
        frame.extend_from_slice(&HeartbeatTrailer::new(0, 0, true).to_bytes());
        let words: Vec<u64> = frame
            .chunks_exact(8)
            .map(LittleEndian::read_u64)
            .collect();
        let hb: HeartbeatHeader = bytemuck::cast(words[0]);
        let trailer: HeartbeatTrailer = bytemuck::cast(words[1]);
        assert_eq!(hb.orbit(), 42);
        assert!(trailer.accepted());
    }

    #[test]
    fn test_statistics_roundtrip() {
        let stats = HeartbeatStatistics::new(1_000_000, 88_924);
        let bytes = stats.to_bytes();
        assert_eq!(bytes.len(), 56);
        assert_eq!(HeartbeatStatistics::decode(&bytes).unwrap(), stats);
    }
}
