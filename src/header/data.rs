// src/header/data.rs
use crate::error::Result;
use crate::header::{decode_preamble, BaseHeader, O2Header};
use crate::tag::{DataDescription, DataOrigin, HeaderType, SerializationMethod};
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, BytesMut};

/// The main O2 data header.
///
/// Describes the payload that follows the header stack: what it is, which
/// detector produced it, how it is serialized and how many bytes it spans.
///
/// ```text
/// offset  size  field
///      0    40  BaseHeader
///     40    16  description
///     56     4  origin
///     60     4  reserved (zero)
///     64     8  serialization
///     72     8  sub-specification
///     80     8  payload size
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataHeader {
    pub base: BaseHeader,
    pub description: DataDescription,
    pub origin: DataOrigin,
    pub serialization: SerializationMethod,
    /// Opaque routing key, e.g. a link number.
    pub sub_specification: u64,
    pub payload_size: u64,
}

impl DataHeader {
    const DESCRIPTION_OFFSET: usize = 40;
    const ORIGIN_OFFSET: usize = 56;
    const RESERVED_OFFSET: usize = 60;
    const SERIALIZATION_OFFSET: usize = 64;
    const SUB_SPEC_OFFSET: usize = 72;
    pub(crate) const PAYLOAD_SIZE_OFFSET: usize = 80;

    pub fn new(
        description: DataDescription,
        origin: DataOrigin,
        sub_specification: u64,
        payload_size: u64,
    ) -> Self {
        DataHeader {
            base: Self::default_base(),
            description,
            origin,
            serialization: SerializationMethod::NONE,
            sub_specification,
            payload_size,
        }
    }

    pub fn with_serialization(mut self, serialization: SerializationMethod) -> Self {
        self.serialization = serialization;
        self
    }

    pub fn identifier(&self) -> DataIdentifier {
        DataIdentifier::new(self.description, self.origin)
    }
}

impl Default for DataHeader {
    fn default() -> Self {
        DataHeader::new(DataDescription::INVALID, DataOrigin::INVALID, 0, 0)
    }
}

impl O2Header for DataHeader {
    const HEADER_TYPE: HeaderType = HeaderType::new_padded(b"DataHead");
    const VERSION: u32 = 1;
    const SIZE: usize = 88;

    fn base(&self) -> &BaseHeader {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseHeader {
        &mut self.base
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let base = decode_preamble::<Self>(buf)?;

        Ok(DataHeader {
            base,
            description: DataDescription::from_bytes(
                &buf[Self::DESCRIPTION_OFFSET..Self::ORIGIN_OFFSET],
            )?,
            origin: DataOrigin::from_bytes(&buf[Self::ORIGIN_OFFSET..Self::RESERVED_OFFSET])?,
            serialization: SerializationMethod::from_bytes(
                &buf[Self::SERIALIZATION_OFFSET..Self::SUB_SPEC_OFFSET],
            )?,
            sub_specification: LittleEndian::read_u64(&buf[Self::SUB_SPEC_OFFSET..]),
            payload_size: LittleEndian::read_u64(&buf[Self::PAYLOAD_SIZE_OFFSET..]),
        })
    }

    fn encode_body(&self, out: &mut BytesMut) {
        out.put_slice(self.description.as_bytes());
        out.put_slice(self.origin.as_bytes());
        out.put_u32_le(0);
        out.put_slice(self.serialization.as_bytes());
        out.put_u64_le(self.sub_specification);
        out.put_u64_le(self.payload_size);
    }
}

/// Routing key made of a data description and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataIdentifier {
    pub description: DataDescription,
    pub origin: DataOrigin,
}

impl DataIdentifier {
    pub const ANY: DataIdentifier = DataIdentifier {
        description: DataDescription::ANY,
        origin: DataOrigin::ANY,
    };

    pub const fn new(description: DataDescription, origin: DataOrigin) -> Self {
        DataIdentifier {
            description,
            origin,
        }
    }

    /// Field-wise wildcard match.
    pub fn matches(&self, other: &DataIdentifier) -> bool {
        self.description.matches(&other.description) && self.origin.matches(&other.origin)
    }
}

impl std::fmt::Display for DataIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.origin.trimmed(), self.description.trimmed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::O2Error;

    fn sample() -> DataHeader {
        DataHeader::new(DataDescription::RAWDATA, DataOrigin::TPC, 7, 1024)
            .with_serialization(SerializationMethod::ROOT)
    }

    #[test]
    fn test_identity() {
        let dh = sample();
        assert_eq!(dh.base.header_type, DataHeader::HEADER_TYPE);
        assert_eq!(dh.base.hdrsz as usize, DataHeader::SIZE);
        assert_eq!(dh.base.version, 1);
        assert_eq!(dh.base.serialization, SerializationMethod::NONE);
        assert_eq!(DataHeader::HEADER_TYPE.trimmed(), "DataHead");
    }

    #[test]
    fn test_byte_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), DataHeader::SIZE);
        assert_eq!(&bytes[40..47], b"RAWDATA");
        assert_eq!(&bytes[56..60], b"TPC\0");
        assert_eq!(&bytes[60..64], &[0u8; 4]);
        assert_eq!(&bytes[64..68], b"ROOT");
        assert_eq!(&bytes[72..80], &7u64.to_le_bytes());
        assert_eq!(&bytes[80..88], &1024u64.to_le_bytes());
    }

    #[test]
    fn test_roundtrip() {
        let dh = sample();
        assert_eq!(DataHeader::decode(&dh.to_bytes()).unwrap(), dh);
    }

    #[test]
    fn test_reserved_ignored_on_read() {
        let mut bytes = sample().to_bytes().to_vec();
        bytes[60..64].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(DataHeader::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_truncated_body() {
        let bytes = sample().to_bytes();
        match DataHeader::decode(&bytes[..60]) {
            Err(O2Error::TruncatedBuffer { needed, available, .. }) => {
                assert_eq!(needed, 88);
                assert_eq!(available, 60);
            }
            other => panic!("Expected TruncatedBuffer, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_header_type() {
        let mut dh = sample();
        dh.base.header_type = HeaderType::new_padded(b"NameHead");
        assert!(matches!(
            DataHeader::decode(&dh.to_bytes()),
            Err(O2Error::HeaderTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_hdrsz_too_small() {
        let mut dh = sample();
        dh.base.hdrsz = 40;
        assert!(matches!(
            DataHeader::decode(&dh.to_bytes()),
            Err(O2Error::InvalidHeaderSize { hdrsz: 40, minimum: 88, .. })
        ));
    }

    #[test]
    fn test_identifier_matching() {
        let id = sample().identifier();
        assert_eq!(id, DataIdentifier::new(DataDescription::RAWDATA, DataOrigin::TPC));
        assert!(DataIdentifier::ANY.matches(&id));
        assert!(DataIdentifier::new(DataDescription::ANY, DataOrigin::TPC).matches(&id));
        assert!(!DataIdentifier::new(DataDescription::ANY, DataOrigin::ITS).matches(&id));
        assert_eq!(id.to_string(), "TPC/RAWDATA");
    }
}
