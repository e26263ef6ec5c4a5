// src/stack/builder.rs
use crate::header::{BaseHeader, DataHeader, O2Header};
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};

/// Assembles headers into one contiguous stack.
///
/// The continuation bit of every header but the last is set; the last one
/// is cleared, whatever flags the pushed headers carried. `hdrsz` is
/// rewritten to the encoded size of each header.
#[derive(Debug, Default)]
pub struct StackBuilder {
    buffer: BytesMut,
    last_header_at: Option<usize>,
    data_header_at: Option<usize>,
    count: usize,
}

impl StackBuilder {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        StackBuilder {
            buffer: BytesMut::with_capacity(capacity),
            last_header_at: None,
            data_header_at: None,
            count: 0,
        }
    }

    pub fn push<T: O2Header>(mut self, header: &T) -> Self {
        if let Some(prev) = self.last_header_at {
            BaseHeader::patch_next_flag(&mut self.buffer[prev..], true);
        }

        let start = self.buffer.len();
        header.encode_into(&mut self.buffer);
        BaseHeader::patch_next_flag(&mut self.buffer[start..], false);
        // Only T::SIZE bytes were written, whatever hdrsz the header arrived with.
        BaseHeader::patch_hdrsz(&mut self.buffer[start..], T::SIZE as u32);

        if self.data_header_at.is_none() && T::HEADER_TYPE == DataHeader::HEADER_TYPE {
            self.data_header_at = Some(start);
        }
        self.last_header_at = Some(start);
        self.count += 1;
        self
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Encoded size of the stack so far.
    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn finish(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Appends `payload` after the stack and writes its length into the first
    /// `DataHeader`'s payload size.
    pub fn finish_with_payload(mut self, payload: &[u8]) -> Bytes {
        if let Some(at) = self.data_header_at {
            let field = at + DataHeader::PAYLOAD_SIZE_OFFSET;
            LittleEndian::write_u64(&mut self.buffer[field..field + 8], payload.len() as u64);
        }
        self.buffer.put_slice(payload);
        self.buffer.freeze()
    }
}
