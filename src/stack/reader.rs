// src/stack/reader.rs
use crate::error::{O2Error, Result};
use crate::header::{BaseHeader, DataHeader, O2Header};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Limits applied while walking a header stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    /// Maximum number of headers a single walk visits.
    pub max_headers: usize,
}

impl StackConfig {
    pub const DEFAULT_MAX_HEADERS: usize = 64;

    pub fn with_max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            max_headers: Self::DEFAULT_MAX_HEADERS,
        }
    }
}

/// One header found while walking a stack.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRef<'a> {
    /// Absolute offset of the header in the walked buffer.
    pub offset: usize,
    pub base: BaseHeader,
    /// The header's `hdrsz` bytes, preamble included.
    pub bytes: &'a [u8],
}

impl<'a> HeaderRef<'a> {
    pub fn is<T: O2Header>(&self) -> bool {
        self.base.header_type == T::HEADER_TYPE
    }

    pub fn decode<T: O2Header>(&self) -> Result<T> {
        T::decode(self.bytes).map_err(|e| e.at_offset(self.offset))
    }

    /// Offset of the byte right after this header.
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }
}

/// Read-only view of a header stack at the start (or some offset) of a buffer.
#[derive(Debug, Clone, Copy)]
pub struct HeaderStack<'a> {
    buf: &'a [u8],
    start: usize,
    config: StackConfig,
}

impl<'a> HeaderStack<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::from_offset(buf, 0)
    }

    pub fn from_offset(buf: &'a [u8], start: usize) -> Self {
        HeaderStack {
            buf,
            start,
            config: StackConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StackConfig) -> Self {
        self.config = config;
        self
    }

    pub fn iter(&self) -> StackIter<'a> {
        StackIter {
            buf: self.buf,
            offset: self.start,
            visited: 0,
            limit: self.config.max_headers,
            done: false,
        }
    }

    /// Walks the whole stack, failing on the first bad header.
    pub fn headers(&self) -> Result<SmallVec<[HeaderRef<'a>; 4]>> {
        self.iter().collect()
    }

    /// First header of kind `T`, if the stack has one.
    pub fn get<T: O2Header>(&self) -> Result<Option<T>> {
        for header in self.iter() {
            let header = header?;
            if header.is::<T>() {
                return header.decode::<T>().map(Some);
            }
        }
        Ok(None)
    }

    pub fn data_header(&self) -> Result<Option<DataHeader>> {
        self.get::<DataHeader>()
    }

    /// Absolute offset of the first byte after the stack.
    pub fn end(&self) -> Result<usize> {
        let mut end = self.start;
        for header in self.iter() {
            end = header?.end();
        }
        Ok(end)
    }

    /// Sum of `hdrsz` over the stack.
    pub fn total_size(&self) -> Result<usize> {
        Ok(self.end()? - self.start)
    }

    /// Every byte following the stack.
    pub fn trailing(&self) -> Result<&'a [u8]> {
        let end = self.end()?;
        Ok(&self.buf[end..])
    }

    /// The `payload_size` bytes announced by the stack's `DataHeader`.
    ///
    /// Returns `None` when the stack carries no `DataHeader`.
    pub fn payload(&self) -> Result<Option<&'a [u8]>> {
        let mut end = self.start;
        let mut data_header = None;
        for header in self.iter() {
            let header = header?;
            if data_header.is_none() && header.is::<DataHeader>() {
                data_header = Some(header.decode::<DataHeader>()?);
            }
            end = header.end();
        }

        let Some(dh) = data_header else {
            return Ok(None);
        };

        let available = self.buf.len() - end;
        let needed = usize::try_from(dh.payload_size).unwrap_or(usize::MAX);
        if needed > available {
            debug!(offset = end, needed, available, "payload runs past buffer");
            return Err(O2Error::truncated(end, needed, available));
        }
        Ok(Some(&self.buf[end..end + needed]))
    }
}

impl<'a> IntoIterator for &HeaderStack<'a> {
    type Item = Result<HeaderRef<'a>>;
    type IntoIter = StackIter<'a>;

    fn into_iter(self) -> StackIter<'a> {
        self.iter()
    }
}

/// Iterator following the continuation bit from header to header.
///
/// Stops after the first header whose continuation bit is clear, or after
/// yielding an error.
#[derive(Debug, Clone)]
pub struct StackIter<'a> {
    buf: &'a [u8],
    offset: usize,
    visited: usize,
    limit: usize,
    done: bool,
}

impl<'a> StackIter<'a> {
    fn next_header(&mut self) -> Result<HeaderRef<'a>> {
        if self.visited >= self.limit {
            return Err(O2Error::TooManyHeaders { limit: self.limit });
        }

        let offset = self.offset;
        let base = BaseHeader::decode_at(self.buf, offset)?;
        let size = base.hdrsz as usize;

        if size < BaseHeader::SIZE {
            return Err(O2Error::InvalidHeaderSize {
                offset,
                hdrsz: base.hdrsz,
                minimum: BaseHeader::SIZE,
            });
        }

        let available = self.buf.len() - offset;
        if size > available {
            return Err(O2Error::truncated(offset, size, available));
        }

        trace!(
            offset,
            hdrsz = size,
            header_type = %base.header_type.trimmed(),
            next = base.has_next(),
            "header"
        );

        self.visited += 1;
        self.offset = offset + size;
        Ok(HeaderRef {
            offset,
            base,
            bytes: &self.buf[offset..offset + size],
        })
    }
}

impl<'a> Iterator for StackIter<'a> {
    type Item = Result<HeaderRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_header() {
            Ok(header) => {
                self.done = !header.base.has_next();
                Some(Ok(header))
            }
            Err(e) => {
                debug!(offset = self.offset, error = %e, "header stack walk failed");
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::NameHeader;
    use crate::stack::StackBuilder;
    use crate::tag::{DataDescription, DataOrigin};

    fn two_headers() -> bytes::Bytes {
        StackBuilder::new()
            .push(&DataHeader::new(DataDescription::CLUSTERS, DataOrigin::ITS, 3, 0))
            .push(&NameHeader::new("clusters").unwrap())
            .finish()
    }

    #[test]
    fn test_walk_offsets() {
        let buf = two_headers();
        let stack = HeaderStack::new(&buf);
        let headers = stack.headers().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].offset, 0);
        assert_eq!(headers[1].offset, DataHeader::SIZE);
        assert!(headers[0].is::<DataHeader>());
        assert!(headers[1].is::<NameHeader>());
        assert_eq!(stack.total_size().unwrap(), DataHeader::SIZE + NameHeader::SIZE);
    }

    #[test]
    fn test_limit() {
        let buf = two_headers();
        let stack = HeaderStack::new(&buf)
            .with_config(StackConfig::default().with_max_headers(1));
        let mut iter = stack.iter();
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(
            iter.next(),
            Some(Err(O2Error::TooManyHeaders { limit: 1 }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_hdrsz_below_preamble() {
        let mut buf = two_headers().to_vec();
        buf[4..8].copy_from_slice(&12u32.to_le_bytes());
        assert!(matches!(
            HeaderStack::new(&buf).headers(),
            Err(O2Error::InvalidHeaderSize { offset: 0, hdrsz: 12, .. })
        ));
    }

    #[test]
    fn test_decode_error_carries_stack_offset() {
        let mut buf = two_headers().to_vec();
        let at = DataHeader::SIZE;
        buf[at + 4..at + 8].copy_from_slice(&40u32.to_le_bytes());
        buf.truncate(at + 40);

        let stack = HeaderStack::new(&buf);
        let headers = stack.headers().unwrap();
        assert!(matches!(
            headers[1].decode::<NameHeader>(),
            Err(O2Error::InvalidHeaderSize { offset, hdrsz: 40, .. }) if offset == DataHeader::SIZE
        ));
    }

    #[test]
    fn test_hdrsz_past_end() {
        let mut buf = two_headers().to_vec();
        buf[4..8].copy_from_slice(&4096u32.to_le_bytes());
        assert!(matches!(
            HeaderStack::new(&buf).headers(),
            Err(O2Error::TruncatedBuffer { offset: 0, needed: 4096, .. })
        ));
    }
}
