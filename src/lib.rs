// src/lib.rs
//! # o2-headers
//!
//! Binary header formats used to tag and route detector data blocks in the O2
//! data-acquisition pipeline.
//!
//! ## Features
//!
//! - 🏷️ **Tags**: fixed-width ASCII identifiers (`DataOrigin`, `DataDescription`,
//!   `HeaderType`, `SerializationMethod`) with process-wide sentinel constants
//! - 🔗 **Header stacks**: `BaseHeader`-prefixed headers chained by a continuation flag
//! - 📦 **RDH**: the 32-byte RAWDataHeader decoded through a declarative bit-field table
//! - 🚀 **Allocation-light**: decoders read straight from borrowed buffers
//! - 🔒 **Thread-safe**: every codec is a pure function over immutable input
//!
//! ## Quick Start
//!
//! ### Building and walking a header stack
//!
//! ```rust
//! use o2_headers::*;
//!
//! fn main() -> Result<()> {
//!     let message = StackBuilder::new()
//!         .push(&DataHeader::new(DataDescription::CLUSTERS, DataOrigin::TPC, 3, 0))
//!         .push(&NameHeader::new("tpc-clusters")?)
//!         .finish_with_payload(b"cluster data");
//!
//!     let stack = HeaderStack::new(&message);
//!     for header in stack.iter() {
//!         let header = header?;
//!         println!("{} at offset {}", header.base.header_type.trimmed(), header.offset);
//!     }
//!
//!     let name: NameHeader = stack.get()?.expect("name header present");
//!     assert_eq!(name.name(), "tpc-clusters");
//!     Ok(())
//! }
//! ```
//!
//! ### Reading a RAWDataHeader
//!
//! ```rust
//! use o2_headers::*;
//!
//! fn main() -> Result<()> {
//!     let page = RawDataHeader::from_fields(&RdhFields {
//!         version: 1,
//!         fee_id: 0x3412,
//!         link_id: 5,
//!         stop_code: 1,
//!         ..Default::default()
//!     });
//!
//!     let rdh = RawDataHeader::from_bytes(page.as_bytes())?;
//!     assert_eq!(rdh.fee_id(), 0x3412);
//!     assert!(rdh.is_last_page());
//!     Ok(())
//! }
//! ```

// Modules
pub mod error;
pub mod tag;
pub mod header;
pub mod stack;
pub mod rdh;

mod utils;

// Re-export commonly used types at the crate root for convenience
pub use error::{O2Error, Result};

// Tag exports
pub use tag::{
    DataDescription,
    DataOrigin,
    HeaderName,
    HeaderType,
    Magic,
    SerializationMethod,
    INVALID_TOKEN_32,
    INVALID_TOKEN_64,
    O2_MAGIC,
};

// Header exports
pub use header::{
    BaseHeader,
    DataHeader,
    DataIdentifier,
    HeartbeatHeader,
    HeartbeatStatistics,
    HeartbeatTrailer,
    NameHeader,
    O2Header,
};

// Stack exports
pub use stack::{
    HeaderRef,
    HeaderStack,
    StackBuilder,
    StackConfig,
};

// RDH exports
pub use rdh::{
    BitField,
    RawDataHeader,
    RdhField,
    RdhFields,
    RdhLayout,
};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use o2_headers::prelude::*;
    //! ```

    pub use crate::error::{O2Error, Result};
    pub use crate::header::{DataHeader, NameHeader, O2Header};
    pub use crate::rdh::RawDataHeader;
    pub use crate::stack::{HeaderStack, StackBuilder};
    pub use crate::tag::{DataDescription, DataOrigin, HeaderType, SerializationMethod};
}

// Version information
/// Version written into the `BaseHeader` of headers this library builds
pub const O2_HEADER_VERSION: u32 = 1;

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(O2_HEADER_VERSION, 1);
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_header_sizes() {
        assert_eq!(BaseHeader::SIZE, 40);
        assert_eq!(DataHeader::SIZE, 88);
        assert_eq!(NameHeader::SIZE, 72);
        assert_eq!(HeartbeatStatistics::SIZE, 56);
        assert_eq!(RawDataHeader::SIZE, 32);
    }

    #[test]
    fn test_header_types_distinct() {
        let types = [
            DataHeader::HEADER_TYPE,
            NameHeader::HEADER_TYPE,
            HeartbeatStatistics::HEADER_TYPE,
        ];
        for (i, a) in types.iter().enumerate() {
            for b in &types[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_header_versions() {
        assert_eq!(DataHeader::VERSION, O2_HEADER_VERSION);
        assert_eq!(NameHeader::VERSION, 1);
        assert_eq!(HeartbeatStatistics::VERSION, 1);
    }

    #[test]
    fn test_helper_stack_walks() {
        let buf = test_helpers::data_and_name_stack("helper");
        let stack = HeaderStack::new(&buf);
        assert_eq!(stack.headers().unwrap().len(), 2);
        assert_eq!(stack.get::<NameHeader>().unwrap().unwrap().name(), "helper");
    }

    #[test]
    fn test_helper_rdh_pages() {
        let buf = test_helpers::rdh_pages(0x42, 3);
        let pages = RawDataHeader::cast_slice(&buf).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.fee_id() == 0x42));
        assert_eq!(pages.iter().filter(|p| p.is_last_page()).count(), 1);
        assert!(pages[2].is_last_page());
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(INVALID_TOKEN_32, u32::MAX);
        assert_eq!(INVALID_TOKEN_64, u64::MAX);
    }
}

// Test helpers (only compiled for tests)
#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// A DataHeader followed by a NameHeader, continuation bit set on the first.
    pub fn data_and_name_stack(name: &str) -> bytes::Bytes {
        StackBuilder::new()
            .push(&DataHeader::new(DataDescription::RAWDATA, DataOrigin::TPC, 0, 0))
            .push(&NameHeader::new(name).unwrap())
            .finish()
    }

    /// RDH page sequence for one block: `count` pages, stop bit on the last.
    pub fn rdh_pages(fee_id: u16, count: u16) -> Vec<u8> {
        let mut buf = Vec::with_capacity(count as usize * RawDataHeader::SIZE);
        for page in 0..count {
            let rdh = RawDataHeader::from_fields(&RdhFields {
                version: 1,
                fee_id,
                header_size: 4,
                pages_counter: page,
                stop_code: (page + 1 == count) as u8,
                ..Default::default()
            });
            buf.extend_from_slice(rdh.as_bytes());
        }
        buf
    }
}
