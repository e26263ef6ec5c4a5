// src/stack/mod.rs
//! Header stacks: headers concatenated back to back, each announcing its own
//! size (`hdrsz`) and whether another header follows (flags bit 0).
//!
//! [`HeaderStack`] walks an encoded stack, [`StackBuilder`] assembles one.
//!
//! ```
//! use o2_headers::prelude::*;
//! use o2_headers::stack::{HeaderStack, StackBuilder};
//!
//! let message = StackBuilder::new()
//!     .push(&DataHeader::new(DataDescription::RAWDATA, DataOrigin::TPC, 0, 0))
//!     .push(&NameHeader::new("raw").unwrap())
//!     .finish_with_payload(&[1, 2, 3, 4]);
//!
//! let stack = HeaderStack::new(&message);
//! let dh = stack.data_header().unwrap().unwrap();
//! assert_eq!(dh.payload_size, 4);
//! assert_eq!(stack.payload().unwrap(), Some(&[1u8, 2, 3, 4][..]));
//! ```

mod builder;
mod reader;

pub use builder::StackBuilder;
pub use reader::{HeaderRef, HeaderStack, StackConfig, StackIter};
