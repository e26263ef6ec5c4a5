// src/rdh/mod.rs
//! RAWDataHeader (RDH) codec.
//!
//! The RDH is a flat 32-byte record, four little-endian 64-bit words, that
//! front-end electronics put in front of every raw data page. Unlike the
//! header stack it is never chained.
//!
//! Field positions live in one declarative table, [`RdhLayout`], consumed by
//! a single pack/unpack routine, [`BitField`].

mod header;
mod layout;

pub use header::{RawDataHeader, RdhFields};
pub use layout::{RdhField, RdhLayout};
pub use crate::utils::BitField;
