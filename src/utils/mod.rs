mod ascii;
mod bitfield;

pub(crate) use ascii::*;
pub use bitfield::BitField;
