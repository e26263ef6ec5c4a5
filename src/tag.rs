// src/tag.rs
//! Fixed-width ASCII tags used as type identifiers in the header stack.
//!
//! Every tag is a plain byte array of a fixed width. Two tags are equal only
//! if all their bytes are equal, so `"ROOT"` padded with NULs is a different
//! tag from `"ROOT"` padded with spaces. Rendering a tag as text yields the raw
//! bytes, trailing NULs included; use `trimmed()` for the human-facing name.

use crate::error::{O2Error, Result};
use crate::utils;
use std::fmt;

/// Token marking an unset 32-bit field.
pub const INVALID_TOKEN_32: u32 = 0xFFFF_FFFF;
/// Token marking an unset 64-bit field.
pub const INVALID_TOKEN_64: u64 = 0xFFFF_FFFF_FFFF_FFFF;

macro_rules! define_tag {
    ($(#[$meta:meta])* $name:ident, $size:expr, any = $any:expr, invalid = $invalid:expr) => {
        define_tag!($(#[$meta])* $name, $size);

        impl $name {
            /// Wildcard value.
            pub const ANY: Self = Self::new_padded($any);
            /// Marks an unset or unusable value.
            pub const INVALID: Self = Self::new_padded($invalid);

            pub fn is_any(&self) -> bool {
                *self == Self::ANY
            }

            pub fn is_invalid(&self) -> bool {
                *self == Self::INVALID
            }

            /// Equality where `ANY` on either side matches everything.
            pub fn matches(&self, other: &Self) -> bool {
                self.is_any() || other.is_any() || self == other
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, $size:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[repr(transparent)]
        pub struct $name([u8; $size]);

        impl $name {
            /// Width of this tag on the wire.
            pub const SIZE: usize = $size;

            pub const fn new(bytes: [u8; $size]) -> Self {
                $name(bytes)
            }

            /// Builds a tag from a prefix, zero-filling the remaining bytes.
            ///
            /// Panics (at compile time when used in a `const`) if `text` is wider
            /// than the tag.
            pub const fn new_padded(text: &[u8]) -> Self {
                assert!(text.len() <= $size);
                let mut out = [0u8; $size];
                let mut i = 0;
                while i < text.len() {
                    out[i] = text[i];
                    i += 1;
                }
                $name(out)
            }

            /// Reads a tag from a slice of exactly `SIZE` bytes.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                <[u8; $size]>::try_from(bytes)
                    .map($name)
                    .map_err(|_| O2Error::InvalidLength {
                        expected: $size,
                        found: bytes.len(),
                    })
            }

            /// Zero-pads `text` to the tag width.
            pub fn from_str_padded(text: &str) -> Result<Self> {
                if text.len() > $size {
                    return Err(O2Error::InvalidLength {
                        expected: $size,
                        found: text.len(),
                    });
                }
                Ok(Self::new_padded(text.as_bytes()))
            }

            pub const fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            /// The tag text without its trailing NUL padding.
            pub fn trimmed(&self) -> String {
                utils::to_text(utils::trim_nul(&self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                utils::write_raw(f, &self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.trimmed())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $size]> for $name {
            fn from(bytes: [u8; $size]) -> Self {
                $name(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = O2Error;

            fn try_from(bytes: &[u8]) -> Result<Self> {
                Self::from_bytes(bytes)
            }
        }
    };
}

define_tag!(
    /// Magic token opening every O2 header.
    Magic, 4
);

impl Magic {
    pub const O2: Magic = Magic::new(*b"O2O2");
}

/// Magic of every O2 header preamble.
pub const O2_MAGIC: Magic = Magic::O2;

define_tag!(
    /// Detector or subsystem that produced a data block.
    DataOrigin, 4,
    any = b"****",
    invalid = b"NIL"
);

impl DataOrigin {
    pub const FLP: DataOrigin = DataOrigin::new_padded(b"FLP");
    pub const ACO: DataOrigin = DataOrigin::new_padded(b"ACO");
    pub const CPV: DataOrigin = DataOrigin::new_padded(b"CPV");
    pub const CTP: DataOrigin = DataOrigin::new_padded(b"CTP");
    pub const EMC: DataOrigin = DataOrigin::new_padded(b"EMC");
    pub const FIT: DataOrigin = DataOrigin::new_padded(b"FIT");
    pub const HMP: DataOrigin = DataOrigin::new_padded(b"HMP");
    pub const ITS: DataOrigin = DataOrigin::new_padded(b"ITS");
    pub const MCH: DataOrigin = DataOrigin::new_padded(b"MCH");
    pub const MFT: DataOrigin = DataOrigin::new_padded(b"MFT");
    pub const MID: DataOrigin = DataOrigin::new_padded(b"MID");
    pub const PHS: DataOrigin = DataOrigin::new_padded(b"PHS");
    pub const TOF: DataOrigin = DataOrigin::new_padded(b"TOF");
    pub const TPC: DataOrigin = DataOrigin::new_padded(b"TPC");
    pub const TRD: DataOrigin = DataOrigin::new_padded(b"TRD");
    pub const ZDC: DataOrigin = DataOrigin::new_padded(b"ZDC");

    /// Every named origin, sentinels first.
    pub const KNOWN: &'static [DataOrigin] = &[
        DataOrigin::ANY,
        DataOrigin::INVALID,
        DataOrigin::FLP,
        DataOrigin::ACO,
        DataOrigin::CPV,
        DataOrigin::CTP,
        DataOrigin::EMC,
        DataOrigin::FIT,
        DataOrigin::HMP,
        DataOrigin::ITS,
        DataOrigin::MCH,
        DataOrigin::MFT,
        DataOrigin::MID,
        DataOrigin::PHS,
        DataOrigin::TOF,
        DataOrigin::TPC,
        DataOrigin::TRD,
        DataOrigin::ZDC,
    ];

    /// Looks up a named origin by its trimmed text, e.g. `"TPC"`.
    pub fn lookup(name: &str) -> Option<DataOrigin> {
        Self::KNOWN.iter().copied().find(|o| o.trimmed() == name)
    }
}

define_tag!(
    /// Kind of data carried by a block.
    DataDescription, 16,
    any = b"***************",
    invalid = b"INVALID_DESC"
);

impl DataDescription {
    pub const RAWDATA: DataDescription = DataDescription::new_padded(b"RAWDATA");
    pub const CLUSTERS: DataDescription = DataDescription::new_padded(b"CLUSTERS");
    pub const TRACKS: DataDescription = DataDescription::new_padded(b"TRACKS");
    pub const CONFIG: DataDescription = DataDescription::new_padded(b"CONFIGURATION");
    pub const INFO: DataDescription = DataDescription::new_padded(b"INFORMATION");
    pub const ROOT_STREAMERS: DataDescription = DataDescription::new_padded(b"ROOT STREAMERS");

    pub const KNOWN: &'static [DataDescription] = &[
        DataDescription::ANY,
        DataDescription::INVALID,
        DataDescription::RAWDATA,
        DataDescription::CLUSTERS,
        DataDescription::TRACKS,
        DataDescription::CONFIG,
        DataDescription::INFO,
        DataDescription::ROOT_STREAMERS,
    ];

    pub fn lookup(name: &str) -> Option<DataDescription> {
        Self::KNOWN.iter().copied().find(|d| d.trimmed() == name)
    }
}

define_tag!(
    /// Identifies which header follows a `BaseHeader` preamble.
    HeaderType, 16,
    any = b"***************",
    invalid = b"INVALID"
);

define_tag!(
    /// How a header or payload was serialized.
    SerializationMethod, 8,
    any = b"********",
    invalid = b"INVALID"
);

impl SerializationMethod {
    pub const NONE: SerializationMethod = SerializationMethod::new_padded(b"NONE");
    pub const ROOT: SerializationMethod = SerializationMethod::new_padded(b"ROOT");
    pub const FLATBUF: SerializationMethod = SerializationMethod::new_padded(b"FLATBUF");
}

define_tag!(
    /// Fixed-width object name carried by a `NameHeader`.
    HeaderName, 32
);
