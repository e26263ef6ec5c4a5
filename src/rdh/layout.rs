// src/rdh/layout.rs
use crate::utils::BitField;
use tracing::debug;

/// Named fields of a RAWDataHeader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum RdhField {
    Version = 0,
    BlockLength,
    FeeId,
    LinkId,
    HeaderSize,
    TriggerOrbit,
    HeartbeatOrbit,
    TriggerBcId,
    TriggerType,
    HeartbeatBcId,
    StopCode,
    DetectorField,
    Par,
    PagesCounter,
}

impl RdhField {
    pub const COUNT: usize = 14;

    pub const ALL: [RdhField; Self::COUNT] = [
        RdhField::Version,
        RdhField::BlockLength,
        RdhField::FeeId,
        RdhField::LinkId,
        RdhField::HeaderSize,
        RdhField::TriggerOrbit,
        RdhField::HeartbeatOrbit,
        RdhField::TriggerBcId,
        RdhField::TriggerType,
        RdhField::HeartbeatBcId,
        RdhField::StopCode,
        RdhField::DetectorField,
        RdhField::Par,
        RdhField::PagesCounter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RdhField::Version => "version",
            RdhField::BlockLength => "block_length",
            RdhField::FeeId => "fee_id",
            RdhField::LinkId => "link_id",
            RdhField::HeaderSize => "header_size",
            RdhField::TriggerOrbit => "trigger_orbit",
            RdhField::HeartbeatOrbit => "heartbeat_orbit",
            RdhField::TriggerBcId => "trigger_bc_id",
            RdhField::TriggerType => "trigger_type",
            RdhField::HeartbeatBcId => "heartbeat_bc_id",
            RdhField::StopCode => "stop_code",
            RdhField::DetectorField => "detector_field",
            RdhField::Par => "par",
            RdhField::PagesCounter => "pages_counter",
        }
    }
}

/// Bit positions of every RDH field for one protocol version.
///
/// A `None` entry means the layout does not pin the field down; reading it
/// yields `None` and encoding leaves its bits zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RdhLayout {
    pub name: &'static str,
    fields: [Option<BitField>; RdhField::COUNT],
}

impl RdhLayout {
    /// The version byte sits at the same place in every layout.
    pub const VERSION_FIELD: BitField = BitField::bytes(0, 0, 1);

    /// Layout used for every version without a registered layout of its own.
    ///
    /// ```text
    ///        63     56      48      40      32      24      16       8       0
    ///        |---------------|---------------|---------------|---------------|
    ///  0     | zero  |  size |link id|    FEE id     |  block length | vers  |
    ///  1     |      heartbeat orbit          |       trigger orbit           |
    ///  2     | zero  |      par      | detector field| stop  |   (unpinned)  |
    ///  3     |                 zero                          |  page count   |
    /// ```
    pub const DEFAULT: RdhLayout = RdhLayout::new("default")
        .with(RdhField::Version, Self::VERSION_FIELD)
        .with(RdhField::BlockLength, BitField::bytes(0, 1, 2))
        .with(RdhField::FeeId, BitField::bytes(0, 3, 2))
        .with(RdhField::LinkId, BitField::bytes(0, 5, 1))
        .with(RdhField::HeaderSize, BitField::bytes(0, 6, 1))
        .with(RdhField::TriggerOrbit, BitField::bytes(1, 0, 4))
        .with(RdhField::HeartbeatOrbit, BitField::bytes(1, 4, 4))
        .with(RdhField::StopCode, BitField::bytes(2, 2, 1))
        .with(RdhField::DetectorField, BitField::bytes(2, 3, 2))
        .with(RdhField::Par, BitField::bytes(2, 5, 2))
        .with(RdhField::PagesCounter, BitField::bytes(3, 0, 2));

    pub const fn new(name: &'static str) -> Self {
        RdhLayout {
            name,
            fields: [None; RdhField::COUNT],
        }
    }

    pub const fn with(mut self, field: RdhField, bits: BitField) -> Self {
        self.fields[field as usize] = Some(bits);
        self
    }

    pub const fn field(&self, field: RdhField) -> Option<BitField> {
        self.fields[field as usize]
    }

    /// Fields this layout places, in declaration order.
    pub fn defined_fields(&self) -> impl Iterator<Item = (RdhField, BitField)> + '_ {
        RdhField::ALL
            .into_iter()
            .filter_map(move |f| self.field(f).map(|bits| (f, bits)))
    }

    /// True if no two placed fields share a bit.
    pub fn is_consistent(&self) -> bool {
        let placed: Vec<(RdhField, BitField)> = self.defined_fields().collect();
        placed.iter().enumerate().all(|(i, (_, a))| {
            a.word < 4 && placed[i + 1..].iter().all(|(_, b)| !a.overlaps(b))
        })
    }

    /// Layout announced by the version byte of a record.
    pub fn for_version(version: u8) -> &'static RdhLayout {
        match LAYOUTS.iter().find(|(v, _)| *v == version) {
            Some((_, layout)) => *layout,
            None => {
                debug!(version, "no RDH layout registered for version, using default");
                &RdhLayout::DEFAULT
            }
        }
    }
}

static LAYOUTS: &[(u8, &RdhLayout)] = &[(1, &RdhLayout::DEFAULT)];
