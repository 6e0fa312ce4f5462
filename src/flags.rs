//! Bitfield types at the API boundary: requested-value flags, usage classes,
//! and filter modes.

use bitflags::bitflags;

bitflags! {
    /// Which attributes a [`crate::session::Session`] asks parsers to populate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RequestFlags: u16 {
        const TYPE      = 1 << 0;
        const USAGE     = 1 << 1;
        const VERSION   = 1 << 2;
        const LABEL     = 1 << 3;
        const LABEL_RAW = 1 << 4;
        const UUID      = 1 << 5;
        const UUID_RAW  = 1 << 6;
    }
}

impl RequestFlags {
    /// All flags set; the common case for "probe and report everything".
    pub fn all_values() -> Self {
        RequestFlags::TYPE
            | RequestFlags::USAGE
            | RequestFlags::VERSION
            | RequestFlags::LABEL
            | RequestFlags::LABEL_RAW
            | RequestFlags::UUID
            | RequestFlags::UUID_RAW
    }
}

bitflags! {
    /// Coarse taxonomy assigned to a format descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UsageClass: u8 {
        const FILESYSTEM = 1 << 0;
        const RAID       = 1 << 1;
        const CRYPTO     = 1 << 2;
        const OTHER      = 1 << 3;
    }
}

impl UsageClass {
    /// Textual form used for the `USAGE` attribute, selecting the
    /// first-matching bit per the distilled spec's mapping.
    pub fn as_str(self) -> &'static str {
        if self.contains(UsageClass::FILESYSTEM) {
            "filesystem"
        } else if self.contains(UsageClass::RAID) {
            "raid"
        } else if self.contains(UsageClass::CRYPTO) {
            "crypto"
        } else if self.contains(UsageClass::OTHER) {
            "other"
        } else {
            "unknown"
        }
    }
}

/// Polarity for [`crate::filter::Filter`] constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Keep only descriptors matching the given criterion.
    OnlyIn,
    /// Keep everything except descriptors matching the given criterion.
    NotIn,
}
