//! Format registry: the static, ordered list of format descriptors.
//!
//! Order is part of the contract — earlier entries are tried first, so
//! ambiguous signatures resolve deterministically. RAID and crypto container
//! superblocks precede filesystem superblocks because a RAID member or a
//! LUKS payload can carry a stale filesystem signature underneath; a UDF
//! bridge volume precedes iso9660 for the same reason (UDF is the more
//! specific identification of the same block).

use crate::error::Result;
use crate::flags::UsageClass;
use crate::formats;

/// A literal byte pattern expected at a fixed device offset.
#[derive(Debug, Clone, Copy)]
pub struct MagicRule {
    pub bytes: &'static [u8],
    /// Coarse offset in kibibytes from device origin.
    pub kb_offset: u32,
    /// Fine offset within the kibibyte (0..1023).
    pub sector_offset: u32,
}

impl MagicRule {
    pub const fn new(bytes: &'static [u8], kb_offset: u32, sector_offset: u32) -> Self {
        MagicRule { bytes, kb_offset, sector_offset }
    }

    /// Absolute byte offset this rule's pattern is expected at.
    pub fn byte_offset(&self) -> u64 {
        self.kb_offset as u64 * 1024 + self.sector_offset as u64
    }
}

/// The capability set a concrete format implements against the session it is
/// invoked with. Object-safe so the registry can hold plain function pointers
/// without being generic over the device reader's concrete type.
pub trait Probe {
    fn get_buffer(&mut self, off: u64, len: usize) -> Result<&[u8]>;
    fn requested(&self) -> crate::flags::RequestFlags;

    fn set_value(&mut self, name: &'static str, bytes: &[u8]) -> Result<()>;
    fn set_version(&mut self, version: &str) -> Result<()>;
    fn set_label(&mut self, raw: &[u8]) -> Result<()>;
    fn set_utf8label(&mut self, raw: &[u8], encoding: crate::text::Utf16Encoding) -> Result<()>;
    fn set_uuid(&mut self, bytes: [u8; 16]) -> Result<()>;
    fn set_uuid_as(&mut self, name: &'static str, bytes: [u8; 16]) -> Result<()>;
    fn sprintf_uuid(&mut self, name: &'static str, formatted: &str) -> Result<()>;
}

/// `probe(session, matched_rule)` returns `Ok(true)` to accept the descriptor
/// as a match, `Ok(false)` to reject it (signature coincidence, failed
/// structural check), or `Err` on an I/O failure reading further bytes.
pub type ParserFn = fn(&mut dyn Probe, Option<&MagicRule>) -> Result<bool>;

/// An immutable, read-only-after-init registry entry.
pub struct FormatDescriptor {
    pub name: &'static str,
    pub usage: UsageClass,
    pub magics: &'static [MagicRule],
    pub parser: Option<ParserFn>,
}

/// The process-wide, compile-time-ordered registry. Index stability is part
/// of the ABI: the [`crate::filter::Filter`] bitmap addresses descriptors by
/// position, not by name.
pub static REGISTRY: &[FormatDescriptor] = &[
    FormatDescriptor {
        name: "linux_raid_member",
        usage: UsageClass::RAID,
        magics: &[MagicRule::new(&formats::mdraid::MAGIC, 4, 0)],
        parser: Some(formats::mdraid::probe),
    },
    FormatDescriptor {
        name: "crypto_LUKS",
        usage: UsageClass::CRYPTO,
        magics: &[MagicRule::new(&formats::luks::MAGIC, 0, 0)],
        parser: Some(formats::luks::probe),
    },
    FormatDescriptor {
        name: "udf",
        usage: UsageClass::FILESYSTEM,
        magics: &[],
        parser: Some(formats::udf::probe),
    },
    FormatDescriptor {
        name: "iso9660",
        usage: UsageClass::FILESYSTEM,
        magics: &[MagicRule::new(&formats::iso9660::MAGIC, 32, 1)],
        parser: Some(formats::iso9660::probe),
    },
    FormatDescriptor {
        name: "vfat",
        usage: UsageClass::FILESYSTEM,
        magics: &[],
        parser: Some(formats::vfat::probe),
    },
    FormatDescriptor {
        name: "ext4",
        usage: UsageClass::FILESYSTEM,
        magics: &[MagicRule::new(&formats::ext4::MAGIC, 1, 0x38)],
        parser: Some(formats::ext4::probe),
    },
    FormatDescriptor {
        name: "xfs",
        usage: UsageClass::FILESYSTEM,
        magics: &[MagicRule::new(&formats::xfs::MAGIC, 0, 0)],
        parser: Some(formats::xfs::probe),
    },
];

/// Linear search by name, as specified.
pub fn known_fstype(name: &str) -> bool {
    REGISTRY.iter().any(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_raid_crypto_then_filesystems() {
        let names: Vec<&str> = REGISTRY.iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["linux_raid_member", "crypto_LUKS", "udf", "iso9660", "vfat", "ext4", "xfs"]
        );
    }

    #[test]
    fn known_fstype_checks_registry() {
        assert!(known_fstype("ext4"));
        assert!(known_fstype("vfat"));
        assert!(!known_fstype("nonexistent"));
    }
}
