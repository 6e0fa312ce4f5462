//! LUKS1 header (cryptsetup).
//!
//! Layout grounded in the published LUKS1 on-disk format: 6-byte magic,
//! big-endian version, then fixed-width cipher/hash name fields, and a
//! 40-byte ASCII hyphenated UUID field.

use uuid::Uuid;

use crate::error::Result;
use crate::flags::RequestFlags;
use crate::registry::{MagicRule, Probe};

use super::util::u16_be;

pub const MAGIC: [u8; 6] = [b'L', b'U', b'K', b'S', 0xba, 0xbe];

const VERSION_OFF: usize = 6;
const UUID_OFF: usize = 168;
const UUID_FIELD_LEN: usize = 40;
const HEADER_LEN: usize = 208;

pub fn probe(session: &mut dyn Probe, _rule: Option<&MagicRule>) -> Result<bool> {
    let buf = session.get_buffer(0, HEADER_LEN)?;
    if buf[0..6] != MAGIC {
        return Ok(false);
    }
    let version = u16_be(&buf[VERSION_OFF..VERSION_OFF + 2]);
    if version != 1 {
        // Only the LUKS1 on-disk layout is modeled here.
        return Ok(false);
    }

    if session.requested().contains(RequestFlags::VERSION) {
        session.set_version("1")?;
    }

    let uuid_field = &buf[UUID_OFF..UUID_OFF + UUID_FIELD_LEN];
    let uuid_text = std::str::from_utf8(uuid_field)
        .unwrap_or("")
        .trim_end_matches('\0');
    if let Ok(parsed) = Uuid::parse_str(uuid_text) {
        session.set_uuid(*parsed.as_bytes())?;
    }

    Ok(true)
}
