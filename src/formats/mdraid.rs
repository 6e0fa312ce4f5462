//! Linux MD-RAID 1.2 member superblock.
//!
//! Grounded in the real `struct mdp_superblock_1` layout (the in-front 1.2
//! variant, fixed at a 4 KiB offset from the start of the member). The
//! end-of-device 0.90/1.0 layouts depend on total device size and are not
//! expressible through this registry's fixed positive-offset magic rule; see
//! SPEC_FULL.md §4.8.

use crate::error::Result;
use crate::flags::RequestFlags;
use crate::registry::{MagicRule, Probe};
use crate::text;

use super::util::{array16, u32_le};

/// `0xa92b4efc`, little-endian.
pub const MAGIC: [u8; 4] = [0xfc, 0x4e, 0x2b, 0xa9];

const SB_OFFSET: u64 = 4 * 1024;
const SET_UUID_OFF: usize = 16;
const SET_NAME_OFF: usize = 32;
const SET_NAME_LEN: usize = 32;
const SB_READ_LEN: usize = 64;

pub fn probe(session: &mut dyn Probe, _rule: Option<&MagicRule>) -> Result<bool> {
    let buf = session.get_buffer(SB_OFFSET, SB_READ_LEN)?;
    if buf[0..4] != MAGIC {
        return Ok(false);
    }
    let major_version = u32_le(&buf[4..8]);
    let uuid = array16(&buf[SET_UUID_OFF..SET_UUID_OFF + 16]);
    let name_raw = &buf[SET_NAME_OFF..SET_NAME_OFF + SET_NAME_LEN];

    if session.requested().contains(RequestFlags::VERSION) {
        session.set_version(&format!("1.{major_version}"))?;
    }
    let trimmed_name = text::trim_trailing_whitespace(name_raw);
    session.set_label(trimmed_name)?;
    session.set_uuid(uuid)?;
    Ok(true)
}
