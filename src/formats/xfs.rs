//! XFS primary superblock, always at byte offset 0 of the filesystem.

use crate::error::Result;
use crate::flags::RequestFlags;
use crate::registry::{MagicRule, Probe};
use crate::text;

use super::util::{array16, u16_be};

/// `"XFSB"`, big-endian, at `sb_magicnum`.
pub const MAGIC: [u8; 4] = *b"XFSB";

const SB_READ_LEN: usize = 128;
const UUID_OFF: usize = 32;
const VERSIONNUM_OFF: usize = 100;
const FNAME_OFF: usize = 108;
const FNAME_LEN: usize = 12;

const VERSION_NUM_MASK: u16 = 0x000F;

pub fn probe(session: &mut dyn Probe, _rule: Option<&MagicRule>) -> Result<bool> {
    let buf = session.get_buffer(0, SB_READ_LEN)?;
    if buf[0..4] != MAGIC {
        return Ok(false);
    }

    if session.requested().contains(RequestFlags::VERSION) {
        let versionnum = u16_be(&buf[VERSIONNUM_OFF..VERSIONNUM_OFF + 2]);
        session.set_version(&format!("V{}", versionnum & VERSION_NUM_MASK))?;
    }

    let name_raw = &buf[FNAME_OFF..FNAME_OFF + FNAME_LEN];
    let trimmed = text::trim_trailing_whitespace(name_raw);
    session.set_label(trimmed)?;

    let uuid = array16(&buf[UUID_OFF..UUID_OFF + 16]);
    session.set_uuid(uuid)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, StepOutcome};
    use std::io::Cursor;

    fn image_with_xfs_sb() -> Vec<u8> {
        let mut data = vec![0u8; 4096];
        data[0..4].copy_from_slice(&MAGIC);
        data[VERSIONNUM_OFF..VERSIONNUM_OFF + 2].copy_from_slice(&5u16.to_be_bytes());
        data[UUID_OFF..UUID_OFF + 16].copy_from_slice(&[3u8; 16]);
        data[FNAME_OFF..FNAME_OFF + 4].copy_from_slice(b"data");
        data
    }

    #[test]
    fn detects_xfs_superblock() {
        let _ = env_logger::try_init();
        let mut session: Session<Cursor<Vec<u8>>> = Session::new();
        session.set_request(RequestFlags::all_values());
        let data = image_with_xfs_sb();
        let size = data.len() as u64;
        session.set_device(Cursor::new(data), 0, size);
        assert_eq!(session.step().unwrap(), StepOutcome::Match);
        assert_eq!(session.lookup_value("TYPE").unwrap().as_str(), Some("xfs"));
        assert_eq!(session.lookup_value("VERSION").unwrap().as_str(), Some("V5"));
        assert_eq!(session.lookup_value("LABEL").unwrap().as_str(), Some("data"));
    }

    #[test]
    fn rejects_non_xfs_magic() {
        let mut session: Session<Cursor<Vec<u8>>> = Session::new();
        session.set_request(RequestFlags::all_values());
        let mut data = image_with_xfs_sb();
        data[0] = 0;
        let size = data.len() as u64;
        session.set_device(Cursor::new(data), 0, size);
        assert_eq!(session.step().unwrap(), StepOutcome::Exhausted);
    }
}
