//! ISO 9660 Primary Volume Descriptor.
//!
//! Layout per ECMA-119: sector 16 (2048-byte logical sectors) holds the
//! Primary Volume Descriptor, type byte 0x01 followed by the "CD001"
//! standard identifier and a one-byte version.

use crate::error::Result;
use crate::flags::RequestFlags;
use crate::registry::{MagicRule, Probe};
use crate::text;

pub const MAGIC: [u8; 5] = *b"CD001";

const SECTOR_SIZE: u64 = 2048;
const PVD_SECTOR: u64 = 16;
const SVD_SECTOR: u64 = 17;
const TYPE_OFF: usize = 0;
const VERSION_OFF: usize = 6;
const VOLUME_ID_OFF: usize = 40;
const VOLUME_ID_LEN: usize = 32;
const ESCAPE_SEQ_OFF: usize = 88;

const PRIMARY_TYPE: u8 = 1;
const SUPPLEMENTARY_TYPE: u8 = 2;

pub fn probe(session: &mut dyn Probe, _rule: Option<&MagicRule>) -> Result<bool> {
    let buf = session.get_buffer(PVD_SECTOR * SECTOR_SIZE, SECTOR_SIZE as usize)?;
    if buf[TYPE_OFF] != PRIMARY_TYPE || &buf[1..6] != &MAGIC || buf[VERSION_OFF] != 1 {
        return Ok(false);
    }

    let volume_id = text::trim_trailing_whitespace(&buf[VOLUME_ID_OFF..VOLUME_ID_OFF + VOLUME_ID_LEN]);
    session.set_label(volume_id)?;

    if session.requested().contains(RequestFlags::VERSION) {
        if let Ok(svd) = session.get_buffer(SVD_SECTOR * SECTOR_SIZE, SECTOR_SIZE as usize) {
            let is_joliet = svd[TYPE_OFF] == SUPPLEMENTARY_TYPE
                && &svd[1..6] == &MAGIC
                && matches!(
                    &svd[ESCAPE_SEQ_OFF..ESCAPE_SEQ_OFF + 2],
                    [0x25, 0x2F]
                );
            if is_joliet {
                session.set_version("Joliet")?;
            }
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, StepOutcome};
    use std::io::Cursor;

    fn image_with_iso9660(label: &[u8], joliet: bool) -> Vec<u8> {
        let mut data = vec![0u8; 18 * SECTOR_SIZE as usize];
        let pvd_start = (PVD_SECTOR * SECTOR_SIZE) as usize;
        data[pvd_start + TYPE_OFF] = PRIMARY_TYPE;
        data[pvd_start + 1..pvd_start + 6].copy_from_slice(&MAGIC);
        data[pvd_start + VERSION_OFF] = 1;
        let vol = &mut data[pvd_start + VOLUME_ID_OFF..pvd_start + VOLUME_ID_OFF + VOLUME_ID_LEN];
        vol.fill(b' ');
        vol[..label.len()].copy_from_slice(label);

        if joliet {
            let svd_start = (SVD_SECTOR * SECTOR_SIZE) as usize;
            data[svd_start + TYPE_OFF] = SUPPLEMENTARY_TYPE;
            data[svd_start + 1..svd_start + 6].copy_from_slice(&MAGIC);
            data[svd_start + VERSION_OFF] = 1;
            data[svd_start + ESCAPE_SEQ_OFF..svd_start + ESCAPE_SEQ_OFF + 2]
                .copy_from_slice(&[0x25, 0x2F]);
        }
        data
    }

    #[test]
    fn detects_iso9660_and_trims_label() {
        let _ = env_logger::try_init();
        let mut session: Session<Cursor<Vec<u8>>> = Session::new();
        session.set_request(RequestFlags::all_values());
        let data = image_with_iso9660(b"MY_DISC", false);
        let size = data.len() as u64;
        session.set_device(Cursor::new(data), 0, size);
        assert_eq!(session.step().unwrap(), StepOutcome::Match);
        assert_eq!(session.lookup_value("TYPE").unwrap().as_str(), Some("iso9660"));
        assert_eq!(session.lookup_value("LABEL").unwrap().as_str(), Some("MY_DISC"));
    }

    #[test]
    fn joliet_escape_sequence_sets_version() {
        let mut session: Session<Cursor<Vec<u8>>> = Session::new();
        session.set_request(RequestFlags::all_values());
        let data = image_with_iso9660(b"MY_DISC", true);
        let size = data.len() as u64;
        session.set_device(Cursor::new(data), 0, size);
        session.step().unwrap();
        assert_eq!(session.lookup_value("VERSION").unwrap().as_str(), Some("Joliet"));
    }
}
