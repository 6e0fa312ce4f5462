//! FAT12/16/32 BIOS Parameter Block.
//!
//! `magics` is empty in the registry entry for this descriptor (§4.4: "no
//! magic pre-check, always call parser") because the FAT12/16 and FAT32
//! extended BPBs put their informational `fs_type` string at two different
//! offsets; the parser itself disambiguates and performs the structural
//! check (the boot-sector 0x55 0xAA signature plus a recognized `fs_type`).

use crate::error::Result;
use crate::flags::RequestFlags;
use crate::registry::{MagicRule, Probe};
use crate::text;

use super::util::u32_le;

const BOOT_SIG_OFF: usize = 510;
const BOOT_SIG: [u8; 2] = [0x55, 0xAA];

const FAT16_FSTYPE_OFF: usize = 54;
const FAT16_VOLID_OFF: usize = 39;
const FAT16_LABEL_OFF: usize = 43;

const FAT32_FSTYPE_OFF: usize = 82;
const FAT32_VOLID_OFF: usize = 67;
const FAT32_LABEL_OFF: usize = 71;

const LABEL_LEN: usize = 11;
const BPB_READ_LEN: usize = 90;

pub fn probe(session: &mut dyn Probe, _rule: Option<&MagicRule>) -> Result<bool> {
    let sig: [u8; 2] = {
        let b = session.get_buffer(BOOT_SIG_OFF as u64, 2)?;
        [b[0], b[1]]
    };
    if sig != BOOT_SIG {
        return Ok(false);
    }

    let bpb: [u8; BPB_READ_LEN] = {
        let b = session.get_buffer(0, BPB_READ_LEN)?;
        let mut a = [0u8; BPB_READ_LEN];
        a.copy_from_slice(b);
        a
    };

    let (version, volid_off, label_off) =
        if &bpb[FAT16_FSTYPE_OFF..FAT16_FSTYPE_OFF + 8] == b"FAT16   " {
            ("FAT16", FAT16_VOLID_OFF, FAT16_LABEL_OFF)
        } else if &bpb[FAT16_FSTYPE_OFF..FAT16_FSTYPE_OFF + 8] == b"FAT12   " {
            ("FAT12", FAT16_VOLID_OFF, FAT16_LABEL_OFF)
        } else if &bpb[FAT32_FSTYPE_OFF..FAT32_FSTYPE_OFF + 8] == b"FAT32   " {
            ("FAT32", FAT32_VOLID_OFF, FAT32_LABEL_OFF)
        } else {
            return Ok(false);
        };

    if session.requested().contains(RequestFlags::VERSION) {
        session.set_version(version)?;
    }

    let label = text::trim_trailing_whitespace(&bpb[label_off..label_off + LABEL_LEN]);
    session.set_label(label)?;

    let serial = u32_le(&bpb[volid_off..volid_off + 4]);
    session.sprintf_uuid("UUID", &format!("{serial:08X}"))?;

    Ok(true)
}
