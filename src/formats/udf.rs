//! UDF bridge format: Anchor Volume Descriptor Pointer + Primary Volume
//! Descriptor, per ECMA-167 3/10.2 and 3/10.1.
//!
//! This registry entry carries no [`MagicRule`] (§4.4: some descriptors are
//! "magic-free", always invoked, and self-validate structurally) because the
//! AVDP's only fixed byte pattern is its descriptor tag, which is cheaper to
//! check directly than to express as a `MagicRule` literal. Validation
//! reuses the teacher's descriptor-tag checksum scheme: a one-byte additive
//! checksum over the tag plus, when present, a CRC-16/UDF digest of the
//! descriptor body.

use crate::crc::cksum;
use crate::error::Result;
use crate::registry::{MagicRule, Probe};
use crate::text::Utf16Encoding;

use super::util::{u16_le, u32_le};

const AVDP_SECTOR: u64 = 256;
const SECTOR_SIZE: u64 = 2048;

const TAG_IDENTIFIER_AVDP: u16 = 2;
const TAG_IDENTIFIER_PVD: u16 = 1;

const MVDS_EXTENT_OFF: usize = 16;

const PVD_VOLUME_ID_OFF: usize = 24;
const PVD_VOLUME_ID_LEN: usize = 32;

fn tag_checksum_ok(buf: &[u8]) -> bool {
    if buf.len() < 16 {
        return false;
    }
    let sum = buf[0..4]
        .iter()
        .chain(&buf[5..16])
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum == buf[4]
}

fn descriptor_crc_ok(buf: &[u8]) -> bool {
    if buf.len() < 16 {
        return false;
    }
    let crc_length = u16_le(&buf[10..12]) as usize;
    if crc_length == 0 {
        return true;
    }
    let end = (16 + crc_length).min(buf.len());
    let expected = u16_le(&buf[8..10]);
    cksum(&buf[16..end]) == expected
}

fn tag_identifier(buf: &[u8]) -> u16 {
    u16_le(&buf[0..2])
}

/// Decode a CS0 (OSTA-compressed-Unicode) dstring as the teacher's `osta`
/// module does: a leading compression-ID byte, then either Latin-1-ish
/// single bytes (ID 8) or big-endian UTF-16 code units (ID 16).
fn decode_dstring(field: &[u8], session: &mut dyn Probe) -> Result<()> {
    if field.is_empty() {
        return session.set_label(&[]);
    }
    let compression_id = field[0];
    let body = &field[1..];
    match compression_id {
        16 => session.set_utf8label(body, Utf16Encoding::BigEndian),
        _ => session.set_label(body),
    }
}

pub fn probe(session: &mut dyn Probe, _rule: Option<&MagicRule>) -> Result<bool> {
    let avdp = session.get_buffer(AVDP_SECTOR * SECTOR_SIZE, SECTOR_SIZE as usize)?;
    if tag_identifier(avdp) != TAG_IDENTIFIER_AVDP
        || !tag_checksum_ok(avdp)
        || !descriptor_crc_ok(avdp)
    {
        return Ok(false);
    }

    let mvds_location = u32_le(&avdp[MVDS_EXTENT_OFF + 4..MVDS_EXTENT_OFF + 8]);

    let pvd_sector = mvds_location as u64;
    let pvd = match session.get_buffer(pvd_sector * SECTOR_SIZE, SECTOR_SIZE as usize) {
        Ok(buf) => buf,
        Err(_) => return Ok(true),
    };
    if tag_identifier(pvd) == TAG_IDENTIFIER_PVD && tag_checksum_ok(pvd) {
        let field = pvd[PVD_VOLUME_ID_OFF..PVD_VOLUME_ID_OFF + PVD_VOLUME_ID_LEN].to_vec();
        decode_dstring(&field, session)?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::RequestFlags;
    use crate::session::{Session, StepOutcome};
    use std::io::Cursor;

    fn tag(identifier: u16, body: &[u8]) -> Vec<u8> {
        let mut tag = vec![0u8; 16];
        tag[0..2].copy_from_slice(&identifier.to_le_bytes());
        let checksum = tag[0..4]
            .iter()
            .chain(&tag[5..16])
            .fold(0u8, |acc, &b| acc.wrapping_add(b));
        tag[4] = checksum;
        // descriptor_crc_length left at 0: no CRC body check required.
        let _ = body;
        tag
    }

    fn image_with_udf(label_compid: u8, label: &[u8]) -> Vec<u8> {
        let total_sectors = 300u64;
        let mut data = vec![0u8; (total_sectors * SECTOR_SIZE) as usize];

        let avdp_start = (AVDP_SECTOR * SECTOR_SIZE) as usize;
        let avdp_tag = tag(TAG_IDENTIFIER_AVDP, &[]);
        data[avdp_start..avdp_start + 16].copy_from_slice(&avdp_tag);
        // main_volume_descriptor_sequence_location: extent length @16, location @20
        let pvd_sector: u32 = 20;
        data[avdp_start + MVDS_EXTENT_OFF + 4..avdp_start + MVDS_EXTENT_OFF + 8]
            .copy_from_slice(&pvd_sector.to_le_bytes());

        let pvd_start = pvd_sector as usize * SECTOR_SIZE as usize;
        let pvd_tag = tag(TAG_IDENTIFIER_PVD, &[]);
        data[pvd_start..pvd_start + 16].copy_from_slice(&pvd_tag);
        let mut field = vec![0u8; PVD_VOLUME_ID_LEN];
        field[0] = label_compid;
        field[1..1 + label.len()].copy_from_slice(label);
        data[pvd_start + PVD_VOLUME_ID_OFF..pvd_start + PVD_VOLUME_ID_OFF + PVD_VOLUME_ID_LEN]
            .copy_from_slice(&field);

        data
    }

    #[test]
    fn detects_udf_and_decodes_latin1_label() {
        let _ = env_logger::try_init();
        let mut session: Session<Cursor<Vec<u8>>> = Session::new();
        session.set_request(RequestFlags::all_values());
        let data = image_with_udf(8, b"MyVolume");
        let size = data.len() as u64;
        session.set_device(Cursor::new(data), 0, size);
        assert_eq!(session.step().unwrap(), StepOutcome::Match);
        assert_eq!(session.lookup_value("TYPE").unwrap().as_str(), Some("udf"));
        assert_eq!(session.lookup_value("LABEL").unwrap().as_str(), Some("MyVolume"));
    }

    #[test]
    fn rejects_bad_tag_checksum() {
        let mut session: Session<Cursor<Vec<u8>>> = Session::new();
        session.set_request(RequestFlags::all_values());
        let mut data = image_with_udf(8, b"MyVolume");
        let avdp_start = (AVDP_SECTOR * SECTOR_SIZE) as usize;
        data[avdp_start + 4] ^= 0xFF;
        let size = data.len() as u64;
        session.set_device(Cursor::new(data), 0, size);
        assert_eq!(session.step().unwrap(), StepOutcome::Exhausted);
    }
}
