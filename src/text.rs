//! Text normalization: UTF-16 transcoding, whitespace trimming, UUID hex formatting.
//!
//! These are pure functions; the request-mask bookkeeping and value-store
//! interaction live on [`crate::session::Session`], which calls into here.

use uuid::Uuid;

/// Byte-endianness of a UTF-16 label as stored on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Utf16Encoding {
    LittleEndian,
    BigEndian,
}

/// The fixed ASCII whitespace set used to trim labels (open question §9.3:
/// never the platform locale's `isspace`).
fn is_ascii_label_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
}

/// Trim trailing bytes that are ASCII whitespace per `is_ascii_label_whitespace`.
pub fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && is_ascii_label_whitespace(bytes[end - 1]) {
        end -= 1;
    }
    &bytes[..end]
}

/// Encode a single Unicode scalar value as UTF-8 into `out`, returning the
/// number of bytes written, or `None` if `out` has no room.
fn push_utf8(out: &mut Vec<u8>, cap: usize, cp: u32) -> bool {
    let needed = if cp < 0x80 {
        1
    } else if cp < 0x800 {
        2
    } else {
        3
    };
    if out.len() + needed > cap {
        return false;
    }
    if cp < 0x80 {
        out.push(cp as u8);
    } else if cp < 0x800 {
        out.push(0xC0 | (cp >> 6) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    } else {
        out.push(0xE0 | (cp >> 12) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    }
    true
}

/// Transcode a UTF-16 label to UTF-8, stopping at a NUL code unit or when the
/// `cap`-byte destination (including the terminating NUL this function adds)
/// would overflow.
///
/// Surrogate pairs are not decoded: a lone surrogate code unit is emitted as
/// its raw three-byte UTF-8 encoding, matching the source behavior this spec
/// preserves (see the distilled spec's §4.6).
pub fn utf16_to_utf8(raw: &[u8], encoding: Utf16Encoding, cap: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(cap.min(raw.len()));
    let reserve_for_nul = cap.saturating_sub(1);
    for chunk in raw.chunks_exact(2) {
        let unit = match encoding {
            Utf16Encoding::LittleEndian => u16::from_le_bytes([chunk[0], chunk[1]]),
            Utf16Encoding::BigEndian => u16::from_be_bytes([chunk[0], chunk[1]]),
        };
        if unit == 0 {
            break;
        }
        if !push_utf8(&mut out, reserve_for_nul, unit as u32) {
            break;
        }
    }
    out.push(0);
    out
}

/// `true` if every byte of the 16-byte UUID is zero (the empty-UUID gate).
pub fn is_zero_uuid(bytes: &[u8; 16]) -> bool {
    bytes.iter().all(|&b| b == 0)
}

/// Canonical lower-case 8-4-4-4-12 hex form of a 16-byte UUID.
pub fn format_uuid(bytes: &[u8; 16]) -> String {
    Uuid::from_bytes(*bytes).hyphenated().to_string()
}

/// Lowercase any ASCII `A`-`F` hex digits in place (the fix for the open
/// question §9.4 off-by-one: callers apply this to the slot they just wrote,
/// not to one past the end of the value store).
pub fn lowercase_hex(s: &mut str) {
    // SAFETY: ASCII uppercase -> lowercase is a byte-for-byte substitution
    // that cannot change the UTF-8 validity of the string.
    unsafe {
        for b in s.as_bytes_mut() {
            if b.is_ascii_uppercase() {
                *b |= 0x20;
            }
        }
    }
}
