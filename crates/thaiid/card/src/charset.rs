//! Text decoding for card payloads
//!
//! Text on the card is TIS-620. `encoding_rs` has no TIS-620 codec of its own
//! but windows-874 is a strict superset, so every valid TIS-620 byte string
//! decodes identically.

use encoding_rs::WINDOWS_874;
use tracing::debug;

/// Decode a TIS-620 payload, falling back to lossy UTF-8 on malformed input
///
/// The result is trimmed of whitespace and NUL padding.
pub fn decode_tis620(payload: &[u8]) -> String {
    let decoded = match WINDOWS_874.decode_without_bom_handling_and_without_replacement(payload) {
        Some(text) => text.into_owned(),
        None => {
            debug!(len = payload.len(), "TIS-620 decode failed, falling back to UTF-8");
            String::from_utf8_lossy(payload).into_owned()
        }
    };

    decoded
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        assert_eq!(decode_tis620(b"1234567890123"), "1234567890123");
        assert_eq!(decode_tis620(b"  Mr.#John##Doe   "), "Mr.#John##Doe");
    }

    #[test]
    fn test_decode_thai() {
        // "ชาย"
        assert_eq!(decode_tis620(&[0xAA, 0xD2, 0xC2]), "ชาย");
        // "นาย" padded with spaces
        assert_eq!(decode_tis620(&[0xB9, 0xD2, 0xC2, 0x20, 0x20]), "นาย");
    }

    #[test]
    fn test_decode_strips_nul_padding() {
        assert_eq!(decode_tis620(&[0x31, 0x00, 0x00]), "1");
        assert_eq!(decode_tis620(&[0x20, 0x00]), "");
    }
}
