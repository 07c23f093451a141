//! Single-byte codec for legacy project files
//!
//! Project sources are stored in ISO-8859-1. The WHATWG `windows-1252` codec
//! (what `encoding_rs` serves for the `iso-8859-1` label) maps every byte to
//! a character and back, so decoding never fails and unchanged text
//! re-encodes to identical bytes.

use encoding_rs::WINDOWS_1252;

/// Decode raw file bytes
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    let (text, _had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Encode text back to single-byte form
///
/// Returns `None` if the text holds a character the codec cannot represent.
#[must_use]
pub fn encode(text: &str) -> Option<Vec<u8>> {
    let (bytes, _, unmappable) = WINDOWS_1252.encode(text);
    if unmappable {
        None
    } else {
        Some(bytes.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_round_trip() {
        let bytes = b"s := 'Gr\xfc\xdfe'; // \xb0C\r\n".to_vec();
        let text = decode(&bytes);
        assert!(text.contains("Grüße"));
        assert!(text.contains("°C"));
        assert_eq!(encode(&text).unwrap(), bytes);
    }

    #[test]
    fn test_unmappable_character() {
        assert!(encode("x := '\u{4e2d}';").is_none());
    }
}
