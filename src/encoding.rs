/*!
Text encodings understood by the reader, and detection of the encoding of a byte buffer.

Detection is a strict trial decode: each candidate is tried in order against the whole buffer,
and the first one under which every byte sequence is valid wins. Order matters, since the same
bytes are frequently valid under several encodings (pure ASCII is valid everywhere, and every
byte string is valid Latin-1), so the narrowest encodings come first.
*/
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use encoding_rs::{Decoder, DecoderResult, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

use crate::error::*;

/// Candidates tried, in order, when no encoding is given to the reader.
pub const DEFAULT_ENCODINGS: [Encoding; 5] = [
    Encoding::Utf8,
    Encoding::Windows1252,
    Encoding::Latin1,
    Encoding::Ascii,
    Encoding::Utf16,
];

// bytes with no mapping in the Windows-1252 code page
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// A character encoding of the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8; a leading byte order mark is dropped when transcoding.
    Utf8,
    /// Windows code page 1252, with its five undefined bytes rejected.
    Windows1252,
    /// ISO-8859-1; every byte maps to the code point of the same value.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
    /// UTF-16, little-endian unless a byte order mark says otherwise.
    Utf16,
    /// Any other encoding known to `encoding_rs` (e.g. `Shift_JIS`), decoded without
    /// replacement.
    Other(&'static encoding_rs::Encoding),
}

impl Encoding {
    /// Canonical name of this encoding.
    pub fn name(&self) -> &'static str {
        match *self {
            Encoding::Utf8 => "utf-8",
            Encoding::Windows1252 => "windows-1252",
            Encoding::Latin1 => "latin-1",
            Encoding::Ascii => "ascii",
            Encoding::Utf16 => "utf-16",
            Encoding::Other(encoding) => encoding.name(),
        }
    }

    /// Decode all of `bytes`, returning `None` if any byte sequence is invalid in this encoding.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match *self {
            Encoding::Utf8 => simdutf8::basic::from_utf8(bytes).ok().map(Cow::Borrowed),
            Encoding::Windows1252 => {
                if bytes.iter().any(|b| WINDOWS_1252_UNDEFINED.contains(b)) {
                    None
                } else {
                    Some(WINDOWS_1252.decode_without_bom_handling(bytes).0)
                }
            }
            Encoding::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
            Encoding::Ascii => {
                if bytes.is_ascii() {
                    std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
                } else {
                    None
                }
            }
            Encoding::Utf16 | Encoding::Other(_) => {
                let decoder = self.stream_decoder(bytes)?;
                decode_to_end(decoder, bytes).map(Cow::Owned)
            }
        }
    }

    /// Streaming decoder for encodings that carry state between chunks of input (multi-byte
    /// sequences, byte order marks), given the first bytes of the input. `None` for the
    /// single-byte encodings.
    pub(crate) fn stream_decoder(&self, head: &[u8]) -> Option<Decoder> {
        match *self {
            Encoding::Utf8 => Some(UTF_8.new_decoder_with_bom_removal()),
            // a big-endian BOM picks big-endian; anything else, BOM or not, is little-endian
            Encoding::Utf16 if head.starts_with(&[0xFE, 0xFF]) => {
                Some(UTF_16BE.new_decoder_with_bom_removal())
            }
            Encoding::Utf16 => Some(UTF_16LE.new_decoder_with_bom_removal()),
            Encoding::Other(encoding) => Some(encoding.new_decoder_with_bom_removal()),
            Encoding::Windows1252 | Encoding::Latin1 | Encoding::Ascii => None,
        }
    }
}

fn decode_to_end(mut decoder: Decoder, bytes: &[u8]) -> Option<String> {
    let capacity = decoder.max_utf8_buffer_length_without_replacement(bytes.len())?;
    let mut output = String::with_capacity(capacity);
    match decoder.decode_to_string_without_replacement(bytes, &mut output, true) {
        (DecoderResult::InputEmpty, _) => Some(output),
        (DecoderResult::Malformed(_, _), _) | (DecoderResult::OutputFull, _) => None,
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Encoding {
    type Err = ReaderError;

    fn from_str(label: &str) -> Result<Encoding> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        let encoding = match normalized.as_str() {
            "utf8" | "u8" => Encoding::Utf8,
            "cp1252" | "windows1252" => Encoding::Windows1252,
            "latin1" | "latin" | "l1" | "iso88591" | "8859" | "cp819" => Encoding::Latin1,
            "ascii" | "usascii" | "646" => Encoding::Ascii,
            "utf16" | "u16" => Encoding::Utf16,
            _ => match encoding_rs::Encoding::for_label(label.trim().as_bytes()) {
                Some(encoding) => Encoding::Other(encoding),
                None => return Err(ReaderError::UnknownEncoding(label.to_string())),
            },
        };
        Ok(encoding)
    }
}

/// Find the first encoding in `candidates` under which all of `data` decodes without error.
///
/// Returns `None` if no candidate fits. With `DEFAULT_ENCODINGS` this can't happen, since every
/// byte string is valid Latin-1.
pub fn guess_encoding(data: &[u8], candidates: &[Encoding]) -> Option<Encoding> {
    candidates
        .iter()
        .find(|encoding| encoding.decode(data).is_some())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_guessed_as_utf8() {
        assert_eq!(guess_encoding(b"f1,f2\r\n1,2\r\n", &DEFAULT_ENCODINGS), Some(Encoding::Utf8));
    }

    #[test]
    fn first_matching_candidate_wins() {
        let candidates = [Encoding::Ascii, Encoding::Utf8];
        assert_eq!(guess_encoding(b"plain", &candidates), Some(Encoding::Ascii));
        assert_eq!(guess_encoding("caf\u{e9}".as_bytes(), &candidates), Some(Encoding::Utf8));
    }

    #[test]
    fn windows_1252_before_latin1() {
        // 0xE9 alone is not valid UTF-8
        assert_eq!(guess_encoding(b"caf\xe9", &DEFAULT_ENCODINGS), Some(Encoding::Windows1252));
        assert_eq!(
            Encoding::Windows1252.decode(b"caf\xe9 \x80").as_deref(),
            Some("caf\u{e9} \u{20ac}")
        );
    }

    #[test]
    fn undefined_windows_1252_falls_to_latin1() {
        assert_eq!(guess_encoding(b"a\x81b", &DEFAULT_ENCODINGS), Some(Encoding::Latin1));
        assert_eq!(Encoding::Latin1.decode(b"a\x81b").as_deref(), Some("a\u{81}b"));
    }

    #[test]
    fn utf16_with_bom() {
        let data = [0xFF, 0xFE, b'a', 0x00, b',', 0x00, b'b', 0x00];
        let candidates = [Encoding::Utf8, Encoding::Ascii, Encoding::Utf16];
        assert_eq!(guess_encoding(&data, &candidates), Some(Encoding::Utf16));
        assert_eq!(Encoding::Utf16.decode(&data).as_deref(), Some("a,b"));

        let big_endian = [0xFE, 0xFF, 0x00, b'x'];
        assert_eq!(Encoding::Utf16.decode(&big_endian).as_deref(), Some("x"));
    }

    #[test]
    fn utf16_rejects_odd_length() {
        assert_eq!(Encoding::Utf16.decode(&[b'a', 0x00, b'b']), None);
    }

    #[test]
    fn utf16_ignores_utf8_bom() {
        // odd length: never valid UTF-16, whatever the first bytes look like
        assert_eq!(Encoding::Utf16.decode(b"\xef\xbb\xbfab"), None);
        assert_eq!(guess_encoding(b"\xef\xbb\xbfab", &[Encoding::Ascii, Encoding::Utf16]), None);
    }

    #[test]
    fn no_candidate() {
        assert_eq!(guess_encoding(b"\xff\xfe\xfd", &[Encoding::Utf8, Encoding::Ascii]), None);
        assert_eq!(guess_encoding(b"anything", &[]), None);
    }

    #[test]
    fn empty_buffer_matches_first() {
        assert_eq!(guess_encoding(b"", &[Encoding::Utf16, Encoding::Utf8]), Some(Encoding::Utf16));
    }

    #[test]
    fn parse_labels() {
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("cp1252".parse::<Encoding>().unwrap(), Encoding::Windows1252);
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("us-ascii".parse::<Encoding>().unwrap(), Encoding::Ascii);
        assert_eq!("utf_16".parse::<Encoding>().unwrap(), Encoding::Utf16);
        assert_eq!(
            "shift_jis".parse::<Encoding>().unwrap(),
            Encoding::Other(encoding_rs::SHIFT_JIS)
        );
        assert!(matches!(
            "klingon".parse::<Encoding>(),
            Err(ReaderError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn other_encoding_decodes_strictly() {
        let sjis = Encoding::Other(encoding_rs::SHIFT_JIS);
        assert_eq!(sjis.decode(&[0x93, 0xFA, 0x96, 0x7B]).as_deref(), Some("日本"));
        assert_eq!(sjis.decode(&[0x93]), None);
    }
}
