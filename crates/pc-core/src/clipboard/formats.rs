//! Known clipboard format names and the host-object encode/decode table.

/// Plain text, host-native encoding (UTF-8 on the wire).
pub const TEXT: &str = "Text";
/// UTF-16LE text.
pub const UNICODE_TEXT: &str = "UnicodeText";
/// .NET-style string format, UTF-8 on the wire.
pub const SYSTEM_STRING: &str = "System.String";
/// ASCII text.
pub const OEM_TEXT: &str = "OEMText";
/// Rich Text Format document, UTF-8 on the wire.
pub const RICH_TEXT_FORMAT: &str = "Rich Text Format";
/// Locale identifier, raw bytes.
pub const LOCALE: &str = "Locale";
/// HTML clipboard fragment, UTF-8 on the wire.
pub const HTML_FORMAT: &str = "HTML Format";
/// Waveform audio. Recognized, never converted (see design notes).
pub const WAVE_AUDIO: &str = "WaveAudio";
/// Legacy device-dependent bitmap. Recognized, never converted.
pub const BITMAP: &str = "Bitmap";
/// Device-independent bitmap payload; see `pc_wire::image` for BMP conversion.
pub const DIB: &str = "Dib";
/// File/folder drop list sentinel.
pub const FILE_DROP: &str = "FileDrop";

/// How a format's bytes relate to the host-side representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 text.
    Utf8,
    /// UTF-16, little-endian.
    Utf16Le,
    /// ASCII text.
    Ascii,
    /// Opaque bytes, passed through unchanged.
    Raw,
}

/// Looks up the encoding used by a known format name. Unknown formats (and
/// `WaveAudio`/`Bitmap`, which have no converter wired) fall through to
/// `Encoding::Raw`.
pub fn encoding_for(format: &str) -> Encoding {
    match format {
        TEXT | SYSTEM_STRING | HTML_FORMAT | RICH_TEXT_FORMAT => Encoding::Utf8,
        UNICODE_TEXT => Encoding::Utf16Le,
        OEM_TEXT => Encoding::Ascii,
        LOCALE | DIB => Encoding::Raw,
        _ => Encoding::Raw,
    }
}

/// Decodes a format's raw wire bytes into a host-displayable string, when the
/// format has a text encoding. Returns `None` for raw/opaque formats.
pub fn decode_to_string(format: &str, bytes: &[u8]) -> Option<String> {
    match encoding_for(format) {
        Encoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
        Encoding::Utf16Le => {
            if bytes.len() % 2 != 0 {
                return None;
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        Encoding::Ascii => {
            if bytes.iter().all(|b| b.is_ascii()) {
                Some(bytes.iter().map(|&b| b as char).collect())
            } else {
                None
            }
        }
        Encoding::Raw => None,
    }
}

/// Encodes a host string into a format's wire bytes.
pub fn encode_from_string(format: &str, s: &str) -> Vec<u8> {
    match encoding_for(format) {
        Encoding::Utf8 => s.as_bytes().to_vec(),
        Encoding::Utf16Le => s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect(),
        Encoding::Ascii => s.chars().map(|c| c as u8).collect(),
        Encoding::Raw => s.as_bytes().to_vec(),
    }
}
