//! Encoding of a `FileDropEntry` onto the wire's (format, size, payload) slot.
//!
//! The general item envelope (§4.4) has no field dedicated to a relative
//! path, only `format` (a length-prefixed string) and `size`+payload. Once
//! control has transferred to the file receiver (§4.5), this implementation
//! reuses the `format` slot to carry both the entry's kind and its relative
//! path, joined by a `\0` separator (relative paths are validated to be
//! plain forward-slash segments, so they never contain a NUL byte
//! themselves). `size`/payload still carry the file body, 0/none for a
//! directory.

use pc_core::error::{ClipError, ClipResult};
use pc_core::filedrop::{EntryKind, FileDropEntry};

const DIRECTORY_TAG: &str = "Directory";
const FILE_TAG: &str = "File";

/// Encodes a `FileDropEntry`'s kind and relative path into the string sent
/// as that record's `format`.
pub fn encode_record_tag(entry: &FileDropEntry) -> String {
    let tag = match entry.kind() {
        EntryKind::Directory => DIRECTORY_TAG,
        EntryKind::File => FILE_TAG,
    };
    format!("{tag}\0{}", entry.relative_path())
}

/// Decodes a record tag back into its kind and relative path.
pub fn decode_record_tag(tag: &str) -> ClipResult<(EntryKind, String)> {
    let (kind_str, path) = tag
        .split_once('\0')
        .ok_or_else(|| ClipError::UnsupportedFormat(tag.to_string()))?;
    let kind = match kind_str {
        DIRECTORY_TAG => EntryKind::Directory,
        FILE_TAG => EntryKind::File,
        other => return Err(ClipError::UnsupportedFormat(other.to_string())),
    };
    Ok((kind, path.to_string()))
}
