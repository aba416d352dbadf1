//! The file/folder drop list data model (§3, §4.5).

/// Whether a file-drop entry names a directory or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory; always precedes the files it contains.
    Directory,
    /// A regular file; its body immediately follows on the wire.
    File,
}

/// One record of a file-drop stream.
///
/// `relative_path` always uses forward-slash segments and is validated by
/// the receiver to reject `..` components and absolute paths (`UnsafePath`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDropEntry {
    kind: EntryKind,
    relative_path: String,
    size: i64,
}

impl FileDropEntry {
    /// A directory record; directories carry no payload, so size is 0.
    pub fn directory(relative_path: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Directory,
            relative_path: relative_path.into(),
            size: 0,
        }
    }

    /// A file record; `size` is the exact byte count that follows on the wire.
    pub fn file(relative_path: impl Into<String>, size: i64) -> Self {
        Self {
            kind: EntryKind::File,
            relative_path: relative_path.into(),
            size,
        }
    }

    /// Whether this is a directory or file record.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The forward-slash relative path.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// File size in bytes; always 0 for directories.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// True when the path contains a `..` segment or is rooted (absolute).
    ///
    /// This is the check the receiver runs before materializing any entry
    /// under the spool; a positive result becomes `ClipError::UnsafePath`.
    pub fn is_unsafe_path(&self) -> bool {
        let path = std::path::Path::new(&self.relative_path);
        path.is_absolute()
            || self.relative_path.starts_with('/')
            || path.components().any(|c| matches!(c, std::path::Component::ParentDir))
    }
}
