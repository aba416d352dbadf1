//! Consumes a file-drop record stream into the spool (§4.5).

use std::path::{Path, PathBuf};

use pc_core::error::{ClipError, ClipResult};
use pc_core::filedrop::{EntryKind, FileDropEntry};
use pc_wire::codec;
use pc_wire::tags;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::record::decode_record_tag;

/// Receives a file-drop transfer, assuming the caller has already read and
/// acknowledged the `FileDrop` sentinel's format frame and is positioned at
/// that item's size frame (§4.5). Materializes directories and files under
/// `spool_root` and returns the final path list, directories ahead of the
/// files they contain, in the order records were received.
pub async fn receive_file_drop<S>(stream: &mut S, spool_root: &Path) -> ClipResult<Vec<PathBuf>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // The sentinel item itself carries no payload.
    let sentinel_size = codec::read_i64(stream).await?;
    codec::write_u16(stream, tags::SUCCESS_SIZE).await?;
    let _ = codec::read_payload(stream, sentinel_size).await?;
    codec::write_u16(stream, tags::SUCCESS_DATA).await?;

    let mut next = codec::read_u16(stream).await?;
    let mut materialized = Vec::new();

    loop {
        match next {
            tags::FINISH => break,
            tags::MORE_DATA => {}
            tags::ERROR => return Err(ClipError::TransferFailed),
            other => return Err(ClipError::UnsupportedFormat(format!("tag {other}"))),
        }

        let tag = codec::read_string(stream).await?;
        let (kind, relative_path) = match decode_record_tag(&tag) {
            Ok(parsed) => parsed,
            Err(e) => {
                codec::write_u16(stream, tags::ERROR).await?;
                return Err(e);
            }
        };
        codec::write_u16(stream, tags::SUCCESS_FORMAT).await?;

        let size = codec::read_i64(stream).await?;
        codec::write_u16(stream, tags::SUCCESS_SIZE).await?;

        let entry = match kind {
            EntryKind::Directory => FileDropEntry::directory(relative_path.clone()),
            EntryKind::File => FileDropEntry::file(relative_path.clone(), size),
        };
        if entry.is_unsafe_path() {
            codec::write_u16(stream, tags::ERROR).await?;
            return Err(ClipError::UnsafePath(relative_path));
        }

        let payload = codec::read_payload(stream, size).await?;
        let target = spool_root.join(&relative_path);
        match kind {
            EntryKind::Directory => {
                tokio::fs::create_dir_all(&target).await?;
            }
            EntryKind::File => {
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&target, &payload).await?;
            }
        }
        codec::write_u16(stream, tags::SUCCESS_DATA).await?;
        materialized.push(target);

        next = codec::read_u16(stream).await?;
    }

    Ok(materialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_record_tag;
    use tempfile::tempdir;
    use tokio::io::duplex;

    #[tokio::test]
    async fn rejects_unsafe_relative_path() {
        let spool = tempdir().unwrap();
        let (mut client, mut server) = duplex(4096);

        let entry = FileDropEntry::file("../evil", 4);
        let client_task = tokio::spawn(async move {
            codec::write_i64(&mut client, 0).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap();
            let _ = codec::read_payload(&mut client, 0).await;
            let _ = codec::read_u16(&mut client).await.unwrap();

            codec::write_u16(&mut client, tags::MORE_DATA).await.unwrap();
            codec::write_string(&mut client, &encode_record_tag(&entry)).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap();
            codec::write_i64(&mut client, 4).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap();
        });

        let result = receive_file_drop(&mut server, spool.path()).await;
        client_task.await.unwrap();
        assert!(matches!(result, Err(ClipError::UnsafePath(_))));
    }

    #[tokio::test]
    async fn materializes_directory_then_file() {
        let spool = tempdir().unwrap();
        let (mut client, mut server) = duplex(8192);

        let dir_entry = FileDropEntry::directory("d");
        let file_entry = FileDropEntry::file("d/a.txt", 5);

        let client_task = tokio::spawn(async move {
            // Sentinel item: empty payload.
            codec::write_i64(&mut client, 0).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessSize
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessData

            // Directory record.
            codec::write_u16(&mut client, tags::MORE_DATA).await.unwrap();
            codec::write_string(&mut client, &encode_record_tag(&dir_entry)).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessFormat
            codec::write_i64(&mut client, 0).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessSize
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessData

            // File record.
            codec::write_u16(&mut client, tags::MORE_DATA).await.unwrap();
            codec::write_string(&mut client, &encode_record_tag(&file_entry)).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessFormat
            codec::write_i64(&mut client, 5).await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessSize
            codec::write_payload(&mut client, b"hello").await.unwrap();
            let _ = codec::read_u16(&mut client).await.unwrap(); // SuccessData

            codec::write_u16(&mut client, tags::FINISH).await.unwrap();
        });

        let paths = receive_file_drop(&mut server, spool.path()).await.unwrap();
        client_task.await.unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("d"));
        assert!(paths[1].ends_with("d/a.txt"));
        let content = tokio::fs::read(&paths[1]).await.unwrap();
        assert_eq!(content, b"hello");
    }
}
