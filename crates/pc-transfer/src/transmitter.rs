//! Walks an OS-provided file-drop list and streams it as a framed record
//! sequence (§4.5).

use std::path::{Path, PathBuf};

use pc_core::clipboard::formats::FILE_DROP;
use pc_core::error::{ClipError, ClipResult};
use pc_core::filedrop::FileDropEntry;
use pc_wire::codec;
use pc_wire::tags;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::record::encode_record_tag;

/// One planned record: the entry itself, plus the on-disk source path for
/// file entries (directories have nothing to stream).
struct PlannedRecord {
    entry: FileDropEntry,
    source: Option<PathBuf>,
}

/// Recursively walks `paths`, producing records with directories ahead of
/// the files they contain, as §4.5 requires.
async fn plan_records(paths: &[PathBuf]) -> ClipResult<Vec<PlannedRecord>> {
    let mut records = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClipError::UnsafePath(format!("{path:?} has no file name")))?;
        walk(path, name, &mut records).await?;
    }
    Ok(records)
}

fn walk<'a>(
    path: &'a Path,
    relative: &'a str,
    records: &'a mut Vec<PlannedRecord>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = ClipResult<()>> + Send + 'a>> {
    Box::pin(async move {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.is_dir() {
            records.push(PlannedRecord {
                entry: FileDropEntry::directory(relative),
                source: None,
            });
            let mut entries = tokio::fs::read_dir(path).await?;
            while let Some(child) = entries.next_entry().await? {
                let child_name = child.file_name();
                let child_name = child_name
                    .to_str()
                    .ok_or_else(|| ClipError::UnsafePath(format!("{:?} is not valid UTF-8", child.path())))?;
                let child_relative = format!("{relative}/{child_name}");
                walk(&child.path(), &child_relative, records).await?;
            }
        } else {
            records.push(PlannedRecord {
                entry: FileDropEntry::file(relative, metadata.len() as i64),
                source: Some(path.to_path_buf()),
            });
        }
        Ok(())
    })
}

/// Sends a file-drop list over an already-handshaked connection.
///
/// Writes the §4.4 envelope with the `FileDrop` sentinel as the first item
/// (signalling the peer to switch into file-receiver mode), followed by one
/// record per directory/file discovered under `paths`.
pub async fn send_file_drop_list<S>(stream: &mut S, paths: &[PathBuf]) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let records = plan_records(paths).await?;
    let total_len: i64 = records.iter().map(|r| r.entry.size()).sum();

    codec::write_i64(stream, total_len).await?;
    expect_tag(stream, tags::SUCCESS_SIZE).await?;

    send_item(stream, FILE_DROP, &[]).await?;
    if !records.is_empty() {
        codec::write_u16(stream, tags::MORE_DATA).await?;
    } else {
        codec::write_u16(stream, tags::FINISH).await?;
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        let tag = encode_record_tag(&record.entry);
        match &record.source {
            None => send_item(stream, &tag, &[]).await?,
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                if bytes.len() as i64 != record.entry.size() {
                    return Err(ClipError::TransferFailed);
                }
                send_item(stream, &tag, &bytes).await?;
            }
        }
        let is_last = i + 1 == records.len();
        codec::write_u16(stream, if is_last { tags::FINISH } else { tags::MORE_DATA }).await?;
    }
    Ok(())
}

async fn send_item<S>(stream: &mut S, format: &str, payload: &[u8]) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    codec::write_string(stream, format).await?;
    expect_tag(stream, tags::SUCCESS_FORMAT).await?;
    codec::write_i64(stream, payload.len() as i64).await?;
    expect_tag(stream, tags::SUCCESS_SIZE).await?;
    codec::write_payload(stream, payload).await?;
    expect_tag(stream, tags::SUCCESS_DATA).await?;
    Ok(())
}

async fn expect_tag<S: AsyncRead + Unpin>(stream: &mut S, expected: u16) -> ClipResult<()> {
    let tag = codec::read_u16(stream).await?;
    if tag == tags::ERROR {
        return Err(ClipError::TransferFailed);
    }
    if tag != expected {
        return Err(ClipError::TransferFailed);
    }
    Ok(())
}
