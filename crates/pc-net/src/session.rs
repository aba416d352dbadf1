//! The clipboard-data and ping exchange that runs after a successful
//! handshake (§4.4), including the file-drop handoff (§4.5).

use pc_core::clipboard::{formats, ClipboardData, ClipboardItem};
use pc_core::error::{ClipError, ClipResult};
use pc_core::ports::Dispatch;
use pc_wire::{codec, tags};
use tokio::io::{AsyncRead, AsyncWrite};

/// Sends a single ping round: `i64=0` followed by the normal size
/// acknowledgment, with no further frames (§4.4, §4.6).
pub async fn send_ping<S>(stream: &mut S) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    codec::write_i64(stream, 0).await?;
    let ack = codec::read_u16(stream).await?;
    if ack != tags::SUCCESS_SIZE {
        return Err(ClipError::TransferFailed);
    }
    Ok(())
}

/// Sends a `ClipboardData` payload over an already-handshaked connection
/// (§4.4). Payload cursors are read once; callers must not reuse an item
/// whose payload has already been sent.
pub async fn send_clipboard_data<S>(stream: &mut S, data: &ClipboardData) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    codec::write_i64(stream, data.total_len()).await?;
    expect_tag(stream, tags::SUCCESS_SIZE).await?;

    let last = data.items().len().saturating_sub(1);
    for (i, item) in data.items().iter().enumerate() {
        codec::write_string(stream, item.format()).await?;
        expect_tag(stream, tags::SUCCESS_FORMAT).await?;
        codec::write_i64(stream, item.len() as i64).await?;
        expect_tag(stream, tags::SUCCESS_SIZE).await?;
        codec::write_payload(stream, item.payload()).await?;
        expect_tag(stream, tags::SUCCESS_DATA).await?;

        let tag = if i == last { tags::FINISH } else { tags::MORE_DATA };
        codec::write_u16(stream, tag).await?;
    }
    Ok(())
}

async fn expect_tag<S: AsyncRead + Unpin>(stream: &mut S, expected: u16) -> ClipResult<()> {
    let tag = codec::read_u16(stream).await?;
    if tag != expected {
        return Err(ClipError::TransferFailed);
    }
    Ok(())
}

/// Runs the server side of a connection after a successful handshake: reads
/// repeated (ping | clipboard-data | file-drop) rounds until the client
/// closes the stream.
pub async fn run_server_session<S>(stream: &mut S, dispatch: &dyn Dispatch) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let total = match codec::read_i64(stream).await {
            Ok(v) => v,
            Err(ClipError::EndOfStream) => return Ok(()),
            Err(e) => return Err(e),
        };

        if total == 0 {
            codec::write_u16(stream, tags::SUCCESS_SIZE).await?;
            continue;
        }

        codec::write_u16(stream, tags::SUCCESS_SIZE).await?;
        receive_round(stream, dispatch).await?;
    }
}

async fn receive_round<S>(stream: &mut S, dispatch: &dyn Dispatch) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut data = ClipboardData::new();
    loop {
        let format = codec::read_string(stream).await?;

        if format == formats::FILE_DROP {
            codec::write_u16(stream, tags::SUCCESS_FORMAT).await?;
            let spool = pc_transfer::recreate_spool().await?;
            let paths = pc_transfer::receive_file_drop(stream, &spool).await?;
            dispatch.deliver_file_paths(paths).await;
            return Ok(());
        }

        codec::write_u16(stream, tags::SUCCESS_FORMAT).await?;
        let size = codec::read_i64(stream).await?;
        codec::write_u16(stream, tags::SUCCESS_SIZE).await?;
        let payload = codec::read_payload(stream, size).await?;
        codec::write_u16(stream, tags::SUCCESS_DATA).await?;

        // Received Dib payloads are stored under the `Dib` key; the
        // historical misrouting under `Locale` is not reproduced here.
        if format == formats::DIB {
            if let Ok(bmp) = pc_wire::dib_to_bmp(&payload) {
                dispatch.deliver_image(bmp).await;
            }
        }
        data.push(ClipboardItem::new(format, payload));

        let next = codec::read_u16(stream).await?;
        match next {
            tags::MORE_DATA => continue,
            tags::FINISH => break,
            tags::ERROR => return Err(ClipError::TransferFailed),
            other => return Err(ClipError::UnsupportedFormat(format!("unexpected tag {other}"))),
        }
    }
    dispatch.deliver_clipboard_data(data).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use pc_core::ports::Dispatch;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tokio::io::duplex;

    #[derive(Default)]
    struct RecordingDispatch {
        clipboard: Mutex<Vec<ClipboardData>>,
        files: Mutex<Vec<Vec<PathBuf>>>,
        images: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl Dispatch for RecordingDispatch {
        async fn deliver_clipboard_data(&self, data: ClipboardData) {
            self.clipboard.lock().unwrap().push(data);
        }
        async fn deliver_file_paths(&self, paths: Vec<PathBuf>) {
            self.files.lock().unwrap().push(paths);
        }
        async fn deliver_image(&self, bmp: Vec<u8>) {
            self.images.lock().unwrap().push(bmp);
        }
    }

    #[tokio::test]
    async fn single_text_item_round_trips() {
        let (mut client, mut server) = duplex(4096);
        let dispatch = Arc::new(RecordingDispatch::default());
        let dispatch_clone = dispatch.clone();

        let mut data = ClipboardData::new();
        data.push(ClipboardItem::new("Text", Bytes::from_static(b"hi")));

        let client_task = tokio::spawn(async move { send_clipboard_data(&mut client, &data).await });
        let server_task = tokio::spawn(async move {
            let total = codec::read_i64(&mut server).await.unwrap();
            codec::write_u16(&mut server, tags::SUCCESS_SIZE).await.unwrap();
            assert_eq!(total, 2);
            receive_round(&mut server, dispatch_clone.as_ref()).await.unwrap();
        });

        client_task.await.unwrap().unwrap();
        server_task.await.unwrap();

        let delivered = dispatch.clipboard.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].items()[0].format(), "Text");
        assert_eq!(delivered[0].items()[0].payload().as_ref(), b"hi");
    }

    #[tokio::test]
    async fn multi_item_preserves_order() {
        let (mut client, mut server) = duplex(4096);
        let dispatch = Arc::new(RecordingDispatch::default());
        let dispatch_clone = dispatch.clone();

        let mut data = ClipboardData::new();
        data.push(ClipboardItem::new("UnicodeText", Bytes::from_static("\u{3b1}\u{3b2}".as_bytes())));
        data.push(ClipboardItem::new("HTML Format", Bytes::from_static(b"<b>x</b>")));

        let client_task = tokio::spawn(async move { send_clipboard_data(&mut client, &data).await });
        let server_task = tokio::spawn(async move {
            let _total = codec::read_i64(&mut server).await.unwrap();
            codec::write_u16(&mut server, tags::SUCCESS_SIZE).await.unwrap();
            receive_round(&mut server, dispatch_clone.as_ref()).await.unwrap();
        });

        client_task.await.unwrap().unwrap();
        server_task.await.unwrap();

        let delivered = dispatch.clipboard.lock().unwrap();
        let formats: Vec<&str> = delivered[0].items().iter().map(|i| i.format()).collect();
        assert_eq!(formats, vec!["UnicodeText", "HTML Format"]);
    }

    #[tokio::test]
    async fn ping_round_trip_leaves_connection_open() {
        let (mut client, mut server) = duplex(1024);
        let server_task = tokio::spawn(async move {
            let total = codec::read_i64(&mut server).await.unwrap();
            assert_eq!(total, 0);
            codec::write_u16(&mut server, tags::SUCCESS_SIZE).await.unwrap();
        });
        send_ping(&mut client).await.unwrap();
        server_task.await.unwrap();
    }
}
