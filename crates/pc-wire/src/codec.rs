//! Little-endian framing primitives shared by the data client and server
//! (§4.1). Every read that hits a closed stream before filling its buffer
//! surfaces as `ClipError::EndOfStream` rather than a raw I/O error, so
//! callers can distinguish "peer hung up mid-frame" from other transport
//! failures.

use pc_core::error::{ClipError, ClipResult};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Minimum size of pooled bulk-transfer chunk buffers (§4.1, §5).
pub const CHUNK_SIZE: usize = 64 * 1024;

async fn read_exact_mapped<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> ClipResult<()> {
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ClipError::EndOfStream),
        Err(e) => Err(ClipError::Io(e)),
    }
}

/// Reads a little-endian `u16`.
pub async fn read_u16<R: AsyncRead + Unpin>(reader: &mut R) -> ClipResult<u16> {
    let mut buf = [0u8; 2];
    read_exact_mapped(reader, &mut buf).await?;
    Ok(u16::from_le_bytes(buf))
}

/// Writes a little-endian `u16`.
pub async fn write_u16<W: AsyncWrite + Unpin>(writer: &mut W, value: u16) -> ClipResult<()> {
    writer.write_all(&value.to_le_bytes()).await?;
    Ok(())
}

/// Reads a little-endian `i64`.
pub async fn read_i64<R: AsyncRead + Unpin>(reader: &mut R) -> ClipResult<i64> {
    let mut buf = [0u8; 8];
    read_exact_mapped(reader, &mut buf).await?;
    Ok(i64::from_le_bytes(buf))
}

/// Writes a little-endian `i64`.
pub async fn write_i64<W: AsyncWrite + Unpin>(writer: &mut W, value: i64) -> ClipResult<()> {
    writer.write_all(&value.to_le_bytes()).await?;
    Ok(())
}

/// Reads a length-prefixed UTF-8 string: an `i32` byte count followed by
/// exactly that many bytes. An empty string is a zero-length prefix.
pub async fn read_string<R: AsyncRead + Unpin>(reader: &mut R) -> ClipResult<String> {
    let mut len_buf = [0u8; 4];
    read_exact_mapped(reader, &mut len_buf).await?;
    let len = i32::from_le_bytes(len_buf);
    if len < 0 {
        return Err(ClipError::EndOfStream);
    }
    let mut buf = vec![0u8; len as usize];
    read_exact_mapped(reader, &mut buf).await?;
    String::from_utf8(buf).map_err(|_| ClipError::EndOfStream)
}

/// Writes a length-prefixed UTF-8 string.
pub async fn write_string<W: AsyncWrite + Unpin>(writer: &mut W, value: &str) -> ClipResult<()> {
    let bytes = value.as_bytes();
    let len: i32 = bytes
        .len()
        .try_into()
        .map_err(|_| ClipError::EndOfStream)?;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(bytes).await?;
    Ok(())
}

/// Reads exactly `len` bytes of payload, in `CHUNK_SIZE`-sized pulls from a
/// pooled buffer so a single large transfer doesn't force one giant
/// allocation up front.
pub async fn read_payload<R: AsyncRead + Unpin>(reader: &mut R, len: i64) -> ClipResult<bytes::Bytes> {
    if len < 0 {
        return Err(ClipError::EndOfStream);
    }
    let len = len as usize;
    let mut out = bytes::BytesMut::with_capacity(len.min(CHUNK_SIZE));
    let mut remaining = len;
    let mut chunk = vec![0u8; CHUNK_SIZE];
    while remaining > 0 {
        let take = remaining.min(CHUNK_SIZE);
        read_exact_mapped(reader, &mut chunk[..take]).await?;
        out.extend_from_slice(&chunk[..take]);
        remaining -= take;
    }
    Ok(out.freeze())
}

/// Streams `payload` out in `CHUNK_SIZE`-sized writes.
pub async fn write_payload<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> ClipResult<()> {
    for chunk in payload.chunks(CHUNK_SIZE) {
        writer.write_all(chunk).await?;
    }
    Ok(())
}
