//! Version handshake that precedes any payload on a fresh connection (§4.3).

use pc_core::error::{ClipError, ClipResult};
use pc_wire::{codec, tags};
use tokio::io::{AsyncRead, AsyncWrite};

/// Client side of the handshake: writes `Version`, then requires
/// `SuccessVersion` back. On mismatch the server has already written
/// `Error` and closed; the client surfaces `UnsupportedVersion`.
pub async fn client_handshake<S>(stream: &mut S) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    codec::write_u16(stream, tags::VERSION).await?;
    codec::write_u16(stream, tags::CURRENT_VERSION).await?;
    let ack = codec::read_u16(stream).await?;
    if ack != tags::SUCCESS_VERSION {
        return Err(ClipError::UnsupportedVersion(tags::CURRENT_VERSION));
    }
    Ok(())
}

/// Server side of the handshake: reads the version tag and number, validates
/// it, and writes `SuccessVersion` or `Error`.
pub async fn server_handshake<S>(stream: &mut S) -> ClipResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let tag = codec::read_u16(stream).await?;
    if tag != tags::VERSION {
        codec::write_u16(stream, tags::ERROR).await?;
        return Err(ClipError::UnsupportedVersion(tag));
    }
    let version = codec::read_u16(stream).await?;
    if version != tags::CURRENT_VERSION {
        codec::write_u16(stream, tags::ERROR).await?;
        return Err(ClipError::UnsupportedVersion(version));
    }
    codec::write_u16(stream, tags::SUCCESS_VERSION).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn matching_versions_succeed() {
        let (mut client, mut server) = duplex(1024);
        let client_task = tokio::spawn(async move { client_handshake(&mut client).await });
        let server_result = server_handshake(&mut server).await;
        let client_result = client_task.await.unwrap();
        assert!(server_result.is_ok());
        assert!(client_result.is_ok());
    }

    #[tokio::test]
    async fn mismatched_version_is_rejected_by_both_sides() {
        let (mut client, mut server) = duplex(1024);
        let client_task = tokio::spawn(async move {
            codec::write_u16(&mut client, tags::VERSION).await.unwrap();
            codec::write_u16(&mut client, 0xFFFF).await.unwrap();
            let ack = codec::read_u16(&mut client).await.unwrap();
            if ack != tags::SUCCESS_VERSION {
                Err(ClipError::UnsupportedVersion(0xFFFF))
            } else {
                Ok(())
            }
        });
        let server_result = server_handshake(&mut server).await;
        let client_result = client_task.await.unwrap();
        assert!(matches!(server_result, Err(ClipError::UnsupportedVersion(_))));
        assert!(matches!(client_result, Err(ClipError::UnsupportedVersion(_))));
    }
}
