//! Frame codec: `tag:u32 | payload_len:u32 | payload bytes`, big endian.
//!
//! `read_packet` accumulates reads until the declared byte counts are fully
//! satisfied; `write_packet` pushes until every byte is out. There is no
//! partial-message recovery in either direction: any error means the caller
//! must treat the connection as dead.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, ProtocolResult};
use crate::packet::{Header, Packet};

/// Ceiling on a declared payload length, checked before allocating
pub const MAX_PAYLOAD: u32 = 16 * 1024 * 1024;

/// Read one whole packet from the stream.
///
/// Blocks until the 8-byte frame head and the full payload have arrived.
/// EOF at any point maps to [`ProtocolError::PeerClosed`]; the distinction
/// between an orderly close and a torn connection does not matter here, both
/// end the connection's life.
pub async fn read_packet<R>(stream: &mut R) -> ProtocolResult<Packet>
where
    R: AsyncRead + Unpin,
{
    let mut head = [0u8; 8];
    read_full(stream, &mut head).await?;

    let tag = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
    let len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]);

    let header = Header::try_from(tag)?;
    if len > MAX_PAYLOAD {
        return Err(ProtocolError::OversizedPayload(len));
    }

    let mut payload = vec![0u8; len as usize];
    read_full(stream, &mut payload).await?;

    tracing::trace!(?header, len, "packet in");
    Ok(Packet { header, payload })
}

/// Write one whole packet to the stream, retrying via `write_all` until every
/// byte is transmitted or the transport faults.
pub async fn write_packet<W>(stream: &mut W, packet: &Packet) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin,
{
    // Same ceiling as the read side: never emit a frame our own decoder
    // would refuse, and never let the length prefix truncate.
    if packet.payload.len() > MAX_PAYLOAD as usize {
        return Err(ProtocolError::OversizedPayload(
            u32::try_from(packet.payload.len()).unwrap_or(u32::MAX),
        ));
    }

    let mut frame = Vec::with_capacity(8 + packet.payload.len());
    frame.extend_from_slice(&(packet.header as u32).to_be_bytes());
    frame.extend_from_slice(&(packet.payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&packet.payload);

    stream.write_all(&frame).await?;
    stream.flush().await?;

    tracing::trace!(header = ?packet.header, len = packet.payload.len(), "packet out");
    Ok(())
}

async fn read_full<R>(stream: &mut R, buf: &mut [u8]) -> ProtocolResult<()>
where
    R: AsyncRead + Unpin,
{
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ProtocolError::PeerClosed),
        Err(e) => Err(ProtocolError::Io(e)),
    }
}
