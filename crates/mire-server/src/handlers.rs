//! Per-header request handlers
//!
//! Handlers run inside the sequential dispatch loop with exclusive access to
//! the swap-file set. Allocation failures are answered on the wire and never
//! escalate; anything returned as an error here kills the connection.

use mire_protocol::{
    write_packet, Header, Packet, DENY_NO_SPACE, DENY_QUOTA_EXCEEDED,
};
use mire_store::{AllocError, AssignError, Policy};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::dispatch::{ServeError, ServerCtx};

/// Route one decoded packet to its handler.
pub async fn handle<S>(
    packet: &Packet,
    stream: &mut S,
    policy: Policy,
    ctx: &mut ServerCtx,
) -> Result<(), ServeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match packet.header {
        Header::Ping => {
            write_packet(stream, &Packet::empty(Header::Ack)).await?;
        }
        Header::Disconnected => {
            // The actual close surfaces as PeerClosed on the next read.
            tracing::info!("peer announced disconnect");
        }
        Header::PageStash => stash(packet, stream, policy, ctx).await?,
        Header::PolicyFixed | Header::PolicyGlobal => {
            return Err(ServeError::PolicyRebind(packet.header));
        }
        Header::Ack | Header::StashOk | Header::StashDenied => {
            tracing::warn!(header = ?packet.header, "reply-direction header from peer, ignoring");
        }
    }
    Ok(())
}

/// Park one page: payload = pid:u32 BE, page:u32 BE, content bytes.
async fn stash<S>(
    packet: &Packet,
    stream: &mut S,
    policy: Policy,
    ctx: &mut ServerCtx,
) -> Result<(), ServeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let payload = &packet.payload;
    if payload.len() < 8 {
        return Err(ServeError::MalformedPayload {
            header: packet.header,
            len: payload.len(),
        });
    }
    let pid = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let page = u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]);
    let content = &payload[8..];

    let reply = match policy.assign(&mut ctx.files, pid, page, content, ctx.max_frames) {
        Ok(placement) => {
            tracing::debug!(
                pid,
                page,
                file = placement.file_index,
                slot = placement.slot,
                "page stashed"
            );
            let mut out = Vec::with_capacity(8);
            out.extend_from_slice(&(placement.file_index as u32).to_be_bytes());
            out.extend_from_slice(&(placement.slot as u32).to_be_bytes());
            Packet::new(Header::StashOk, out)
        }
        Err(AssignError::Alloc(denied)) => {
            tracing::warn!(pid, page, reason = %denied, "stash denied");
            let reason = match denied {
                AllocError::NoSpace => DENY_NO_SPACE,
                AllocError::QuotaExceeded => DENY_QUOTA_EXCEEDED,
            };
            Packet::new(Header::StashDenied, vec![reason])
        }
        Err(AssignError::Store(fault)) => return Err(fault.into()),
    };

    write_packet(stream, &reply).await?;
    Ok(())
}
