//! Per-connection state machine: handshake, then the serving loop
//!
//! The loop is strictly sequential: one request is fully processed (decode,
//! delay, handle, discard) before the next byte is read. There is no exit
//! transition from the serving state; the only way out is a transport fault,
//! which is fatal to the whole process.

use std::convert::Infallible;
use std::time::Duration;

use mire_protocol::{read_packet, Header, ProtocolError};
use mire_store::{Policy, StoreError, SwapFile};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::handlers;

/// Faults that end the connection, and with it the process.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Framing or socket failure
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Backing file could not be written
    #[error(transparent)]
    Store(#[from] StoreError),

    /// First packet did not carry a policy selector
    #[error("handshake packet carried {0:?} instead of a policy selector")]
    BadHandshake(Header),

    /// Peer tried to re-select a policy after the handshake
    #[error("policy selector {0:?} received after the policy was already bound")]
    PolicyRebind(Header),

    /// Request payload too short for its header's layout
    #[error("{header:?} payload of {len} bytes is too short")]
    MalformedPayload {
        /// Header of the offending packet
        header: Header,
        /// Actual payload length
        len: usize,
    },
}

/// Everything the dispatch loop owns: the swap-file set plus the config
/// values the core interprets. Built once at startup and passed by
/// ownership; there are no ambient globals.
#[derive(Debug)]
pub struct ServerCtx {
    /// The configured swap files, in config order
    pub files: Vec<SwapFile>,
    /// Slots per chunk (fixed-policy quota)
    pub max_frames: usize,
    /// Artificial per-request latency
    pub delay: Duration,
}

/// Drive one connection to its (fatal) end.
///
/// Binds the allocation policy from the first packet, then loops forever
/// decoding and handling requests. Returns only with an error; `Ok` is
/// uninhabited.
pub async fn serve<S>(stream: &mut S, ctx: &mut ServerCtx) -> Result<Infallible, ServeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let hello = read_packet(stream).await?;
    let policy = match hello.header {
        Header::PolicyFixed => Policy::Fixed,
        Header::PolicyGlobal => Policy::Global,
        other => return Err(ServeError::BadHandshake(other)),
    };
    tracing::info!(?policy, "allocation policy bound for this connection");

    loop {
        let packet = read_packet(stream).await?;
        // Unconditional simulated swap latency, not a cancellable timer.
        tokio::time::sleep(ctx.delay).await;
        handlers::handle(&packet, stream, policy, ctx).await?;
    }
}
