//! Transport error taxonomy
//!
//! Every variant here is fatal to its connection. Allocation failures are a
//! different animal (see mire-store) and never surface through this type.

use thiserror::Error;

/// Errors raised by the packet codec. All of them mean the connection is dead.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying socket I/O failed mid-frame
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Orderly peer close (EOF) while a frame was expected
    #[error("peer closed the connection")]
    PeerClosed,

    /// Wire tag has no entry in the header enumeration
    #[error("unknown header tag on the wire: {0}")]
    UnknownHeader(u32),

    /// Declared payload length exceeds the frame ceiling
    #[error("declared payload of {0} bytes exceeds the frame ceiling")]
    OversizedPayload(u32),
}

/// Result type for codec operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
