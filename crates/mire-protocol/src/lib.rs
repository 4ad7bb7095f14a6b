//! Wire protocol for the mire swap backend
//!
//! A connection carries a stream of length-prefixed packets: a fixed-width
//! header tag, a payload length, then exactly that many payload bytes. The
//! first packet on a connection is the policy handshake; everything after it
//! is a swap request routed by its header tag.
//!
//! Framing errors are final. A failed read or write leaves the stream in an
//! unknown position, so callers must drop the connection rather than resync.

pub mod codec;
pub mod error;
pub mod packet;

pub use codec::{read_packet, write_packet, MAX_PAYLOAD};
pub use error::{ProtocolError, ProtocolResult};
pub use packet::{Header, Packet, DENY_NO_SPACE, DENY_QUOTA_EXCEEDED};
