//! Packet and header tag definitions

use crate::error::ProtocolError;

/// [`Header::StashDenied`] reason byte: no configured file can take the page
pub const DENY_NO_SPACE: u8 = 1;
/// [`Header::StashDenied`] reason byte: the process exhausted its chunk quota
pub const DENY_QUOTA_EXCEEDED: u8 = 2;

/// Header tag space for the swap flow.
///
/// Tags 0-2 are the generic control set shared by every module of the
/// surrounding system; 3-4 are the one-time policy handshake selectors; the
/// rest carry swap requests and their replies. The numeric values are the
/// wire representation and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Header {
    /// Liveness probe, answered with [`Header::Ack`]
    Ping = 0,
    /// Positive generic reply
    Ack = 1,
    /// Peer announces it is going away
    Disconnected = 2,
    /// Handshake selector: fixed-chunk allocation
    PolicyFixed = 3,
    /// Handshake selector: global allocation
    PolicyGlobal = 4,
    /// Park one page: payload = pid:u32, page:u32, content bytes
    PageStash = 5,
    /// Stash accepted: payload = file index:u32, slot:u32
    StashOk = 6,
    /// Stash denied: payload = one reason byte
    StashDenied = 7,
}

impl TryFrom<u32> for Header {
    type Error = ProtocolError;

    fn try_from(tag: u32) -> Result<Self, ProtocolError> {
        Ok(match tag {
            0 => Header::Ping,
            1 => Header::Ack,
            2 => Header::Disconnected,
            3 => Header::PolicyFixed,
            4 => Header::PolicyGlobal,
            5 => Header::PageStash,
            6 => Header::StashOk,
            7 => Header::StashDenied,
            other => return Err(ProtocolError::UnknownHeader(other)),
        })
    }
}

/// One framed message: a header tag plus an opaque payload.
///
/// Packets are built per message and dropped as soon as the handler has
/// consumed them; nothing in the codec retains them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Routing tag
    pub header: Header,
    /// Raw payload bytes; interpretation is the handler's business
    pub payload: Vec<u8>,
}

impl Packet {
    /// Packet with a payload
    pub fn new(header: Header, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    /// Packet with an empty payload (control messages)
    pub fn empty(header: Header) -> Self {
        Self {
            header,
            payload: Vec::new(),
        }
    }
}
