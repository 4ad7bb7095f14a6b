//! Store error taxonomy
//!
//! Allocation failures are ordinary negative results: the caller reports
//! them to the peer and keeps serving. Storage failures break the durability
//! promise and are fatal, same as a transport fault.

use thiserror::Error;

/// A request the policy engine could not place. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// No configured file qualifies, or the pid's bound file has no free slot
    #[error("no swap file can take this page")]
    NoSpace,

    /// Fixed policy: the pid's chunk is full, and a second chunk is never granted
    #[error("process exhausted its chunk quota")]
    QuotaExceeded,
}

/// Backing-file failure. Fatal to the process.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing to the backing file failed
    #[error("backing file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Page content does not fit in one slot
    #[error("page content of {len} bytes exceeds the {page_size}-byte slot")]
    PageTooLarge { len: usize, page_size: usize },

    /// Slot index past the end of the file's slot table
    #[error("slot {slot} out of range, file holds {max_pages} slots")]
    SlotOutOfRange { slot: usize, max_pages: usize },
}

/// Outcome of one assignment: either a placement, a deniable allocation
/// failure, or a fatal storage fault.
#[derive(Debug, Error)]
pub enum AssignError {
    /// Deniable: answer the peer and keep going
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// Fatal: the backing file could not be written
    #[error(transparent)]
    Store(#[from] StoreError),
}
