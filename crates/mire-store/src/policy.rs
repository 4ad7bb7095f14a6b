//! The two slot allocation policies
//!
//! Both share the same binding rule: the first file that already owns a slot
//! for the pid is that pid's file forever. A request that cannot be satisfied
//! there fails outright, even if another configured file has room. That is a
//! deliberate invariant of the design, not an omission.

use crate::error::{AllocError, AssignError};
use crate::swap_file::SwapFile;

/// Where an accepted page ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the swap file within the configured set
    pub file_index: usize,
    /// Slot index within that file
    pub slot: usize,
}

/// Allocation strategy, bound once per connection by the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Each process gets one chunk of `max_frames` contiguous slots and
    /// never more
    Fixed,
    /// Processes share the whole file; lowest free slot wins
    Global,
}

impl Policy {
    /// Place `content` for `(pid, page)` in some slot of some file.
    ///
    /// Re-submitting a `(pid, page)` the set already holds overwrites the
    /// original slot in place under either policy; the same logical page
    /// never allocates twice.
    pub fn assign(
        self,
        files: &mut [SwapFile],
        pid: u32,
        page: u32,
        content: &[u8],
        max_frames: usize,
    ) -> Result<Placement, AssignError> {
        match self {
            Policy::Fixed => assign_fixed(files, pid, page, content, max_frames),
            Policy::Global => assign_global(files, pid, page, content),
        }
    }
}

/// File already bound to `pid`, if any. Binding is permanent.
fn bound_file(files: &[SwapFile], pid: u32) -> Option<usize> {
    files.iter().position(|f| f.owns_pid(pid))
}

fn assign_fixed(
    files: &mut [SwapFile],
    pid: u32,
    page: u32,
    content: &[u8],
    max_frames: usize,
) -> Result<Placement, AssignError> {
    let file_index = bound_file(files, pid)
        .or_else(|| files.iter().position(|f| f.has_free_chunk(max_frames)))
        .ok_or(AllocError::NoSpace)?;
    let file = &mut files[file_index];

    let slot = match file.slot_for(pid, page) {
        Some(slot) => slot,
        None => {
            let base = file
                .chunk_of(pid, max_frames)
                .or_else(|| file.first_free_chunk(max_frames))
                .ok_or(AllocError::NoSpace)?;
            let offset = file.count_occupied_for(pid);
            if offset == max_frames {
                return Err(AllocError::QuotaExceeded.into());
            }
            base + offset
        }
    };

    file.write_at(slot, content)?;
    file.register(pid, page, slot);
    Ok(Placement { file_index, slot })
}

fn assign_global(
    files: &mut [SwapFile],
    pid: u32,
    page: u32,
    content: &[u8],
) -> Result<Placement, AssignError> {
    let file_index = bound_file(files, pid)
        .or_else(|| files.iter().position(|f| f.has_room()))
        .ok_or(AllocError::NoSpace)?;
    let file = &mut files[file_index];

    let slot = match file.slot_for(pid, page) {
        Some(slot) => slot,
        None => {
            if file.is_full() {
                return Err(AllocError::NoSpace.into());
            }
            // is_full() was false, so a free slot exists
            file.first_free_slot().ok_or(AllocError::NoSpace)?
        }
    };

    file.write_at(slot, content)?;
    file.register(pid, page, slot);
    Ok(Placement { file_index, slot })
}
