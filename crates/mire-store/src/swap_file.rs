//! One backing file viewed as a fixed-length array of page slots
//!
//! The slot table is the authoritative occupancy map; the backing file holds
//! only page bytes, laid out as `slot * page_size`. Files are created and
//! sized once at startup and live for the process lifetime. Nothing in this
//! flow ever frees a slot.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Occupancy record for one page-sized slot.
///
/// `pid`/`page` are meaningless while `occupied` is false. Among occupied
/// slots of one file, the `(pid, page)` pair is unique; [`SwapFile::register`]
/// is only ever called for a pair that [`SwapFile::slot_for`] just failed to
/// find, and the two are never interleaved across requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot {
    /// Whether the slot currently holds a page
    pub occupied: bool,
    /// Owning process
    pub pid: u32,
    /// Logical page number within the owner's address space
    pub page: u32,
}

/// A fixed-capacity swap file: identity, slot table, open backing handle.
#[derive(Debug)]
pub struct SwapFile {
    path: PathBuf,
    file: File,
    page_size: usize,
    slots: Vec<Slot>,
}

impl SwapFile {
    /// Create (or truncate) the backing file and size it to hold `max_pages`
    /// slots of `page_size` bytes each.
    pub fn create(path: impl Into<PathBuf>, max_pages: usize, page_size: usize) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.set_len((max_pages * page_size) as u64)?;

        tracing::info!(path = %path.display(), max_pages, page_size, "swap file ready");
        Ok(Self {
            path,
            file,
            page_size,
            slots: vec![Slot::default(); max_pages],
        })
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total slot count
    pub fn max_pages(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.occupied).count()
    }

    /// Whether this file holds at least one page owned by `pid`
    pub fn owns_pid(&self, pid: u32) -> bool {
        self.slots.iter().any(|s| s.occupied && s.pid == pid)
    }

    /// Whether any slot at all is free
    pub fn has_room(&self) -> bool {
        !self.is_full()
    }

    /// Whether every slot is occupied
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.occupied)
    }

    /// Whether some chunk is available for a new process.
    ///
    /// Only each chunk's first slot is inspected; a chunk whose first slot
    /// is free counts as free regardless of the rest of it. Nothing in this
    /// flow ever frees a slot, so the two never disagree in practice.
    pub fn has_free_chunk(&self, max_frames: usize) -> bool {
        self.first_free_chunk(max_frames).is_some()
    }

    /// Base index of the first chunk whose first slot is unoccupied
    pub fn first_free_chunk(&self, max_frames: usize) -> Option<usize> {
        (0..self.slots.len())
            .step_by(max_frames)
            .find(|&base| !self.slots[base].occupied)
    }

    /// Base index of the chunk already held by `pid`, identified by its
    /// first slot
    pub fn chunk_of(&self, pid: u32, max_frames: usize) -> Option<usize> {
        (0..self.slots.len())
            .step_by(max_frames)
            .find(|&base| self.slots[base].occupied && self.slots[base].pid == pid)
    }

    /// Slot already registered for `(pid, page)`, if any
    pub fn slot_for(&self, pid: u32, page: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.occupied && s.pid == pid && s.page == page)
    }

    /// How many slots `pid` occupies in this file
    pub fn count_occupied_for(&self, pid: u32) -> usize {
        self.slots
            .iter()
            .filter(|s| s.occupied && s.pid == pid)
            .count()
    }

    /// Lowest-index free slot, if any
    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| !s.occupied)
    }

    /// Persist page content into `slot`'s byte range.
    pub fn write_at(&self, slot: usize, content: &[u8]) -> Result<(), StoreError> {
        if slot >= self.slots.len() {
            return Err(StoreError::SlotOutOfRange {
                slot,
                max_pages: self.slots.len(),
            });
        }
        if content.len() > self.page_size {
            return Err(StoreError::PageTooLarge {
                len: content.len(),
                page_size: self.page_size,
            });
        }
        self.file
            .write_all_at(content, (slot * self.page_size) as u64)?;
        Ok(())
    }

    /// Record `(pid, page)` as the occupant of `slot`
    pub fn register(&mut self, pid: u32, page: u32, slot: usize) {
        self.slots[slot] = Slot {
            occupied: true,
            pid,
            page,
        };
    }
}
