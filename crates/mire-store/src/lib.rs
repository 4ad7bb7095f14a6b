//! Slot storage and allocation policies for the mire swap backend
//!
//! A [`SwapFile`] is a fixed-length array of page-sized slots over one
//! backing file. The two [`Policy`] variants decide which slot a parked page
//! lands in; they are the only writers, and the dispatch loop holds the file
//! set mutably, so no locking is needed in this flow.

pub mod error;
pub mod policy;
pub mod swap_file;

pub use error::{AllocError, AssignError, StoreError};
pub use policy::{Placement, Policy};
pub use swap_file::{Slot, SwapFile};
