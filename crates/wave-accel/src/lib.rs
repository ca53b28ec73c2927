//! Host/device dual-residency buffers and recycling pools.
//!
//! Waveform data is produced on the host (instrument drivers) and frequently
//! consumed on an accelerator (filter kernels). This crate provides the
//! storage layer that lets both sides share data without gratuitous copies:
//!
//! - [`DualResidencyBuffer`]: the coherence contract (prepare / mark-modified
//!   bracketing, access hints, length management)
//! - [`AcceleratorBuffer`]: reference implementation with an explicit
//!   [`Residency`] state machine and [`TransferStats`]
//! - [`Pool`]: recycling pool for acquisition slots, handing out [`Loaned`]
//!   guards that return their item on drop
//!
//! # Coherence rule
//!
//! Between `prepare_for_X_access()` and the matching `mark_modified_from_X()`
//! only side X may be assumed coherent. Readers on the other side call their
//! own `prepare_for_*` first. Accessing a stale side panics.

pub mod buffer;
pub mod hint;
pub mod pool;
pub mod residency;

pub use buffer::{AcceleratorBuffer, DualResidencyBuffer, TransferStats};
pub use hint::{AccessHint, MemoryPlacement};
pub use pool::{Loaned, Pool};
pub use residency::{Residency, TransferDirection};
