//! Residency state machine for dual-residency buffers.
//!
//! Every buffer is in exactly one of three states describing which side holds
//! valid data. The four coherence operations are the only transitions:
//!
//! ```text
//!                 prepare_for_gpu_access
//!   HostValid ───────────────────────────► BothValid
//!       ▲          (host -> device copy)       │
//!       │                                      │
//!       │ mark_modified_from_cpu               │ mark_modified_from_gpu
//!       │                                      ▼
//!   BothValid ◄─────────────────────────── DeviceValid
//!                 prepare_for_cpu_access
//!                  (device -> host copy)
//! ```
//!
//! `mark_modified_from_*` is valid from any state. `prepare_for_*` is a no-op
//! when the requested side is already valid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a dual-residency buffer currently holds valid data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Residency {
    /// Only the host copy is authoritative.
    HostValid,
    /// Only the device copy is authoritative.
    DeviceValid,
    /// Host and device copies are identical.
    BothValid,
}

/// Direction of a copy required by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    /// Host memory to device memory.
    HostToDevice,
    /// Device memory to host memory.
    DeviceToHost,
}

impl Residency {
    /// True if host-side reads observe current data.
    #[must_use]
    pub fn host_valid(self) -> bool {
        matches!(self, Residency::HostValid | Residency::BothValid)
    }

    /// True if device-side reads observe current data.
    #[must_use]
    pub fn device_valid(self) -> bool {
        matches!(self, Residency::DeviceValid | Residency::BothValid)
    }

    /// Transition for `prepare_for_cpu_access`.
    ///
    /// Returns the next state and the copy needed to reach it, if any.
    #[must_use]
    pub fn prepare_cpu(self) -> (Residency, Option<TransferDirection>) {
        match self {
            Residency::DeviceValid => (Residency::BothValid, Some(TransferDirection::DeviceToHost)),
            other => (other, None),
        }
    }

    /// Transition for `prepare_for_gpu_access`.
    #[must_use]
    pub fn prepare_gpu(self) -> (Residency, Option<TransferDirection>) {
        match self {
            Residency::HostValid => (Residency::BothValid, Some(TransferDirection::HostToDevice)),
            other => (other, None),
        }
    }

    /// Transition for `mark_modified_from_cpu`.
    #[must_use]
    pub fn modified_cpu(self) -> Residency {
        Residency::HostValid
    }

    /// Transition for `mark_modified_from_gpu`.
    #[must_use]
    pub fn modified_gpu(self) -> Residency {
        Residency::DeviceValid
    }
}

impl fmt::Display for Residency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Residency::HostValid => "host_valid",
            Residency::DeviceValid => "device_valid",
            Residency::BothValid => "both_valid",
        };
        write!(f, "{}", label)
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDirection::HostToDevice => write!(f, "host_to_device"),
            TransferDirection::DeviceToHost => write!(f, "device_to_host"),
        }
    }
}
