//! Access hints and the memory placement they select.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How likely one side (host or device) is to touch a buffer.
///
/// Hints steer allocation only; they never change what a reader observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessHint {
    /// The side will access the buffer; favour memory it can address directly.
    Likely,
    /// The side will rarely or never access the buffer; favour memory local to the other side.
    Unlikely,
}

/// Physical placement chosen from a (cpu, gpu) hint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPlacement {
    /// One host-pinned allocation the device reads in place. Prepare calls never copy.
    Pinned,
    /// Pageable host memory with a device image created on demand.
    HostLocal,
    /// Device memory with a host staging image created on demand.
    DeviceLocal,
    /// Separate host and device images, copied on demand.
    Mirrored,
}

impl MemoryPlacement {
    /// Select a placement from the CPU and GPU access hints.
    #[must_use]
    pub fn from_hints(cpu: AccessHint, gpu: AccessHint) -> Self {
        match (cpu, gpu) {
            (AccessHint::Likely, AccessHint::Likely) => MemoryPlacement::Pinned,
            (AccessHint::Likely, AccessHint::Unlikely) => MemoryPlacement::HostLocal,
            (AccessHint::Unlikely, AccessHint::Likely) => MemoryPlacement::DeviceLocal,
            (AccessHint::Unlikely, AccessHint::Unlikely) => MemoryPlacement::Mirrored,
        }
    }

    /// True if host and device share a single allocation.
    #[must_use]
    pub fn is_shared(self) -> bool {
        self == MemoryPlacement::Pinned
    }
}

impl fmt::Display for MemoryPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemoryPlacement::Pinned => "pinned",
            MemoryPlacement::HostLocal => "host_local",
            MemoryPlacement::DeviceLocal => "device_local",
            MemoryPlacement::Mirrored => "mirrored",
        };
        write!(f, "{}", label)
    }
}
