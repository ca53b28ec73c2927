//! Dual-residency buffers.
//!
//! [`DualResidencyBuffer`] is the contract waveform containers are written
//! against. [`AcceleratorBuffer`] is the reference implementation: it keeps a
//! host image and a device image and moves data between them only when a
//! `prepare_for_*` call finds the requested side stale.
//!
//! The device image is host-resident ("loopback device"). Backends that own
//! real device memory implement the same state machine; only the copy in
//! `transfer()` changes.
//!
//! # Bracketing
//!
//! ```
//! use wave_accel::{AcceleratorBuffer, DualResidencyBuffer, Residency};
//!
//! let mut buf = AcceleratorBuffer::<f32>::new();
//! buf.resize(3);
//! buf.host_slice_mut().copy_from_slice(&[1.0, 2.0, 3.0]);
//! buf.mark_modified_from_cpu();
//!
//! buf.prepare_for_gpu_access();
//! assert_eq!(buf.residency(), Residency::BothValid);
//! assert_eq!(buf.device_slice(), &[1.0, 2.0, 3.0]);
//! ```

use crate::hint::{AccessHint, MemoryPlacement};
use crate::residency::{Residency, TransferDirection};
use tracing::{debug, trace};

/// Buffer whose contents may live on the host, the device, or both.
///
/// Implementations track which side is authoritative and move data only in
/// `prepare_for_*`. Writers must call the matching `mark_modified_from_*`
/// after writing so the other side is known to be stale.
pub trait DualResidencyBuffer<T> {
    /// Number of elements.
    fn len(&self) -> usize;

    /// True if the buffer holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow or shrink to `len` elements. New elements take `T::default()`.
    fn resize(&mut self, len: usize);

    /// Drop all elements, keeping the allocation.
    fn clear(&mut self);

    /// Make the host copy valid, copying from the device if it is stale.
    fn prepare_for_cpu_access(&mut self);

    /// Make the device copy valid, copying from the host if it is stale.
    fn prepare_for_gpu_access(&mut self);

    /// Declare the host copy authoritative after a host-side write.
    fn mark_modified_from_cpu(&mut self);

    /// Declare the device copy authoritative after a device-side write.
    fn mark_modified_from_gpu(&mut self);

    /// Element-wise copy from a buffer of the same length.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    fn copy_from(&mut self, other: &Self)
    where
        Self: Sized;

    /// Set how likely the host is to access this buffer.
    fn set_cpu_access_hint(&mut self, hint: AccessHint);

    /// Set how likely the device is to access this buffer.
    fn set_gpu_access_hint(&mut self, hint: AccessHint);

    /// Current residency state.
    fn residency(&self) -> Residency;
}

/// Counters for data moved between host and device images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Number of host-to-device copies.
    pub host_to_device: u64,
    /// Number of device-to-host copies.
    pub device_to_host: u64,
    /// Total elements copied in either direction.
    pub elements_moved: u64,
}

impl TransferStats {
    /// Total number of copies in either direction.
    #[must_use]
    pub fn transfers(&self) -> u64 {
        self.host_to_device + self.device_to_host
    }

    fn record(&mut self, direction: TransferDirection, elements: usize) {
        match direction {
            TransferDirection::HostToDevice => self.host_to_device += 1,
            TransferDirection::DeviceToHost => self.device_to_host += 1,
        }
        self.elements_moved += elements as u64;
    }
}

/// Reference [`DualResidencyBuffer`] with a host image and a device image.
///
/// With [`MemoryPlacement::Pinned`] both sides address the host image and no
/// copies ever happen. Every other placement keeps a separate device image of
/// the same length.
#[derive(Debug)]
pub struct AcceleratorBuffer<T> {
    host: Vec<T>,
    /// Unused (and kept empty) while the placement is shared.
    device: Vec<T>,
    residency: Residency,
    cpu_hint: AccessHint,
    gpu_hint: AccessHint,
    stats: TransferStats,
}

impl<T: Clone + Default> AcceleratorBuffer<T> {
    /// Create an empty buffer prepared for CPU access.
    ///
    /// Hints default to CPU likely, GPU unlikely.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hints(AccessHint::Likely, AccessHint::Unlikely)
    }

    /// Create an empty buffer with explicit access hints.
    #[must_use]
    pub fn with_hints(cpu: AccessHint, gpu: AccessHint) -> Self {
        Self {
            host: Vec::new(),
            device: Vec::new(),
            residency: Residency::HostValid,
            cpu_hint: cpu,
            gpu_hint: gpu,
            stats: TransferStats::default(),
        }
    }

    /// Wrap host data. The host copy is authoritative.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        let mut buf = Self::new();
        buf.device = vec![T::default(); data.len()];
        buf.host = data;
        buf
    }

    /// Current placement, derived from the access hints.
    #[must_use]
    pub fn placement(&self) -> MemoryPlacement {
        MemoryPlacement::from_hints(self.cpu_hint, self.gpu_hint)
    }

    /// CPU access hint.
    #[must_use]
    pub fn cpu_access_hint(&self) -> AccessHint {
        self.cpu_hint
    }

    /// GPU access hint.
    #[must_use]
    pub fn gpu_access_hint(&self) -> AccessHint {
        self.gpu_hint
    }

    /// Copies performed since construction.
    #[must_use]
    pub fn transfer_stats(&self) -> TransferStats {
        self.stats
    }

    /// Host view of the data.
    ///
    /// # Panics
    ///
    /// Panics if the host copy is stale (call `prepare_for_cpu_access` first).
    #[must_use]
    pub fn host_slice(&self) -> &[T] {
        self.assert_host_valid();
        &self.host
    }

    /// Mutable host view. Call `mark_modified_from_cpu` after writing.
    ///
    /// # Panics
    ///
    /// Panics if the host copy is stale.
    pub fn host_slice_mut(&mut self) -> &mut [T] {
        self.assert_host_valid();
        &mut self.host
    }

    /// Device view of the data.
    ///
    /// # Panics
    ///
    /// Panics if the device copy is stale (call `prepare_for_gpu_access` first).
    #[must_use]
    pub fn device_slice(&self) -> &[T] {
        self.assert_device_valid();
        if self.is_shared() {
            &self.host
        } else {
            &self.device
        }
    }

    /// Mutable device view. Call `mark_modified_from_gpu` after writing.
    ///
    /// # Panics
    ///
    /// Panics if the device copy is stale.
    pub fn device_slice_mut(&mut self) -> &mut [T] {
        self.assert_device_valid();
        if self.is_shared() {
            &mut self.host
        } else {
            &mut self.device
        }
    }

    /// Append one element on the host side.
    ///
    /// # Panics
    ///
    /// Panics if the host copy is stale.
    pub fn push(&mut self, value: T) {
        self.assert_host_valid();
        self.host.push(value);
        if !self.is_shared() {
            self.device.push(T::default());
        }
    }

    fn is_shared(&self) -> bool {
        self.placement().is_shared()
    }

    fn assert_host_valid(&self) {
        assert!(
            self.residency.host_valid(),
            "host access while buffer is {}: call prepare_for_cpu_access first",
            self.residency
        );
    }

    fn assert_device_valid(&self) {
        assert!(
            self.residency.device_valid(),
            "device access while buffer is {}: call prepare_for_gpu_access first",
            self.residency
        );
    }

    fn transfer(&mut self, direction: TransferDirection) {
        if self.is_shared() {
            // Same allocation on both sides.
            return;
        }
        match direction {
            TransferDirection::HostToDevice => self.device.clone_from(&self.host),
            TransferDirection::DeviceToHost => self.host.clone_from(&self.device),
        }
        self.stats.record(direction, self.host.len());
        trace!(
            %direction,
            elements = self.host.len(),
            placement = %self.placement(),
            "buffer transfer"
        );
    }

    fn set_hints(&mut self, cpu: AccessHint, gpu: AccessHint) {
        let old = self.placement();
        self.cpu_hint = cpu;
        self.gpu_hint = gpu;
        let new = self.placement();
        if old == new {
            return;
        }

        match (old.is_shared(), new.is_shared()) {
            (true, false) => {
                // Splitting the shared allocation: both images start identical.
                self.device = self.host.clone();
            }
            (false, true) => {
                if self.residency == Residency::DeviceValid {
                    self.host = std::mem::take(&mut self.device);
                } else {
                    self.device = Vec::new();
                }
            }
            _ => {}
        }
        debug!(
            from = %old,
            to = %new,
            elements = self.host.len(),
            "buffer placement changed"
        );
    }
}

impl<T: Clone + Default> Default for AcceleratorBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default> DualResidencyBuffer<T> for AcceleratorBuffer<T> {
    fn len(&self) -> usize {
        self.host.len()
    }

    fn resize(&mut self, len: usize) {
        self.host.resize(len, T::default());
        if !self.is_shared() {
            self.device.resize(len, T::default());
        }
    }

    fn clear(&mut self) {
        self.host.clear();
        self.device.clear();
    }

    fn prepare_for_cpu_access(&mut self) {
        let (next, copy) = self.residency.prepare_cpu();
        if let Some(direction) = copy {
            self.transfer(direction);
        }
        self.residency = next;
    }

    fn prepare_for_gpu_access(&mut self) {
        let (next, copy) = self.residency.prepare_gpu();
        if let Some(direction) = copy {
            self.transfer(direction);
        }
        self.residency = next;
    }

    fn mark_modified_from_cpu(&mut self) {
        self.residency = self.residency.modified_cpu();
    }

    fn mark_modified_from_gpu(&mut self) {
        self.residency = self.residency.modified_gpu();
    }

    fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            self.len(),
            other.len(),
            "copy_from requires equal lengths (destination {}, source {})",
            self.len(),
            other.len()
        );

        let source = other.residency;
        if source.host_valid() {
            self.host.clone_from_slice(&other.host);
        }
        if source.device_valid() {
            let device = if other.is_shared() {
                &other.host
            } else {
                &other.device
            };
            if !self.is_shared() {
                self.device.clone_from_slice(device);
            } else if !source.host_valid() {
                self.host.clone_from_slice(device);
            }
        }
        self.residency = source;
    }

    fn set_cpu_access_hint(&mut self, hint: AccessHint) {
        self.set_hints(hint, self.gpu_hint);
    }

    fn set_gpu_access_hint(&mut self, hint: AccessHint) {
        self.set_hints(self.cpu_hint, hint);
    }

    fn residency(&self) -> Residency {
        self.residency
    }
}
