//! Recycling pool of acquisition waveforms.
//!
//! Drivers acquire a waveform per trigger, fill it and either hand it down
//! the pipeline (`Loaned::detach`) or let the guard drop to recycle it. The
//! reset hook empties buffers and metadata; the revision keeps increasing so
//! a recycled waveform never reproduces an old cache key.

use crate::sample::Sample;
use crate::waveform::{BufferHints, Waveform};
use std::sync::Arc;
use wave_accel::Pool;

/// Pool of waveforms of one kind.
pub type WaveformPool<S> = Pool<Waveform<S>>;

/// Create a pool of `size` empty waveforms with the given buffer hints.
///
/// # Panics
///
/// Panics if `size` is 0.
#[must_use]
pub fn waveform_pool<S: Sample>(size: usize, hints: BufferHints) -> Arc<WaveformPool<S>> {
    Pool::new_with_reset(
        size,
        move || Waveform::with_hints(hints),
        |wfm: &mut Waveform<S>| wfm.reset(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::AnalogWaveform;
    use std::time::Duration;
    use wave_accel::MemoryPlacement;

    #[tokio::test]
    async fn test_recycled_waveform_is_empty_with_new_key() {
        let pool = waveform_pool::<f32>(1, BufferHints::default());

        let (id, key) = {
            let mut wfm = pool.acquire().await;
            wfm.metadata.timescale = 1_000;
            wfm.resize(16);
            wfm.fill_dense_timestamps();
            wfm.bump_revision();
            (wfm.id(), wfm.cache_key())
        };

        let wfm = pool.acquire().await;
        assert_eq!(wfm.id(), id);
        assert!(wfm.is_empty());
        assert_eq!(wfm.metadata.timescale, 0);
        assert!(!wfm.metadata.dense_packed);
        assert!(wfm.metadata.revision > key.revision);
    }

    #[tokio::test]
    async fn test_detached_waveform_leaves_pool() {
        let pool = waveform_pool::<bool>(2, BufferHints::default());

        let mut loaned = pool.acquire().await;
        loaned.push(0, 1, true);
        let wfm = loaned.detach();
        assert_eq!(wfm.len(), 1);
        assert_eq!(pool.size(), 1);

        pool.give_back(wfm);
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_pool_times_out() {
        let pool = waveform_pool::<Vec<bool>>(1, BufferHints::default());
        let _held = pool.acquire().await;
        assert!(pool
            .try_acquire_timeout(Duration::from_millis(10))
            .await
            .is_none());
    }

    #[test]
    fn test_pool_applies_hints() {
        let hints = BufferHints {
            sample_gpu: wave_accel::AccessHint::Unlikely,
            ..BufferHints::default()
        };
        let pool = waveform_pool::<f32>(1, hints);
        let wfm: Option<wave_accel::Loaned<AnalogWaveform>> = pool.try_acquire();
        let placement = wfm.map(|w| w.samples().placement());
        assert_eq!(placement, Some(MemoryPlacement::HostLocal));
    }
}
