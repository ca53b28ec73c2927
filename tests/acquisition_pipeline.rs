//! End-to-end acquisition flow through the facade: configuration, pooled
//! acquisition, hand-off, cached analysis and device processing.

use std::sync::Arc;
use std::time::Duration;
use wavekit::config::WaveConfig;
use wavekit::{
    waveform_pool, AccessHint, AnalogWaveform, AnyWaveform, DigitalWaveform, DualResidencyBuffer,
    MemoryPlacement, Residency, RevisionCache, WaveformKind,
};

/// Driver side: fill a pooled slot with a ramp.
fn capture(wfm: &mut AnalogWaveform, len: usize, timescale: i64) {
    wfm.metadata.timescale = timescale;
    wfm.resize(len);
    for (i, v) in wfm.samples_mut().iter_mut().enumerate() {
        *v = i as f32;
    }
    wfm.mark_samples_modified_from_cpu();
    wfm.fill_dense_timestamps();
    wfm.bump_revision();
}

fn mean(wfm: &AnalogWaveform) -> f32 {
    let samples = wfm.samples().host_slice();
    samples.iter().sum::<f32>() / samples.len() as f32
}

#[tokio::test]
async fn test_pooled_capture_handoff_and_recycle() {
    let config = WaveConfig::default();
    let pool = waveform_pool::<f32>(2, config.buffer_hints());

    let mut slot = pool.acquire().await;
    capture(&mut slot, 8, 1_000);
    let wfm = slot.detach();
    assert_eq!(pool.size(), 1);

    assert!(wfm.validate().is_ok());
    assert_eq!(wfm.offset_scaled(7), 7_000);
    assert_eq!(wfm.samples().placement(), MemoryPlacement::Pinned);

    let key = wfm.cache_key();
    pool.give_back(wfm);
    assert_eq!(pool.size(), 2);

    // Drain the pool; the recycled waveform comes back empty with a new key.
    let a = pool.acquire().await;
    let b = pool.acquire().await;
    let recycled = if a.id() == key.id { &a } else { &b };
    assert_eq!(recycled.id(), key.id);
    assert!(recycled.is_empty());
    assert_ne!(recycled.cache_key(), key);
}

#[tokio::test]
async fn test_backpressure_timeout_then_grow() {
    let pool = waveform_pool::<bool>(1, WaveConfig::default().buffer_hints());
    let _held = pool.acquire().await;

    let timeout = WaveConfig::default().pool.acquire_timeout();
    assert!(pool.try_acquire_timeout(timeout).await.is_none());

    let grown = pool.acquire_or_grow();
    assert!(grown.is_empty());
    assert!(pool.size() > 1);
}

#[test]
fn test_cache_follows_revisions_across_stages() {
    let cache: Arc<RevisionCache<f32>> = Arc::new(RevisionCache::new());
    let mut wfm = AnalogWaveform::new();
    capture(&mut wfm, 5, 1);

    // Two consumers ask for the same derived value; only one computes.
    assert_eq!(cache.get_or_compute(wfm.cache_key(), || mean(&wfm)), 2.0);
    assert_eq!(cache.get_or_compute(wfm.cache_key(), || mean(&wfm)), 2.0);
    assert_eq!(cache.misses(), 1);

    // A GPU stage rewrites samples and bumps the revision.
    wfm.set_sample_hints(AccessHint::Likely, AccessHint::Unlikely);
    wfm.prepare_for_gpu_access();
    for v in wfm.device_samples_mut() {
        *v += 10.0;
    }
    wfm.mark_samples_modified_from_gpu();
    wfm.bump_revision();
    assert_eq!(wfm.samples().residency(), Residency::DeviceValid);

    wfm.prepare_for_cpu_access();
    assert_eq!(cache.get_or_compute(wfm.cache_key(), || mean(&wfm)), 12.0);
    assert_eq!(cache.misses(), 2);
}

#[test]
fn test_mixed_channel_list() {
    let mut clock = DigitalWaveform::new();
    for i in 0..4 {
        clock.push(i * 10, 10, i % 2 == 0);
    }

    let mut analog = AnalogWaveform::new();
    capture(&mut analog, 4, 1);

    let mut channels: Vec<AnyWaveform> = vec![clock.into(), analog.into()];
    channels.push(AnyWaveform::new(WaveformKind::DigitalBus));

    let kinds: Vec<_> = channels.iter().map(AnyWaveform::kind).collect();
    assert_eq!(
        kinds,
        vec![
            WaveformKind::Digital,
            WaveformKind::Analog,
            WaveformKind::DigitalBus
        ]
    );
    assert!(channels.iter().all(|c| c.validate().is_ok()));

    // Retime the bus channel onto the clock's timebase.
    let (clock, rest) = channels.split_at_mut(1);
    rest[1].resize(clock[0].len());
    rest[1].copy_timestamps(&clock[0]);
    assert_eq!(rest[1].timestamps().offsets().host_slice(), &[0, 10, 20, 30]);
    assert!(rest[1].validate().is_ok());
}

#[test]
fn test_pool_acquire_blocks_until_returned() {
    let pool = waveform_pool::<f32>(1, WaveConfig::default().buffer_hints());
    let held = pool.try_acquire();
    assert!(held.is_some());
    assert!(pool.try_acquire().is_none());

    let waiter = {
        let pool = Arc::clone(&pool);
        std::thread::spawn(move || {
            tokio_test::block_on(async move {
                pool.try_acquire_timeout(Duration::from_secs(5))
                    .await
                    .map(|w| w.is_empty())
            })
        })
    };

    drop(held);
    assert_eq!(waiter.join().unwrap(), Some(true));
}
