//! Recycling pool for acquisition slots.
//!
//! Acquisition stages fill the same kind of object over and over. Allocating
//! a fresh waveform (and, with pinned hints, fresh pinned memory) per trigger
//! is expensive, so items are pre-built and handed out as [`Loaned`] guards
//! that return to the pool on drop.
//!
//! # Design
//!
//! The pool uses a semaphore + lock-free queue pattern:
//! 1. Semaphore tracks available items (permits = items in the queue)
//! 2. `SegQueue` holds the items themselves; acquiring moves one out
//! 3. A loan owns its item outright, so access never takes a lock
//! 4. Dropping a loan resets the item and pushes it back
//!
//! A loan can also [`detach`](Loaned::detach) its item, transferring ownership
//! out of the pool (for example into a filter's output cache). The pool shrinks
//! by one slot until the item is handed back with [`Pool::give_back`].
//!
//! # Example
//!
//! ```
//! use wave_accel::Pool;
//!
//! # tokio_test::block_on(async {
//! let pool = Pool::new_with_reset(4, || Vec::<f32>::with_capacity(1024), |v| v.clear());
//!
//! let mut slot = pool.acquire().await;
//! slot.push(1.5);
//! assert_eq!(pool.available(), 3);
//!
//! drop(slot);
//! assert_eq!(pool.available(), 4);
//! # });
//! ```

use crossbeam_queue::SegQueue;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, warn};

/// Reset function applied when an item returns to the pool.
type ResetFn<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// Factory used to build items at creation and on growth.
type FactoryFn<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Pool of pre-built items handed out as RAII loans.
pub struct Pool<T> {
    /// Items not currently on loan
    free: SegQueue<T>,
    /// One permit per item in `free`
    semaphore: Semaphore,
    reset_fn: Option<ResetFn<T>>,
    factory: FactoryFn<T>,
    initial_size: usize,
    /// Items owned by the pool, on loan or not
    current_size: AtomicUsize,
    total_acquires: AtomicU64,
    total_returns: AtomicU64,
}

impl<T: Send + 'static> Pool<T> {
    /// Create a pool of `size` items built by `factory`.
    ///
    /// `reset` runs on every item returned to the pool.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    pub fn new<F, R>(size: usize, factory: F, reset: Option<R>) -> Arc<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) + Send + Sync + 'static,
    {
        assert!(size > 0, "pool size must be greater than 0");

        let free = SegQueue::new();
        for _ in 0..size {
            free.push(factory());
        }

        Arc::new(Self {
            free,
            semaphore: Semaphore::new(size),
            reset_fn: reset.map(|f| Box::new(f) as ResetFn<T>),
            factory: Box::new(factory),
            initial_size: size,
            current_size: AtomicUsize::new(size),
            total_acquires: AtomicU64::new(0),
            total_returns: AtomicU64::new(0),
        })
    }

    /// Create a pool without a reset function.
    pub fn new_simple<F>(size: usize, factory: F) -> Arc<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(size, factory, None::<fn(&mut T)>)
    }

    /// Create a pool with a reset function.
    pub fn new_with_reset<F, R>(size: usize, factory: F, reset: R) -> Arc<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) + Send + Sync + 'static,
    {
        Self::new(size, factory, Some(reset))
    }

    /// Acquire an item, waiting until one is available.
    pub async fn acquire(self: &Arc<Self>) -> Loaned<T> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .expect("pool semaphore is never closed");
        permit.forget();
        self.take_free()
    }

    /// Acquire an item without waiting.
    ///
    /// Returns `None` when every item is on loan.
    #[must_use]
    pub fn try_acquire(self: &Arc<Self>) -> Option<Loaned<T>> {
        let permit = self.semaphore.try_acquire().ok()?;
        permit.forget();
        Some(self.take_free())
    }

    /// Acquire an item, waiting at most `timeout`.
    ///
    /// Returns `None` if the timeout expires first. A timeout means the
    /// consumer is not returning slots as fast as the producer fills them.
    pub async fn try_acquire_timeout(self: &Arc<Self>, timeout: Duration) -> Option<Loaned<T>> {
        let permit = match tokio::time::timeout(timeout, self.semaphore.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return None,
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis(),
                    available = self.available(),
                    size = self.size(),
                    "Pool acquire timeout - backpressure detected"
                );
                return None;
            }
        };
        permit.forget();
        Some(self.take_free())
    }

    /// Acquire an item, growing the pool if it is exhausted.
    ///
    /// Growth is logged as an error: it means slots are not coming back.
    pub fn acquire_or_grow(self: &Arc<Self>) -> Loaned<T> {
        loop {
            if let Some(loaned) = self.try_acquire() {
                return loaned;
            }
            // Other callers may take the new items first; grow again if so.
            self.grow(self.size().max(8));
        }
    }

    /// Return a detached item to the pool.
    ///
    /// The item is reset and the pool grows back by one slot.
    pub fn give_back(&self, mut item: T) {
        if let Some(reset_fn) = &self.reset_fn {
            reset_fn(&mut item);
        }
        self.free.push(item);
        self.current_size.fetch_add(1, Ordering::AcqRel);
        self.semaphore.add_permits(1);
    }

    /// Items owned by the pool, on loan or not.
    #[must_use]
    pub fn size(&self) -> usize {
        self.current_size.load(Ordering::Acquire)
    }

    /// Items ready to be acquired.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Size at construction.
    #[must_use]
    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Acquisitions since construction.
    #[must_use]
    pub fn total_acquires(&self) -> u64 {
        self.total_acquires.load(Ordering::Relaxed)
    }

    /// Loans returned since construction (detached items excluded).
    #[must_use]
    pub fn total_returns(&self) -> u64 {
        self.total_returns.load(Ordering::Relaxed)
    }

    /// Pop a free item. Caller must already hold (and have forgotten) a permit.
    fn take_free(self: &Arc<Self>) -> Loaned<T> {
        let item = self
            .free
            .pop()
            .expect("free queue empty after permit - pool invariant violated");
        self.total_acquires.fetch_add(1, Ordering::Relaxed);

        Loaned {
            pool: Arc::clone(self),
            item: Some(item),
        }
    }

    fn grow(&self, count: usize) {
        for _ in 0..count {
            self.free.push((self.factory)());
        }
        let old_size = self.current_size.fetch_add(count, Ordering::AcqRel);
        let new_size = old_size + count;
        self.semaphore.add_permits(count);

        error!(
            pool_type = std::any::type_name::<T>(),
            old_size,
            new_size,
            initial_size = self.initial_size,
            "Pool exhausted! Growing pool. This indicates backpressure - \
             slots filled faster than consumed."
        );
    }

    fn release(&self, mut item: T) {
        if let Some(reset_fn) = &self.reset_fn {
            reset_fn(&mut item);
        }
        self.free.push(item);
        self.total_returns.fetch_add(1, Ordering::Relaxed);
        self.semaphore.add_permits(1);
    }
}

/// RAII guard for an item on loan from a [`Pool`].
///
/// The guard owns the item, so `Deref`/`DerefMut` never lock. Dropping the
/// guard resets the item and returns it.
pub struct Loaned<T: Send + 'static> {
    pool: Arc<Pool<T>>,
    /// `None` only after `detach` moved the item out.
    item: Option<T>,
}

impl<T: Send + 'static> Loaned<T> {
    /// The pool this item belongs to.
    #[must_use]
    pub fn pool(&self) -> &Arc<Pool<T>> {
        &self.pool
    }

    /// Take ownership of the item, removing it from the pool.
    ///
    /// The pool shrinks by one slot. Use [`Pool::give_back`] to return it.
    #[must_use]
    pub fn detach(mut self) -> T {
        self.pool.current_size.fetch_sub(1, Ordering::AcqRel);
        self.item
            .take()
            .expect("loaned item present until detach or drop")
    }
}

impl<T: Send + 'static> Deref for Loaned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.item
            .as_ref()
            .expect("loaned item present until detach or drop")
    }
}

impl<T: Send + 'static> DerefMut for Loaned<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item
            .as_mut()
            .expect("loaned item present until detach or drop")
    }
}

impl<T: Send + 'static> Drop for Loaned<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
