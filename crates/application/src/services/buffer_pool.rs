use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Reusable response buffers, all `buffer_size` bytes long.
///
/// Buffers are not cleared between uses: a borrower must only look at the
/// bytes it wrote itself.
pub struct BufferPool {
    idle: Mutex<Vec<Box<[u8]>>>,

    buffer_size: usize,

    /// Idle buffers kept for reuse; extra returns are dropped
    max_idle: usize,

    in_use: AtomicUsize,

    total_created: AtomicU64,

    total_reused: AtomicU64,
}

impl BufferPool {
    pub fn new(buffer_size: usize, max_idle: usize) -> Self {
        debug!(buffer_size, max_idle, "Initializing response buffer pool");

        Self {
            idle: Mutex::new(Vec::new()),
            buffer_size,
            max_idle,
            in_use: AtomicUsize::new(0),
            total_created: AtomicU64::new(0),
            total_reused: AtomicU64::new(0),
        }
    }

    /// Borrows a buffer; it goes back to the pool when the guard is dropped.
    pub fn get(self: &Arc<Self>) -> PooledBuffer {
        let reused = self.lock_idle().pop();

        let buf = match reused {
            Some(buf) => {
                self.total_reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.total_created.fetch_add(1, Ordering::Relaxed);
                vec![0u8; self.buffer_size].into_boxed_slice()
            }
        };
        self.in_use.fetch_add(1, Ordering::AcqRel);

        PooledBuffer {
            buf: Some(buf),
            pool: Arc::clone(self),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_reused: self.total_reused.load(Ordering::Relaxed),
            idle: self.lock_idle().len(),
            in_use: self.in_use.load(Ordering::Acquire),
        }
    }

    fn release(&self, buf: Box<[u8]>) {
        self.in_use.fetch_sub(1, Ordering::AcqRel);

        let mut idle = self.lock_idle();
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<Box<[u8]>>> {
        // A panic while holding the lock cannot leave the Vec inconsistent.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Buffer borrowed from a [`BufferPool`], returned exactly once on drop.
pub struct PooledBuffer {
    buf: Option<Box<[u8]>>,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buf.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total_created: u64,
    pub total_reused: u64,
    pub idle: usize,
    pub in_use: usize,
}
