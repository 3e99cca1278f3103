// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lock-free pool of reusable staging buffers.
//!
//! Each rewrite call stages one record at a time into a scratch buffer sized
//! to the batch's largest record, so staging memory is bounded by the largest
//! single input rather than the whole batch. Buffers are recycled through a
//! global lock-free pool instead of being reallocated per call.
//!
//! Release is tied to `Drop`: a [`StagingBuffer`] returns itself to the pool
//! on every exit path, including error returns and unwinds, so a failed
//! rewrite cannot leak its staging region.

use crossbeam_queue::ArrayQueue;
use std::sync::OnceLock;

/// Maximum number of buffers kept in the global pool.
const MAX_POOLED_BUFFERS: usize = 8;

/// Global lock-free pool of recycled staging buffers.
static POOL: OnceLock<ArrayQueue<Vec<u8>>> = OnceLock::new();

fn pool() -> &'static ArrayQueue<Vec<u8>> {
    POOL.get_or_init(|| ArrayQueue::new(MAX_POOLED_BUFFERS))
}

/// A staging buffer exclusively owned by one rewrite invocation.
///
/// The buffer must not be referenced after the invocation returns; the type
/// system enforces this because staged bytes borrow from the buffer.
pub struct StagingBuffer {
    data: Vec<u8>,
}

impl StagingBuffer {
    /// Acquire a buffer with at least `capacity` bytes, reusing a pooled
    /// buffer when one is available.
    pub fn acquire(capacity: usize) -> Self {
        let mut data = pool().pop().unwrap_or_default();
        data.clear();
        if data.capacity() < capacity {
            data.reserve(capacity);
        }
        Self { data }
    }

    /// Copy one record's raw bytes into the staging region and return the
    /// staged slice.
    pub fn stage<'a>(&'a mut self, raw: &[u8]) -> &'a [u8] {
        self.data.clear();
        self.data.extend_from_slice(raw);
        &self.data
    }

    /// Capacity of the underlying region.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
}

impl Drop for StagingBuffer {
    fn drop(&mut self) {
        // Pool full means the buffer is simply deallocated.
        let data = std::mem::take(&mut self.data);
        let _ = pool().push(data);
    }
}
