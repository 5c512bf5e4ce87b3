//! Pipes: ring buffers of fixed-size byte messages (component 4.6).
//!
//! Operations mirror [`crate::queue::Queue`] but copy `message_size` bytes
//! per entry instead of moving a single pointer-sized word; head and tail
//! are byte offsets that step by `message_size`.

use abi::{Error, KernResult};

pub struct Pipe {
    storage: &'static mut [u8],
    message_size: usize,
    head: usize,
    tail: usize,
    count: usize,
    blocked_count: usize,
}

impl Pipe {
    pub fn new(storage: &'static mut [u8], message_size: usize) -> Self {
        kinvariant!(message_size > 0);
        kinvariant!(storage.len() % message_size == 0);
        kinvariant!(!storage.is_empty());
        Pipe {
            storage,
            message_size,
            head: 0,
            tail: 0,
            count: 0,
            blocked_count: 0,
        }
    }

    pub fn message_size(&self) -> usize {
        self.message_size
    }

    pub fn capacity(&self) -> usize {
        self.storage.len() / self.message_size
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked_count
    }

    pub fn inc_blocked(&mut self) {
        self.blocked_count += 1;
    }

    pub fn dec_blocked(&mut self) {
        kinvariant!(self.blocked_count > 0);
        self.blocked_count -= 1;
    }

    /// Validates that a caller-supplied message size matches this pipe's
    /// configuration, per component 4.6.
    pub fn check_size(&self, size: usize) -> KernResult<()> {
        if size == self.message_size {
            Ok(())
        } else {
            Err(Error::InvalidSize)
        }
    }

    /// Copies `message` in at the head, wrapping. `false` if full. Panics
    /// (via slice indexing) if `message.len() != self.message_size()`; call
    /// [`Pipe::check_size`] first.
    pub fn try_send(&mut self, message: &[u8]) -> bool {
        if self.is_full() {
            return false;
        }
        let stride = self.message_size;
        self.storage[self.head..self.head + stride].copy_from_slice(message);
        self.head = (self.head + stride) % self.storage.len();
        self.count += 1;
        true
    }

    /// Copies the oldest message into `out`, removing it. `false` if empty.
    pub fn try_receive(&mut self, out: &mut [u8]) -> bool {
        if self.is_empty() {
            return false;
        }
        let stride = self.message_size;
        out.copy_from_slice(&self.storage[self.tail..self.tail + stride]);
        self.tail = (self.tail + stride) % self.storage.len();
        self.count -= 1;
        true
    }

    /// Zeroes head/tail/count, as `pipe_reset` requires. The caller wakes
    /// every blocked waiter separately and zeroes `blocked_count`
    /// accordingly.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}
