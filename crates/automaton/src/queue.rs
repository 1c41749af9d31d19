//! Circular queue of pending keys.
//!
//! The turn controller writes a decision's keys here and the input bridge
//! hands them to the host one at a time. There is exactly one writer and one
//! reader and they never run at the same time, so the queue needs no
//! locking.
//!
//! # Overflow
//!
//! Writing into a full queue does not block. The new key is stored, the
//! oldest unread key is dropped, and the write reports
//! [`QueueError::Overflow`]. Callers treat this as a silent failure.
use crate::error::QueueError;

/// One atomic input event for the host.
pub type Key = char;

pub const ESCAPE: Key = '\x1b';
pub const RETURN: Key = '\r';

/// Fixed-capacity FIFO of [`Key`]s.
#[derive(Clone, Debug)]
pub struct CommandQueue {
    buffer: Box<[Key]>,
    head: usize,
    tail: usize,
}

impl CommandQueue {
    /// Creates an empty queue that holds up to `capacity` keys.
    ///
    /// One extra slot is allocated so a full queue can be told apart from
    /// an empty one (`head == tail` always means empty).
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = capacity.max(1) + 1;
        Self {
            buffer: vec!['\0'; slots].into_boxed_slice(),
            head: 0,
            tail: 0,
        }
    }

    /// Number of keys the queue can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    pub fn len(&self) -> usize {
        (self.head + self.buffer.len() - self.tail) % self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Appends `key`.
    ///
    /// A nul key is rejected and leaves the queue untouched. When the queue
    /// is already full the key is still stored and the oldest pending key is
    /// lost.
    pub fn enqueue(&mut self, key: Key) -> Result<(), QueueError> {
        if key == '\0' {
            return Err(QueueError::NullKey);
        }

        self.buffer[self.head] = key;
        self.head = self.advance(self.head);

        if self.head == self.tail {
            self.tail = self.advance(self.tail);
            tracing::warn!(
                capacity = self.capacity(),
                "command queue overflow, dropped oldest key"
            );
            return Err(QueueError::Overflow);
        }

        Ok(())
    }

    /// Appends every key of `keys` in order.
    ///
    /// Nul keys are skipped. All keys are attempted even after an overflow;
    /// the first fault is reported.
    pub fn enqueue_all<I>(&mut self, keys: I) -> Result<(), QueueError>
    where
        I: IntoIterator<Item = Key>,
    {
        let mut first_error = None;
        for key in keys {
            match self.enqueue(key) {
                Ok(()) | Err(QueueError::NullKey) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// The next key without consuming it.
    pub fn peek(&self) -> Option<Key> {
        (!self.is_empty()).then(|| self.buffer[self.tail])
    }

    /// Removes and returns the next key.
    pub fn dequeue(&mut self) -> Option<Key> {
        let key = self.peek()?;
        self.tail = self.advance(self.tail);
        Some(key)
    }

    /// Forgets every pending key.
    pub fn flush(&mut self) {
        self.tail = self.head;
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.buffer.len()
    }
}
