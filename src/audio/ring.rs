//! Pre-trigger frame retention.
//!
//! A loudness crossing is only observed after the loud frame has already been
//! read, so without a rolling window of recent frames the first syllable of
//! an utterance would be lost. The buffer keeps the last `capacity` frames in
//! insertion order; a snapshot at trigger time becomes the utterance prefix.

use super::source::Frame;
use std::collections::VecDeque;

pub struct PreTriggerBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl PreTriggerBuffer {
    /// Capacity 0 disables buffering entirely; snapshots are always empty.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, evicting the oldest when at capacity.
    pub fn push(&mut self, frame: Frame) {
        if self.capacity == 0 {
            return;
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Current contents in insertion order, without clearing.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
