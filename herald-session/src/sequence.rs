/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Dispatch sequence tracking.
//!
//! The tracker holds the highest dispatch sequence seen so far. It starts
//! empty and never moves backwards, so a late or replayed dispatch cannot make
//! the next heartbeat echo a stale value.

use herald_core::types::Sequence;

/// Tracks the last observed dispatch sequence number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceTracker {
    last: Option<Sequence>,
}

impl SequenceTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Records an observed sequence number.
    ///
    /// Returns true if the tracked value advanced.
    pub fn observe(&mut self, seq: Sequence) -> bool {
        match self.last {
            Some(last) if seq <= last => false,
            _ => {
                self.last = Some(seq);
                true
            }
        }
    }

    /// Returns the last observed sequence, `None` before the first dispatch.
    #[inline]
    #[must_use]
    pub const fn last(&self) -> Option<Sequence> {
        self.last
    }
}
