//! Single-owner timer handles for gesture recognition.
//!
//! The controller never sleeps. It asks the host to schedule or cancel a
//! callback through `TimerRequest` values, and the host reports expiry back
//! with the same `TimerHandle`. A handle that is no longer held by its slot is
//! stale and its expiry is ignored.

use serde::{Deserialize, Serialize};

/// Opaque id for one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Purpose of a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Long-press that promotes a pending press into a drag.
    Press,
    /// Sustained hover that arms a card merge.
    MergeHold,
}

/// Scheduling effect the host must carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TimerRequest {
    Schedule {
        handle: TimerHandle,
        kind: TimerKind,
        delay_ms: u64,
    },
    Cancel {
        handle: TimerHandle,
    },
}

/// Monotonic handle source; handles are never reused within a controller.
#[derive(Debug, Default)]
pub(crate) struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub(crate) fn allocate(&mut self) -> TimerHandle {
        self.next += 1;
        TimerHandle(self.next)
    }
}

/// Holds at most one live handle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct TimerSlot {
    handle: Option<TimerHandle>,
}

impl TimerSlot {
    /// Schedules a fresh callback, cancelling whatever the slot held.
    pub(crate) fn arm(
        &mut self,
        allocator: &mut HandleAllocator,
        kind: TimerKind,
        delay_ms: u64,
        requests: &mut Vec<TimerRequest>,
    ) {
        self.disarm(requests);
        let handle = allocator.allocate();
        self.handle = Some(handle);
        requests.push(TimerRequest::Schedule {
            handle,
            kind,
            delay_ms,
        });
    }

    pub(crate) fn disarm(&mut self, requests: &mut Vec<TimerRequest>) {
        if let Some(handle) = self.handle.take() {
            requests.push(TimerRequest::Cancel { handle });
        }
    }

    /// Consumes the slot when `handle` is the live one.
    pub(crate) fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.handle == Some(handle) {
            self.handle = None;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}
