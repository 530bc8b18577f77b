// SPDX-License-Identifier: GPL-2.0

//! Synchronisation primitives.
//!
//! Locks do not poison: a panicking holder leaves the protected data as it was, the way kernel
//! mutexes behave.

use std::{
    sync::{self, MutexGuard},
    time::Duration,
};

pub use std::sync::Arc;

/// A mutual exclusion primitive.
#[derive(Debug, Default)]
pub struct Mutex<T>(sync::Mutex<T>);

impl<T> Mutex<T> {
    /// Constructs a new mutex.
    pub const fn new(t: T) -> Self {
        Self(sync::Mutex::new(t))
    }

    /// Locks the mutex and gives the caller access to the data protected by it.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A conditional variable.
///
/// Exposes the kernel's `wait_event_timeout` and `wake_up_all` style of use together with a
/// [`Mutex`].
#[derive(Debug, Default)]
pub struct CondVar(sync::Condvar);

impl CondVar {
    /// Constructs a new condition variable.
    pub const fn new() -> Self {
        Self(sync::Condvar::new())
    }

    /// Blocks until `cond` holds on the guarded value or `timeout` elapses.
    ///
    /// Returns the guard and whether the condition held on return.
    pub fn wait_timeout<'a, T>(
        &self,
        guard: MutexGuard<'a, T>,
        timeout: Duration,
        mut cond: impl FnMut(&mut T) -> bool,
    ) -> (MutexGuard<'a, T>, bool) {
        let (guard, res) = self
            .0
            .wait_timeout_while(guard, timeout, |t| !cond(t))
            .unwrap_or_else(|e| e.into_inner());

        (guard, !res.timed_out())
    }

    /// Wakes all waiters.
    pub fn notify_all(&self) {
        self.0.notify_all();
    }
}
