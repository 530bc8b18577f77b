// SPDX-License-Identifier: GPL-2.0

//! Sleep routines.
//!
//! C header: [`include/linux/delay.h`](srctree/include/linux/delay.h).
//!
//! Drivers take a [`DelayNs`] so tests can substitute a delay that does not sleep.

pub use embedded_hal::delay::DelayNs;

use std::{thread, time::Duration};

/// Sleeps the calling thread.
pub fn msleep(msecs: u32) {
    thread::sleep(Duration::from_millis(msecs.into()));
}

/// [`DelayNs`] implementation backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        msleep(ms);
    }
}
