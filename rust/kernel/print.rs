// SPDX-License-Identifier: GPL-2.0

//! Printing facilities.
//!
//! C header: [`include/linux/printk.h`](srctree/include/linux/printk.h)
//!
//! Messages are forwarded to the [`log`] facade; the embedding application picks the logger.

/// Prints an error-level message (level 3).
///
/// Equivalent to the kernel's [`pr_err`] macro.
///
/// [`pr_err`]: https://docs.kernel.org/core-api/printk-basics.html#c.pr_err
#[macro_export]
macro_rules! pr_err (
    ($($arg:tt)*) => (
        $crate::log::error!($($arg)*)
    )
);

/// Prints a warning-level message (level 4).
#[macro_export]
macro_rules! pr_warn (
    ($($arg:tt)*) => (
        $crate::log::warn!($($arg)*)
    )
);

/// Prints an info-level message (level 6).
#[macro_export]
macro_rules! pr_info (
    ($($arg:tt)*) => (
        $crate::log::info!($($arg)*)
    )
);

/// Prints a debug-level message (level 7).
#[macro_export]
macro_rules! pr_debug (
    ($($arg:tt)*) => (
        $crate::log::debug!($($arg)*)
    )
);
