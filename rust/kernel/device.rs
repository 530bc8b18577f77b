// SPDX-License-Identifier: GPL-2.0

//! Generic devices that are part of the kernel's driver model.
//!
//! C header: [`include/linux/device.h`](srctree/include/linux/device.h)

use crate::{error::Result, fwnode::FwNode, types::Integer};
use core::fmt;

/// A device.
///
/// Carries the device name used to prefix messages and the firmware node describing the
/// device. Bus abstractions hand it out through `AsRef<Device>`, and drivers keep it behind an
/// [`Arc`](crate::sync::Arc) when they need it after probe.
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    fwnode: FwNode,
}

impl Device {
    /// Creates a device named `name` described by `fwnode`.
    pub fn new(name: impl Into<String>, fwnode: FwNode) -> Self {
        Self {
            name: name.into(),
            fwnode,
        }
    }

    /// Returns the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the firmware node of the device.
    pub fn fwnode(&self) -> &FwNode {
        &self.fwnode
    }

    /// Prints an error-level message (level 3) prefixed with device information.
    ///
    /// More details are available from [`dev_err`].
    ///
    /// [`dev_err`]: crate::dev_err
    pub fn pr_err(&self, args: fmt::Arguments<'_>) {
        crate::pr_err!("{}: {}", self.name, args);
    }

    /// Prints a warning-level message (level 4) prefixed with device information.
    ///
    /// More details are available from [`dev_warn`].
    ///
    /// [`dev_warn`]: crate::dev_warn
    pub fn pr_warn(&self, args: fmt::Arguments<'_>) {
        crate::pr_warn!("{}: {}", self.name, args);
    }

    /// Prints an info-level message (level 6) prefixed with device information.
    ///
    /// More details are available from [`dev_info`].
    ///
    /// [`dev_info`]: crate::dev_info
    pub fn pr_info(&self, args: fmt::Arguments<'_>) {
        crate::pr_info!("{}: {}", self.name, args);
    }

    /// Prints a debug-level message (level 7) prefixed with device information.
    ///
    /// More details are available from [`dev_dbg`].
    ///
    /// [`dev_dbg`]: crate::dev_dbg
    pub fn pr_dbg(&self, args: fmt::Arguments<'_>) {
        crate::pr_debug!("{}: {}", self.name, args);
    }

    /// Returns if a firmware property `name` is present
    pub fn property_present(&self, name: &str) -> bool {
        self.fwnode.property_present(name)
    }

    /// Returns if a firmware property `name` is true or false
    pub fn property_read_bool(&self, name: &str) -> bool {
        self.fwnode.property_read_bool(name)
    }

    /// Returns the first string of firmware string property `name`
    pub fn property_read_string(&self, name: &str) -> Result<String> {
        self.fwnode.property_read_string(name)
    }

    /// Returns the index of matching string `match_str` for firmware string property `name`
    pub fn property_match_string(&self, name: &str, match_str: &str) -> Result<usize> {
        self.fwnode.property_match_string(name, match_str)
    }

    /// Returns firmware property `name` integer scalar value
    pub fn property_read<T: Integer>(&self, name: &str, default: Option<T>) -> Result<T> {
        let default = default.map(|default| [default; 1]);

        let val = Self::property_read_array(self, name, default)?;
        Ok(val[0])
    }

    /// Returns firmware property `name` integer array values
    pub fn property_read_array<T: Integer, const N: usize>(
        &self,
        name: &str,
        default: Option<[T; N]>,
    ) -> Result<[T; N]> {
        let missing = default.is_none() && !self.fwnode.property_present(name);

        self.fwnode.property_read_array(name, default).inspect_err(|_| {
            if missing {
                crate::dev_err!(self, "'{}' property is missing and no default given.\n", name);
            }
        })
    }

    /// Returns integer array length for firmware property `name`
    pub fn property_count_elem<T: Integer>(&self, name: &str) -> Result<usize> {
        self.fwnode.property_count_elem::<T>(name)
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! dev_printk {
    ($method:ident, $dev:expr, $($f:tt)*) => {
        {
            ($dev).$method(core::format_args!($($f)*));
        }
    }
}

/// Prints an error-level message (level 3) prefixed with device information.
///
/// This level should be used if a condition prevents the device from working.
///
/// Equivalent to the kernel's `dev_err` macro.
///
/// # Examples
///
/// ```
/// # use kernel::{dev_err, device::Device, fwnode::FwNode};
///
/// let dev = Device::new("1-0039", FwNode::new());
/// dev_err!(dev, "hello {}\n", "there");
/// ```
#[macro_export]
macro_rules! dev_err {
    ($($f:tt)*) => { $crate::dev_printk!(pr_err, $($f)*); }
}

/// Prints a warning-level message (level 4) prefixed with device information.
///
/// Equivalent to the kernel's `dev_warn` macro.
#[macro_export]
macro_rules! dev_warn {
    ($($f:tt)*) => { $crate::dev_printk!(pr_warn, $($f)*); }
}

/// Prints an info-level message (level 6) prefixed with device information.
///
/// Equivalent to the kernel's `dev_info` macro.
#[macro_export]
macro_rules! dev_info {
    ($($f:tt)*) => { $crate::dev_printk!(pr_info, $($f)*); }
}

/// Prints a debug-level message (level 7) prefixed with device information.
///
/// Equivalent to the kernel's `dev_dbg` macro.
#[macro_export]
macro_rules! dev_dbg {
    ($($f:tt)*) => { $crate::dev_printk!(pr_dbg, $($f)*); }
}
