// SPDX-License-Identifier: GPL-2.0

//! The `kernel` crate.
//!
//! This crate contains the driver-support abstractions the display bridge drivers are written
//! against: register maps, I2C clients and drivers, firmware node properties and device
//! printing. It is hosted: the bus is any [`embedded_hal::i2c::I2c`] implementation and
//! messages go through the [`log`] facade.

#![deny(unsafe_code)]

pub mod bits;
pub mod delay;
pub mod device;
pub mod drm;
pub mod error;
pub mod fwnode;
pub mod hdmi;
pub mod i2c;
pub mod irq;
pub mod of;
pub mod prelude;
pub mod print;
pub mod regmap;
pub mod sync;
pub mod types;

#[doc(hidden)]
pub use log;

/// Procedural helpers re-exported for macro use.
pub mod macros {
    pub use paste::paste;
}
