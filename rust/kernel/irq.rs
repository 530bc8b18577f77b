// SPDX-License-Identifier: GPL-2.0

//! Interrupt handling.
//!
//! C header: [`include/linux/irqreturn.h`](srctree/include/linux/irqreturn.h)

/// Return value of an interrupt handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was not from this device or was not handled.
    None,
    /// The interrupt was handled by this device.
    Handled,
}
