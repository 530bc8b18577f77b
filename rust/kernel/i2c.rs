// SPDX-License-Identifier: GPL-2.0

//! Abstractions for the I2C bus.
//!
//! C header: [`include/linux/i2c.h`](srctree/include/linux/i2c.h)
//!
//! An [`Adapter`] owns the bus controller (anything implementing [`Algorithm`], including any
//! [`embedded_hal::i2c::I2c`] through [`Hal`]) behind the bus lock. [`Client`]s address one
//! device on an adapter. Transfers follow `i2c_transfer()` semantics: all messages are sent as
//! one combined transaction and the number of messages completed is returned.

use crate::{
    device::Device,
    error::{code::*, Error, Result},
    fwnode::FwNode,
    of,
    sync::{Arc, Mutex},
};
use embedded_hal::i2c::Error as _;
use std::sync::MutexGuard;

pub use embedded_hal::i2c::Operation;

/// Bus controller operations, the counterpart of `struct i2c_algorithm`.
pub trait Algorithm: Send {
    /// Performs a combined transaction with the device at 7-bit address `addr`.
    ///
    /// Returns the number of messages that were completed.
    fn master_xfer(&mut self, addr: u16, msgs: &mut [Operation<'_>]) -> Result<usize>;
}

/// Adapts an [`embedded_hal::i2c::I2c`] bus to [`Algorithm`].
#[derive(Debug)]
pub struct Hal<I>(pub I);

impl<I: embedded_hal::i2c::I2c + Send> Algorithm for Hal<I> {
    fn master_xfer(&mut self, addr: u16, msgs: &mut [Operation<'_>]) -> Result<usize> {
        let addr = u8::try_from(addr).map_err(|_| EINVAL)?;

        self.0
            .transaction(addr, msgs)
            .map_err(|e| Error::from(e.kind()))?;

        Ok(msgs.len())
    }
}

/// An I2C adapter: a bus controller shared by all the clients on that bus.
pub struct Adapter<A: Algorithm> {
    algo: Arc<Mutex<A>>,
}

impl<A: Algorithm> Clone for Adapter<A> {
    fn clone(&self) -> Self {
        Self {
            algo: self.algo.clone(),
        }
    }
}

impl<A: Algorithm> Adapter<A> {
    /// Creates an adapter driven by `algo`.
    pub fn new(algo: A) -> Self {
        Self {
            algo: Arc::new(Mutex::new(algo)),
        }
    }

    /// Transfers `msgs` to `addr` while holding the bus lock.
    pub fn transfer(&self, addr: u16, msgs: &mut [Operation<'_>]) -> Result<usize> {
        self.algo.lock().master_xfer(addr, msgs)
    }

    /// Takes the bus lock, giving direct access to the controller.
    pub fn lock_bus(&self) -> MutexGuard<'_, A> {
        self.algo.lock()
    }
}

/// Abstraction for `struct i2c_device_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceId(&'static str);

impl DeviceId {
    /// Create a new device id from an I2C name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the I2C name.
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

/// I2C [`DeviceId`] table, associating each id with the driver's per-id information.
pub struct IdTable<T: 'static> {
    ids: &'static [(DeviceId, T)],
}

impl<T: 'static> IdTable<T> {
    // macro use only
    #[doc(hidden)]
    pub const fn new(ids: &'static [(DeviceId, T)]) -> Self {
        Self { ids }
    }

    /// Returns the information attached to the id named `name`.
    pub fn info(&self, name: &str) -> Option<&'static T> {
        let ids = self.ids;

        ids.iter().find(|(id, _)| id.name() == name).map(|(_, info)| info)
    }
}

/// Create an I2C `IdTable`.
///
/// # Examples
///
/// ```
/// use kernel::i2c;
///
/// kernel::i2c_device_table!(
///     I2C_ID_TABLE,
///     u32,
///     [(i2c::DeviceId::new("adv7511"), 7511),]
/// );
///
/// assert_eq!(I2C_ID_TABLE.info("adv7511"), Some(&7511));
/// ```
#[macro_export]
macro_rules! i2c_device_table {
    ($table_name:ident, $id_info_type: ty, $table_data: expr) => {
        const $table_name: $crate::i2c::IdTable<$id_info_type> = {
            const IDS: &[($crate::i2c::DeviceId, $id_info_type)] = &$table_data;
            $crate::i2c::IdTable::new(IDS)
        };
    };
}

/// An I2C Client.
///
/// A client is one 7-bit address on an [`Adapter`], with the device describing it and the
/// interrupt line it is wired to, if any.
pub struct Client<A: Algorithm> {
    adapter: Adapter<A>,
    name: String,
    addr: u16,
    irq: Option<u32>,
    dev: Arc<Device>,
}

impl<A: Algorithm> Clone for Client<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            name: self.name.clone(),
            addr: self.addr,
            irq: self.irq,
            dev: self.dev.clone(),
        }
    }
}

impl<A: Algorithm> Client<A> {
    /// Creates a client of type `name` at `addr`, described by `fwnode`.
    pub fn new(adapter: &Adapter<A>, name: &str, addr: u16, fwnode: FwNode) -> Self {
        Self {
            adapter: adapter.clone(),
            name: name.into(),
            addr,
            irq: None,
            dev: Arc::new(Device::new(format!("{}-{:04x}", name, addr), fwnode)),
        }
    }

    /// Attaches the interrupt line `irq` to the client.
    pub fn with_irq(mut self, irq: u32) -> Self {
        self.irq = Some(irq);
        self
    }

    /// Creates a client for a secondary address of the same chip, on the same adapter.
    ///
    /// Equivalent to `i2c_new_dummy_device()`.
    pub fn new_dummy(&self, addr: u16) -> Result<Self> {
        if addr > 0x7f {
            return Err(EINVAL);
        }

        Ok(Self::new(&self.adapter, "dummy", addr, FwNode::new()))
    }

    /// Transfers `msgs` to this client as one combined transaction.
    ///
    /// Returns the number of messages completed.
    pub fn transfer(&self, msgs: &mut [Operation<'_>]) -> Result<usize> {
        self.adapter.transfer(self.addr, msgs)
    }

    /// Returns the client's I2C type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the client's 7-bit address.
    pub fn addr(&self) -> u16 {
        self.addr
    }

    /// Returns the interrupt line of the client, if any.
    pub fn irq(&self) -> Option<u32> {
        self.irq
    }

    /// Returns the adapter the client sits on.
    pub fn adapter(&self) -> &Adapter<A> {
        &self.adapter
    }

    /// Returns a shared reference to the client's device.
    pub fn device(&self) -> Arc<Device> {
        self.dev.clone()
    }
}

impl<A: Algorithm> AsRef<Device> for Client<A> {
    fn as_ref(&self) -> &Device {
        &self.dev
    }
}

/// The I2C driver trait.
///
/// Drivers must implement this trait in order to get an I2C driver registered.
///
/// # Example
///
///```
/// # use kernel::{i2c, of, prelude::*};
///
/// struct MyDriver;
///
/// kernel::i2c_device_table!(I2C_TABLE, (), [(i2c::DeviceId::new("mydev"), ())]);
///
/// impl<A: i2c::Algorithm> i2c::Driver<A> for MyDriver {
///     type IdInfo = ();
///
///     const I2C_ID_TABLE: Option<i2c::IdTable<Self::IdInfo>> = Some(I2C_TABLE);
///     const OF_ID_TABLE: Option<of::IdTable<Self::IdInfo>> = None;
///
///     fn probe(_client: &mut i2c::Client<A>, _id_info: Option<&'static ()>) -> Result<Self> {
///         Ok(Self)
///     }
/// }
///```
pub trait Driver<A: Algorithm>: Sized {
    /// The type holding information about each device id supported by the driver.
    type IdInfo: 'static;

    /// An optional table of I2C device ids supported by the driver.
    const I2C_ID_TABLE: Option<IdTable<Self::IdInfo>>;

    /// An optional table of OF device ids supported by the driver.
    const OF_ID_TABLE: Option<of::IdTable<Self::IdInfo>>;

    /// I2C driver probe.
    ///
    /// Called when a new I2C client is added or discovered.
    fn probe(client: &mut Client<A>, id_info: Option<&'static Self::IdInfo>) -> Result<Self>;
}

/// Binds `T` to `client`.
///
/// The `compatible` property of the client's firmware node is matched against the OF table
/// first, then the client's type name against the I2C table. Fails with `ENODEV` when neither
/// matches.
pub fn probe<T: Driver<A>, A: Algorithm>(client: &mut Client<A>) -> Result<T> {
    let of_info = T::OF_ID_TABLE.and_then(|table| {
        client
            .device()
            .property_read_string("compatible")
            .ok()
            .and_then(|compatible| table.info(&compatible))
    });

    let id_info = of_info.or_else(|| T::I2C_ID_TABLE.and_then(|table| table.info(client.name())));
    if id_info.is_none() {
        return Err(ENODEV);
    }

    T::probe(client, id_info)
}
