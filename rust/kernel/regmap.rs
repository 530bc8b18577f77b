// SPDX-License-Identifier: GPL-2.0

//! Register map access API.
//!
//! C header: [`include/linux/regmap.h`](srctree/include/linux/regmap.h)
//!
//! A [`Regmap`] fronts a register [`Bus`] with a register cache. Non-volatile registers are
//! served from the cache once known, volatile ones always go to the bus. When the hardware
//! loses its state, [`Regmap::mark_dirty`] followed by [`Regmap::sync`] replays the patch and
//! every cached value that differs from the hardware default.
//!
//! # Examples
//!
//! ```ignore
//! regmap::define_regmap_field_descs!(fields, {
//!     (pid, 0x3, READ, { value => raw([7:0], ro) }),
//!     (limconf, 0x16, RW, {
//!         rearm     => bit(0, rw),
//!         rststatus => bit(1, rw),
//!         tpwth     => enum([5:4], rw, {
//!             Temp83C  = 0x0,
//!             Temp94C  = 0x1,
//!             Temp105C  = 0x2,
//!             Temp116C  = 0x3,
//!         }),
//!     })
//! });
//!
//! fn probe(client: &mut i2c::Client<A>) -> Result {
//!     let config = regmap::Config::<fields::AccessOps>::new(8, 8)
//!         .with_max_register(0x16)
//!         .with_cache_type(regmap::CacheType::RbTree);
//!     let mut regmap = regmap::Regmap::init_i2c(client, &config)?;
//!
//!     dev_info!(client.as_ref(), "PID: {:#x}", fields::pid::value::read(&mut regmap)?);
//! }
//! ```

use crate::{
    bits::{field_get, field_prep},
    error::{code::*, Error, Result},
    i2c,
    macros::paste,
};
use core::marker::PhantomData;
use std::collections::BTreeMap;

/// Raw register access used by a [`Regmap`].
///
/// Registers and values are 8 bits wide.
pub trait Bus {
    /// Reads register `reg`.
    fn read(&mut self, reg: u8) -> Result<u8>;

    /// Writes `val` to register `reg`.
    fn write(&mut self, reg: u8, val: u8) -> Result;

    /// Writes `vals` to consecutive registers starting at `reg`, in one transfer.
    fn bulk_write(&mut self, reg: u8, vals: &[u8]) -> Result;
}

impl<A: i2c::Algorithm> Bus for i2c::Client<A> {
    fn read(&mut self, reg: u8) -> Result<u8> {
        let mut val = [0u8];

        let ret = self.transfer(&mut [
            i2c::Operation::Write(&[reg]),
            i2c::Operation::Read(&mut val),
        ])?;
        if ret != 2 {
            return Err(EIO);
        }

        Ok(val[0])
    }

    fn write(&mut self, reg: u8, val: u8) -> Result {
        match self.transfer(&mut [i2c::Operation::Write(&[reg, val])])? {
            1 => Ok(()),
            _ => Err(EIO),
        }
    }

    fn bulk_write(&mut self, reg: u8, vals: &[u8]) -> Result {
        let mut buf = Vec::with_capacity(vals.len() + 1);
        buf.push(reg);
        buf.extend_from_slice(vals);

        match self.transfer(&mut [i2c::Operation::Write(&buf)])? {
            1 => Ok(()),
            _ => Err(EIO),
        }
    }
}

/// Type of caching
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheType {
    /// Don't cache anything
    None,
    /// Use RbTree caching
    RbTree,
    /// Use Flat caching
    Flat,
}

enum Cache {
    None,
    RbTree(BTreeMap<u32, u32>),
    Flat(Vec<Option<u32>>),
}

impl Cache {
    fn new(cache_type: CacheType, max_register: u32) -> Self {
        match cache_type {
            CacheType::None => Cache::None,
            CacheType::RbTree => Cache::RbTree(BTreeMap::new()),
            CacheType::Flat => Cache::Flat(vec![None; max_register as usize + 1]),
        }
    }

    fn get(&self, reg: u32) -> Option<u32> {
        match self {
            Cache::None => None,
            Cache::RbTree(map) => map.get(&reg).copied(),
            Cache::Flat(vals) => vals.get(reg as usize).copied().flatten(),
        }
    }

    fn insert(&mut self, reg: u32, val: u32) {
        match self {
            Cache::None => {}
            Cache::RbTree(map) => {
                map.insert(reg, val);
            }
            Cache::Flat(vals) => {
                if let Some(slot) = vals.get_mut(reg as usize) {
                    *slot = Some(val);
                }
            }
        }
    }

    fn entries(&self) -> Vec<(u32, u32)> {
        match self {
            Cache::None => Vec::new(),
            Cache::RbTree(map) => map.iter().map(|(&reg, &val)| (reg, val)).collect(),
            Cache::Flat(vals) => vals
                .iter()
                .enumerate()
                .filter_map(|(reg, val)| val.map(|val| (reg as u32, val)))
                .collect(),
        }
    }
}

/// A register write, used for patches and register sequences.
///
/// Equivalent to `struct reg_sequence`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegSequence {
    /// Register address.
    pub reg: u32,
    /// Value to write.
    pub def: u32,
}

impl RegSequence {
    /// Creates a register write of `def` to `reg`.
    pub const fn new(reg: u32, def: u32) -> Self {
        Self { reg, def }
    }
}

macro_rules! config_with {
    ($(#[$meta:meta])* $name:ident: $type:ty) => {
        config_with!($(#[$meta])* $name: $type, $name);
    };

    ($(#[$meta:meta])* $name:ident: $type:ty, $e:expr) => {
        paste! {
            $(#[$meta])*
            pub const fn [<with_$name>](mut self, $name: $type) -> Self {
                self.$name = $e;
                self
            }
        }
    };
}

/// Register access rules of a map.
///
/// Usually implemented by the `AccessOps` type [`define_regmap_field_descs`] generates.
pub trait ConfigOps {
    /// Whether `reg` can be read.
    fn is_readable_reg(reg: u32) -> bool;
    /// Whether `reg` can be written.
    fn is_writeable_reg(reg: u32) -> bool;
    /// Whether `reg` must bypass the cache.
    fn is_volatile_reg(reg: u32) -> bool;
    /// Whether reading `reg` has side effects.
    fn is_precious_reg(reg: u32) -> bool;
}

/// Regmap Configuration
pub struct Config<T: ConfigOps> {
    reg_bits: i32,
    val_bits: i32,
    max_register: u32,
    cache_type: CacheType,
    reg_defaults_raw: Option<&'static [u8]>,
    _phantom: PhantomData<T>,
}

impl<T: ConfigOps> Config<T> {
    /// Create a new regmap Config
    pub const fn new(reg_bits: i32, val_bits: i32) -> Self {
        Self {
            reg_bits,
            val_bits,
            max_register: 0,
            cache_type: CacheType::None,
            reg_defaults_raw: None,
            _phantom: PhantomData,
        }
    }

    config_with!(
        /// Specifies the maximum valid register address.
        max_register: u32
    );

    config_with!(
        /// Type of caching being performed.
        cache_type: CacheType
    );

    config_with!(
        /// Power-on values of registers `0..len`, used to seed the cache.
        reg_defaults_raw: &'static [u8], Some(reg_defaults_raw)
    );
}

struct AccessFns {
    readable: fn(u32) -> bool,
    writeable: fn(u32) -> bool,
    volatile: fn(u32) -> bool,
    precious: fn(u32) -> bool,
}

/// Register map
pub struct Regmap<B: Bus> {
    bus: B,
    max_register: u32,
    access: AccessFns,
    cache: Cache,
    defaults: BTreeMap<u32, u32>,
    patch: Vec<RegSequence>,
    cache_dirty: bool,
    no_sync_defaults: bool,
    cache_bypass: bool,
}

impl<A: i2c::Algorithm> Regmap<i2c::Client<A>> {
    /// Initialize a [`Regmap`] instance for an `i2c` client.
    pub fn init_i2c<T: ConfigOps>(i2c: &i2c::Client<A>, config: &Config<T>) -> Result<Self> {
        Self::init(i2c.clone(), config)
    }
}

impl<B: Bus> Regmap<B> {
    /// Initialize a [`Regmap`] on top of `bus`.
    ///
    /// Only 8-bit registers with 8-bit values are supported. Raw defaults of volatile registers
    /// are not cached.
    pub fn init<T: ConfigOps>(bus: B, config: &Config<T>) -> Result<Self> {
        if config.reg_bits != 8 || config.val_bits != 8 || config.max_register > 0xff {
            return Err(EINVAL);
        }

        let mut defaults = BTreeMap::new();
        if let Some(raw) = config.reg_defaults_raw {
            if raw.len() > config.max_register as usize + 1 {
                return Err(EINVAL);
            }

            for (reg, &def) in (0u32..).zip(raw) {
                if !T::is_volatile_reg(reg) {
                    defaults.insert(reg, u32::from(def));
                }
            }
        }

        let mut cache = Cache::new(config.cache_type, config.max_register);
        for (&reg, &def) in &defaults {
            cache.insert(reg, def);
        }

        Ok(Self {
            bus,
            max_register: config.max_register,
            access: AccessFns {
                readable: T::is_readable_reg,
                writeable: T::is_writeable_reg,
                volatile: T::is_volatile_reg,
                precious: T::is_precious_reg,
            },
            cache,
            defaults,
            patch: Vec::new(),
            cache_dirty: false,
            no_sync_defaults: false,
            cache_bypass: false,
        })
    }

    fn check(&self, reg: u32, allowed: fn(u32) -> bool) -> Result<u8> {
        if reg > self.max_register || !allowed(reg) {
            return Err(EINVAL);
        }

        u8::try_from(reg).map_err(|_| EINVAL)
    }

    fn cacheable(&self, reg: u32) -> bool {
        !self.cache_bypass && !(self.access.volatile)(reg)
    }

    /// Reads register `reg`, from the cache when possible.
    pub fn read(&mut self, reg: u32) -> Result<u32> {
        let addr = self.check(reg, self.access.readable)?;

        if self.cacheable(reg) {
            if let Some(val) = self.cache.get(reg) {
                return Ok(val);
            }
        }

        let val = u32::from(self.bus.read(addr)?);
        if self.cacheable(reg) {
            self.cache.insert(reg, val);
        }

        Ok(val)
    }

    /// Writes `val` to register `reg`, updating the cache.
    pub fn write(&mut self, reg: u32, val: u32) -> Result {
        let addr = self.check(reg, self.access.writeable)?;
        let byte = u8::try_from(val).map_err(|_| EINVAL)?;

        if self.cacheable(reg) {
            self.cache.insert(reg, val);
        }

        self.bus.write(addr, byte)
    }

    fn update_bits_base(&mut self, reg: u32, mask: u32, val: u32, force: bool) -> Result {
        let orig = self.read(reg)?;
        let tmp = (orig & !mask) | (val & mask);

        if force || tmp != orig {
            self.write(reg, tmp)?;
        }

        Ok(())
    }

    /// Updates the `mask` bits of `reg` to `val`, writing only if the value changes.
    pub fn update_bits(&mut self, reg: u32, mask: u32, val: u32) -> Result {
        self.update_bits_base(reg, mask, val, false)
    }

    /// Updates the `mask` bits of `reg` to `val`, always writing.
    pub fn force_update_bits(&mut self, reg: u32, mask: u32, val: u32) -> Result {
        self.update_bits_base(reg, mask, val, true)
    }

    /// Sets `bits` in `reg`.
    pub fn set_bits(&mut self, reg: u32, bits: u32) -> Result {
        self.update_bits(reg, bits, bits)
    }

    /// Clears `bits` in `reg`.
    pub fn clear_bits(&mut self, reg: u32, bits: u32) -> Result {
        self.update_bits(reg, bits, 0)
    }

    /// Returns whether all of `bits` are set in `reg`.
    pub fn test_bits(&mut self, reg: u32, bits: u32) -> Result<bool> {
        Ok(self.read(reg)? & bits == bits)
    }

    /// Writes `vals` to the registers starting at `reg` in a single bus transfer.
    pub fn bulk_write(&mut self, reg: u32, vals: &[u8]) -> Result {
        let addr = self.check(reg, self.access.writeable)?;

        for (offset, _) in (0u32..).zip(vals) {
            self.check(reg + offset, self.access.writeable)?;
        }

        for (offset, &val) in (0u32..).zip(vals) {
            if self.cacheable(reg + offset) {
                self.cache.insert(reg + offset, u32::from(val));
            }
        }

        self.bus.bulk_write(addr, vals)
    }

    /// Writes `regs` to the hardware now and again on every [`Regmap::sync`].
    ///
    /// Patch writes bypass the cache.
    pub fn register_patch(&mut self, regs: &[RegSequence]) -> Result {
        let bypass = self.cache_bypass;

        self.cache_bypass = true;
        let ret = regs.iter().try_for_each(|r| self.write(r.reg, r.def));
        self.cache_bypass = bypass;
        ret?;

        self.patch.extend_from_slice(regs);
        Ok(())
    }

    /// Marks the cache as out of sync with the hardware.
    ///
    /// To be called when the hardware was reset to its defaults, so that the next
    /// [`Regmap::sync`] only writes values that differ from them.
    pub fn mark_dirty(&mut self) {
        self.cache_dirty = true;
        self.no_sync_defaults = true;
    }

    /// Returns whether the cache was marked dirty and not synced since.
    pub fn is_dirty(&self) -> bool {
        self.cache_dirty
    }

    /// Writes the patch and the cached register values back to the hardware.
    ///
    /// Does nothing unless the cache is dirty. Volatile and non-writeable registers are
    /// skipped, as are values equal to the hardware default after [`Regmap::mark_dirty`].
    pub fn sync(&mut self) -> Result {
        if !self.cache_dirty {
            return Ok(());
        }

        let bypass = self.cache_bypass;
        self.cache_bypass = true;
        let ret = self.sync_locked();
        self.cache_bypass = bypass;
        self.no_sync_defaults = false;
        ret?;

        self.cache_dirty = false;
        Ok(())
    }

    fn sync_locked(&mut self) -> Result {
        let patch = self.patch.clone();
        for r in patch {
            self.write(r.reg, r.def)?;
        }

        for (reg, val) in self.cache.entries() {
            if (self.access.volatile)(reg) || !(self.access.writeable)(reg) {
                continue;
            }

            if self.no_sync_defaults && self.defaults.get(&reg) == Some(&val) {
                continue;
            }

            self.write(reg, val)?;
        }

        Ok(())
    }

    /// Returns the cached value of `reg`, without touching the bus.
    pub fn cached(&self, reg: u32) -> Option<u32> {
        self.cache.get(reg)
    }

    /// Reads every readable, non-precious register.
    pub fn dump(&mut self) -> Result<Vec<(u32, u32)>> {
        let mut regs = Vec::new();

        for reg in 0..=self.max_register {
            if !(self.access.readable)(reg) || (self.access.precious)(reg) {
                continue;
            }
            regs.push((reg, self.read(reg)?));
        }

        Ok(regs)
    }

    /// Returns the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }
}

/// Definitions describing how registers can be accessed.
pub mod access {
    /// Register can be read from.
    pub const READ: u32 = 0b000001;
    /// Register can be written to.
    pub const WRITE: u32 = 0b000010;
    /// Register should not be read outside of a call from the driver.
    pub const PRECIOUS: u32 = 0b000100;
    /// Register value can't be cached.
    pub const VOLATILE: u32 = 0b001000;

    /// Register can be read from and written to.
    pub const RW: u32 = READ | WRITE;
}

// macro use only
#[doc(hidden)]
#[macro_export]
macro_rules! regmap_check_access {
    ($type:ident, $access:expr, $reg:ident, $addr:literal) => {
        if $crate::regmap::access::$type & $access > 0 && $reg == $addr {
            return true;
        }
    };
}
// macro use only
#[doc(hidden)]
pub use crate::regmap_check_access;

/// Common operations for all field types
pub trait FieldCommonOps {
    /// Address of the register holding the field
    fn reg() -> u32;

    /// Get the Mask for the field
    fn mask() -> u32;
}

/// Read operations for fields with `bit` type
pub trait BitFieldReadOps: FieldCommonOps {
    /// Returns whether the bit is set
    fn is_set<B: Bus>(map: &mut Regmap<B>) -> Result<bool> {
        Ok((map.read(Self::reg())? & Self::mask()) != 0)
    }
}

/// Write operations for fields with `bit` type
pub trait BitFieldWriteOps: FieldCommonOps {
    /// Set the bit
    fn set<B: Bus>(map: &mut Regmap<B>) -> Result {
        map.update_bits(Self::reg(), Self::mask(), Self::mask())
    }

    /// Force set the bit
    fn force_set<B: Bus>(map: &mut Regmap<B>) -> Result {
        map.force_update_bits(Self::reg(), Self::mask(), Self::mask())
    }

    /// Clear the bit
    fn clear<B: Bus>(map: &mut Regmap<B>) -> Result {
        map.update_bits(Self::reg(), Self::mask(), 0)
    }

    /// Force clear the bit
    fn force_clear<B: Bus>(map: &mut Regmap<B>) -> Result {
        map.force_update_bits(Self::reg(), Self::mask(), 0)
    }

    /// Set or clear the bit
    fn assign<B: Bus>(map: &mut Regmap<B>, set: bool) -> Result {
        if set {
            Self::set(map)
        } else {
            Self::clear(map)
        }
    }
}

/// Read operations for fields with `enum` type
pub trait EnumFieldReadOps: FieldCommonOps {
    #[doc(hidden)]
    /// Underlying enum type reprensenting the field values
    type EnumType: TryFrom<u32, Error = Error>;

    /// Read the field
    fn read<B: Bus>(map: &mut Regmap<B>) -> Result<Self::EnumType> {
        let val = field_get(Self::mask(), map.read(Self::reg())?);

        <Self::EnumType as TryFrom<u32>>::try_from(val)
    }
}

/// Write operations for fields with `enum` type
pub trait EnumFieldWriteOps: FieldCommonOps {
    #[doc(hidden)]
    /// Underlying enum type reprensenting the field values
    type EnumType: Into<u32>;

    /// Write the field
    fn write<B: Bus>(map: &mut Regmap<B>, val: Self::EnumType) -> Result {
        map.update_bits(Self::reg(), Self::mask(), field_prep(Self::mask(), val.into()))
    }

    /// Force write the field
    fn force_write<B: Bus>(map: &mut Regmap<B>, val: Self::EnumType) -> Result {
        map.force_update_bits(Self::reg(), Self::mask(), field_prep(Self::mask(), val.into()))
    }
}

/// Read operations for fields with `raw` type
pub trait RawFieldReadOps: FieldCommonOps {
    /// Read the field
    fn read<B: Bus>(map: &mut Regmap<B>) -> Result<u32> {
        Ok(field_get(Self::mask(), map.read(Self::reg())?))
    }

    /// Test the field bits
    fn test_bits<B: Bus>(map: &mut Regmap<B>, bits: u32) -> Result<bool> {
        map.test_bits(Self::reg(), field_prep(Self::mask(), bits))
    }
}

/// Write operations for fields with `raw` type
pub trait RawFieldWriteOps: FieldCommonOps {
    /// Write the field
    fn write<B: Bus>(map: &mut Regmap<B>, val: u32) -> Result {
        map.update_bits(Self::reg(), Self::mask(), field_prep(Self::mask(), val))
    }

    /// Force write the field
    fn force_write<B: Bus>(map: &mut Regmap<B>, val: u32) -> Result {
        map.force_update_bits(Self::reg(), Self::mask(), field_prep(Self::mask(), val))
    }

    /// Update the field using a mask
    fn update_bits<B: Bus>(map: &mut Regmap<B>, mask: u32, val: u32) -> Result {
        let mask = field_prep(Self::mask(), mask);

        map.update_bits(Self::reg(), mask, field_prep(Self::mask(), val))
    }

    /// Force update the field using a mask
    fn force_update_bits<B: Bus>(map: &mut Regmap<B>, mask: u32, val: u32) -> Result {
        let mask = field_prep(Self::mask(), mask);

        map.force_update_bits(Self::reg(), mask, field_prep(Self::mask(), val))
    }

    /// Set field bits
    fn set_bits<B: Bus>(map: &mut Regmap<B>, bits: u32) -> Result {
        Self::update_bits(map, bits, bits)
    }

    /// Clear the field bits
    fn clear_bits<B: Bus>(map: &mut Regmap<B>, bits: u32) -> Result {
        Self::update_bits(map, bits, 0)
    }
}

/// Bit field
///
/// `bit` should be use when a feature is implemented through reading or writing a single bit of
/// a register.
///
/// See [`BitFieldReadOps`] and [`BitFieldWriteOps`] for operations available.
///
/// # Syntax
///
/// `bit(index, access)`
///
/// where
/// * `index`: bit index starting from 0
/// * `access`: access of the bit with the following possible values:
///     - `ro`: read-only ([`BitFieldReadOps`] gets implemented)
///     - `wo`: write-only ([`BitFieldWriteOps`] gets implemented)
///     - `rw`: read and write (both [`BitFieldReadOps`] and [`BitFieldWriteOps`] gets
///         implemented)
///
/// # Examples
///
/// ```ignore
/// regmap::define_regmap_field_descs!(fields, {
///     (power, 0x41, RW, {
///         power_down => bit(6, rw),
///     })
/// });
///
/// fields::power::power_down::set(&mut regmap)?;
/// fields::power::power_down::is_set(&mut regmap)?;
/// fields::power::power_down::clear(&mut regmap)?;
/// ```
#[macro_export]
macro_rules! regmap_field_bit {
    (@reserved $field_name:ident, $reg:literal, $pos:literal) => {
        #[allow(non_camel_case_types)]
        pub struct $field_name;

        impl $crate::regmap::FieldCommonOps for $field_name {
            fn reg() -> u32 {
                $reg
            }

            fn mask() -> u32 {
                $crate::genmask!($pos, $pos) as u32
            }
        }
    };

    (@ro $field_name:ident) => {
        impl $crate::regmap::BitFieldReadOps for $field_name {}
    };

    (@wo $field_name:ident) => {
        impl $crate::regmap::BitFieldWriteOps for $field_name {}
    };

    ($field_name:ident, $access:expr, $reg:literal, $pos:literal, rw) => {
        const _: () = assert!($access & $crate::regmap::access::RW == $crate::regmap::access::RW);

        $crate::regmap_field_bit!(@reserved $field_name, $reg, $pos);
        $crate::regmap_field_bit!(@ro $field_name);
        $crate::regmap_field_bit!(@wo $field_name);
    };

    ($field_name:ident, $access:expr, $reg:literal, $pos:literal, ro) => {
        const _: () = assert!(
            $access & $crate::regmap::access::READ == $crate::regmap::access::READ
        );

        $crate::regmap_field_bit!(@reserved $field_name, $reg, $pos);
        $crate::regmap_field_bit!(@ro $field_name);
    };

    ($field_name:ident, $access:expr, $reg:literal, $pos:literal, wo) => {
        const _: () = assert!(
            $access & $crate::regmap::access::WRITE == $crate::regmap::access::WRITE
        );

        $crate::regmap_field_bit!(@reserved $field_name, $reg, $pos);
        $crate::regmap_field_bit!(@wo $field_name);
    };
}

/// Enum field
///
/// `enum` should be used when a series of contineous bits represent possible values that can be
/// enumerated.
/// `enum` fields provide type-safety and preventing to write into the fields incorrect values.
///
/// See [`EnumFieldReadOps`] and [`EnumFieldWriteOps`] for operations available.
///
/// # Syntax
///
/// `enum(bits_range, access, { variant_definitions })`
///
/// where
/// * `bits_range`: bit used to store the data.
/// * `access`: access of the bits with the following possible values:
///     - `ro`: read-only ([`EnumFieldReadOps`] gets implemented)
///     - `wo`: write-only ([`EnumFieldWriteOps`] gets implemented)
///     - `rw`: read and write (both [`EnumFieldReadOps`] and [`EnumFieldWriteOps`] gets
///         implemented)
/// * `variant_definitions`: list of all the enum variants using the syntax: `VariantName = Value,`.
///
/// Variants are also reachable as associated constants of the field.
///
/// # Examples
///
/// ```ignore
/// regmap::define_regmap_field_descs!(fields, {
///     (power2, 0xd6, RW, {
///         hpd_src => enum([7:6], rw, {
///             Both = 0x0,
///             Cec = 0x1,
///             Hpd = 0x2,
///             Forced = 0x3,
///         }),
///     })
/// });
///
/// fields::power2::hpd_src::write(&mut regmap, fields::power2::hpd_src::Hpd)?;
/// fields::power2::hpd_src::read(&mut regmap)?;
/// ```
#[macro_export]
macro_rules! regmap_field_enum {
    (@reserved $field_name:ident, $reg:literal, [$msb:literal:$lsb:literal], {
        $($k:ident = $v:literal,)+ }) => {
        $crate::macros::paste! {
            #[repr(u32)]
            #[derive(Clone, Copy, Debug, PartialEq, Eq)]
            #[allow(non_camel_case_types)]
            pub enum [<$field_name _enum>] {
                $($k = $v,)+
            }

            impl TryFrom<u32> for [<$field_name _enum>] {
                type Error = $crate::error::Error;

                fn try_from(raw_value: u32) -> $crate::error::Result<Self> {
                    match raw_value {
                        $($v => Ok(Self::$k),)+
                        _ => Err($crate::error::code::EINVAL),
                    }
                }
            }

            impl From<[<$field_name _enum>]> for u32 {
                fn from(val: [<$field_name _enum>]) -> u32 {
                    val as u32
                }
            }

            #[allow(non_camel_case_types)]
            pub struct $field_name;

            #[allow(non_upper_case_globals)]
            impl $field_name {
                $(pub const $k: [<$field_name _enum>] = [<$field_name _enum>]::$k;)+
            }

            impl $crate::regmap::FieldCommonOps for $field_name {
                fn reg() -> u32 {
                    $reg
                }

                fn mask() -> u32 {
                    $crate::genmask!($msb, $lsb) as u32
                }
            }
        }
    };

    (@ro $field_name:ident) => {
        $crate::macros::paste! {
            impl $crate::regmap::EnumFieldReadOps for $field_name {
                type EnumType = [<$field_name _enum>];
            }
        }
    };

    (@wo $field_name:ident) => {
        $crate::macros::paste! {
            impl $crate::regmap::EnumFieldWriteOps for $field_name {
                type EnumType = [<$field_name _enum>];
            }
        }
    };

    ($field_name:ident, $access:expr, $reg:literal, [$msb:literal:$lsb:literal], ro, {
        $($k:ident = $v:literal,)+ }) => {
        const _: () = assert!(
            $access & $crate::regmap::access::READ == $crate::regmap::access::READ
        );

        $crate::regmap_field_enum!(@reserved $field_name, $reg, [$msb:$lsb], { $($k = $v,)+ });
        $crate::regmap_field_enum!(@ro $field_name);
    };

    ($field_name:ident, $access:expr, $reg:literal, [$msb:literal:$lsb:literal], rw, {
        $($k:ident = $v:literal,)+ }) => {
        const _: () = assert!($access & $crate::regmap::access::RW == $crate::regmap::access::RW);

        $crate::regmap_field_enum!(@reserved $field_name, $reg, [$msb:$lsb], { $($k = $v,)+ });
        $crate::regmap_field_enum!(@ro $field_name);
        $crate::regmap_field_enum!(@wo $field_name);
    };

    ($field_name:ident, $access:expr, $reg:literal, [$msb:literal:$lsb:literal], wo, {
        $($k:ident = $v:literal,)+ }) => {
        const _: () = assert!(
            $access & $crate::regmap::access::WRITE == $crate::regmap::access::WRITE
        );

        $crate::regmap_field_enum!(@reserved $field_name, $reg, [$msb:$lsb], { $($k = $v,)+ });
        $crate::regmap_field_enum!(@wo $field_name);
    };
}

/// Raw field
///
/// `raw` should be used when bits cannot be represented by any other field types. It provides
/// raw access to the register bits.
///
/// # Syntax
///
/// `raw(bits_range, access)`
///
/// where
/// * `bits_range`: bits used to store the data.
/// * `access`: access of the bit with the following possible values:
///     - `ro`: read-only ([`RawFieldReadOps`] gets implemented)
///     - `wo`: write-only ([`RawFieldWriteOps`] gets implemented)
///     - `rw`: read and write (both [`RawFieldReadOps`] and [`RawFieldWriteOps`] gets
///         implemented)
///
/// # Examples
///
/// ```ignore
/// regmap::define_regmap_field_descs!(fields, {
///     (chip_revision, 0x00, READ | VOLATILE, { value => raw([7:0], ro) }),
///     (cec_dsi_lanes, 0x1c, RW, { lanes => raw([6:4], rw) })
/// });
///
/// fields::chip_revision::value::read(&mut regmap)?;
/// fields::cec_dsi_lanes::lanes::write(&mut regmap, 4)?;
/// ```
#[macro_export]
macro_rules! regmap_field_raw {
    (@reserved $field_name:ident, $reg:literal, [$msb:literal:$lsb:literal]) => {
        #[allow(non_camel_case_types)]
        pub struct $field_name;

        impl $crate::regmap::FieldCommonOps for $field_name {
            fn reg() -> u32 {
                $reg
            }

            fn mask() -> u32 {
                $crate::genmask!($msb, $lsb) as u32
            }
        }
    };

    (@ro $field_name:ident) => {
        impl $crate::regmap::RawFieldReadOps for $field_name {}
    };

    (@wo $field_name:ident) => {
        impl $crate::regmap::RawFieldWriteOps for $field_name {}
    };

    ($field_name:ident, $access:expr, $reg:literal, [$msb:literal:$lsb:literal], rw) => {
        const _: () = assert!($access & $crate::regmap::access::RW == $crate::regmap::access::RW);

        $crate::regmap_field_raw!(@reserved $field_name, $reg, [$msb:$lsb]);
        $crate::regmap_field_raw!(@ro $field_name);
        $crate::regmap_field_raw!(@wo $field_name);
    };

    ($field_name:ident, $access:expr, $reg:literal, [$msb:literal:$lsb:literal], ro) => {
        const _: () = assert!(
            $access & $crate::regmap::access::READ == $crate::regmap::access::READ
        );

        $crate::regmap_field_raw!(@reserved $field_name, $reg, [$msb:$lsb]);
        $crate::regmap_field_raw!(@ro $field_name);
    };

    ($field_name:ident, $access:expr, $reg:literal, [$msb:literal:$lsb:literal], wo) => {
        const _: () = assert!(
            $access & $crate::regmap::access::WRITE == $crate::regmap::access::WRITE
        );

        $crate::regmap_field_raw!(@reserved $field_name, $reg, [$msb:$lsb]);
        $crate::regmap_field_raw!(@wo $field_name);
    };
}

// macro use only
#[doc(hidden)]
#[macro_export]
macro_rules! regmap_fields {
    ($type:ident, $access:expr, $reg:literal, $name:ident, $($t:tt)*) => {
        $crate::macros::paste! {
            $crate::[<regmap_field_ $type>]!($name, $access, $reg, $($t)*);
        }
    };
}

/// Define regmap field descriptors
///
/// # Syntax
///
/// ```ignore
/// define_regmap_field_descs!([pub] mod_name, { <register_definition>, [<register_definition>, ...] });
/// ```
///
/// where `mod_name`: module under which the registers, their fields and the `AccessOps`
/// [`ConfigOps`] implementation are generated.
///
/// register_definition:
/// ```ignore
/// (name, address, access_permission, { <field_definition>, [<field_definition>, ...] })
/// ```
/// where
///
/// * name: symbol under which this register will be available, with an `addr()` function
/// * address: register address
/// * access_permission: [`access`] permission of the register
///
/// field_definition:
/// ```ignore
/// field_name => <field_type>(...),
/// ```
///
/// where `field_name` is the symbol under which the field will be accessible.
///
/// The following `<field_type>`s are available:
/// * [bit](`regmap_field_bit`)
/// * [enum](`regmap_field_enum`)
/// * [raw](`regmap_field_raw`)
///
/// # Examples
///
/// ```ignore
/// regmap::define_regmap_field_descs!(fields, {
///     (pid, 0x3, READ, { value => raw([7:0], ro) }),
///     (limconf, 0x16, RW, {
///         rearm     => bit(0, rw),
///         rststatus => bit(1, rw),
///         tpwth     => enum([5:4], rw, {
///             Temp83C  = 0x0,
///             Temp94C  = 0x1,
///             Temp105C  = 0x2,
///             Temp116C  = 0x3,
///         }),
///     })
/// });
/// ```
#[macro_export]
macro_rules! define_regmap_field_descs {
    ($vis:vis $name:ident, {
        $((
            $reg_name:ident, $reg_addr:literal, $access:expr, {
                $($field_name:ident => $type:ident($($x:tt),*)),* $(,)?
            }
        )),+ $(,)?
    }) => {
        #[allow(dead_code)]
        $vis mod $name {
            #[allow(unused_imports)]
            use $crate::regmap::access::*;

            $(
                #[allow(non_camel_case_types)]
                pub mod $reg_name {
                    #[allow(unused_imports)]
                    use $crate::regmap::access::*;

                    $(
                        $crate::regmap_fields!($type, $access, $reg_addr, $field_name,
                                               $($x),*);
                    )*

                    /// Register address.
                    pub const fn addr() -> u32 {
                        $reg_addr
                    }
                }
            )+

            /// Access permissions of the registers defined in this module.
            pub struct AccessOps;

            impl $crate::regmap::ConfigOps for AccessOps {
                fn is_readable_reg(reg: u32) -> bool {
                    $(
                        $crate::regmap::regmap_check_access!(READ, $access, reg, $reg_addr);
                    )+

                    false
                }

                fn is_writeable_reg(reg: u32) -> bool {
                    $(
                        $crate::regmap::regmap_check_access!(WRITE, $access, reg, $reg_addr);
                    )+

                    false
                }

                fn is_volatile_reg(reg: u32) -> bool {
                    $(
                        $crate::regmap::regmap_check_access!(VOLATILE, $access, reg, $reg_addr);
                    )+

                    false
                }

                fn is_precious_reg(reg: u32) -> bool {
                    $(
                        $crate::regmap::regmap_check_access!(PRECIOUS, $access, reg, $reg_addr);
                    )+

                    false
                }
            }
        }
    };
}
pub use crate::define_regmap_field_descs;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[derive(Default)]
    struct FakeBus {
        regs: [u8; 8],
        reads: usize,
        writes: Vec<(u8, u8)>,
    }

    impl Bus for FakeBus {
        fn read(&mut self, reg: u8) -> Result<u8> {
            self.reads += 1;
            Ok(self.regs[reg as usize])
        }

        fn write(&mut self, reg: u8, val: u8) -> Result {
            self.writes.push((reg, val));
            self.regs[reg as usize] = val;
            Ok(())
        }

        fn bulk_write(&mut self, reg: u8, vals: &[u8]) -> Result {
            for (i, &val) in vals.iter().enumerate() {
                self.write(reg + i as u8, val)?;
            }
            Ok(())
        }
    }

    crate::define_regmap_field_descs!(regs, {
        (id, 0x0, READ | VOLATILE, { value => raw([7:0], ro) }),
        (ctrl, 0x1, RW, {
            enable => bit(0, rw),
            mode   => enum([5:4], rw, {
                Off = 0x0,
                Slow = 0x1,
                Fast = 0x2,
            }),
            level  => raw([3:1], rw),
        }),
        (status, 0x2, READ | VOLATILE | PRECIOUS, { irq => bit(7, ro) }),
        (data, 0x3, RW, {}),
        (trigger, 0x4, WRITE, { go => bit(0, wo) }),
    });

    static DEFAULTS: [u8; 5] = [0x42, 0x00, 0x00, 0x11, 0x00];

    fn regmap() -> Regmap<FakeBus> {
        let config = Config::<regs::AccessOps>::new(8, 8)
            .with_max_register(0x4)
            .with_cache_type(CacheType::RbTree)
            .with_reg_defaults_raw(&DEFAULTS);
        let mut bus = FakeBus::default();
        bus.regs[..5].copy_from_slice(&DEFAULTS);

        Regmap::init(bus, &config).unwrap()
    }

    #[test]
    fn access_ops() {
        use regs::AccessOps as Ops;

        assert!(Ops::is_readable_reg(0x0) && !Ops::is_writeable_reg(0x0));
        assert!(Ops::is_volatile_reg(0x2) && Ops::is_precious_reg(0x2));
        assert!(!Ops::is_readable_reg(0x4) && Ops::is_writeable_reg(0x4));
        assert!(!Ops::is_readable_reg(0x7));
        assert_eq!(regs::data::addr(), 0x3);
    }

    #[test]
    fn volatile_reads_bypass_cache() {
        let mut map = regmap();

        for _ in 0..3 {
            assert_eq!(map.read(0x0), Ok(0x42));
            assert_eq!(map.read(0x3), Ok(0x11));
        }
        assert_eq!(map.bus().reads, 3);
        assert_eq!(map.cached(0x0), None);
    }

    #[test]
    fn invalid_access() {
        let mut map = regmap();

        assert_eq!(map.write(0x0, 1), Err(EINVAL));
        assert_eq!(map.read(0x4), Err(EINVAL));
        assert_eq!(map.read(0x5), Err(EINVAL));
        assert_eq!(map.write(0x1, 0x100), Err(EINVAL));
        assert!(map.bus().writes.is_empty());
    }

    #[test]
    fn update_bits_skips_unchanged() {
        let mut map = regmap();

        map.update_bits(0x1, 0x1, 0x1).unwrap();
        map.update_bits(0x1, 0x1, 0x1).unwrap();
        map.force_update_bits(0x1, 0x1, 0x1).unwrap();
        assert_eq!(map.bus().writes, vec![(0x1, 0x1), (0x1, 0x1)]);
        assert_eq!(map.test_bits(0x1, 0x1), Ok(true));
        assert_eq!(map.bus().reads, 0);
    }

    #[test]
    fn fields() {
        let mut map = regmap();

        regs::ctrl::enable::set(&mut map).unwrap();
        regs::ctrl::mode::write(&mut map, regs::ctrl::mode::Fast).unwrap();
        regs::ctrl::level::write(&mut map, 5).unwrap();
        assert_eq!(map.cached(0x1), Some(0x2b));

        assert!(regs::ctrl::enable::is_set(&mut map).unwrap());
        assert_eq!(regs::ctrl::mode::read(&mut map), Ok(regs::ctrl::mode::Fast));
        assert_eq!(regs::ctrl::level::read(&mut map), Ok(5));
        assert_eq!(regs::ctrl::level::test_bits(&mut map, 0x4), Ok(true));

        regs::ctrl::level::clear_bits(&mut map, 0x1).unwrap();
        assert_eq!(regs::ctrl::level::read(&mut map), Ok(4));

        map.write(0x1, 0x30).unwrap();
        assert_eq!(regs::ctrl::mode::read(&mut map), Err(EINVAL));

        regs::trigger::go::force_set(&mut map).unwrap_err();
        assert_eq!(regs::id::value::read(&mut map), Ok(0x42));
        assert!(!regs::status::irq::is_set(&mut map).unwrap());
    }

    #[test]
    fn patch_and_sync_after_reset() {
        let mut map = regmap();

        map.register_patch(&[RegSequence::new(0x3, 0x77)]).unwrap();
        assert_eq!(map.cached(0x3), Some(0x11));

        map.write(0x1, 0x01).unwrap();
        map.bulk_write(0x3, &[0x11]).unwrap();

        // Nothing to do while clean.
        map.bus.writes.clear();
        map.sync().unwrap();
        assert!(map.bus().writes.is_empty());

        map.bus.regs[..5].copy_from_slice(&DEFAULTS);
        map.mark_dirty();
        assert!(map.is_dirty());
        map.sync().unwrap();

        // The patch is replayed, 0x3 is at its default and skipped.
        assert_eq!(map.bus().writes, vec![(0x3, 0x77), (0x1, 0x01)]);
        assert!(!map.is_dirty());
    }

    #[test]
    fn flat_and_uncached_maps() {
        let config = Config::<regs::AccessOps>::new(8, 8)
            .with_max_register(0x4)
            .with_cache_type(CacheType::Flat);
        let mut map = Regmap::init(FakeBus::default(), &config).unwrap();

        map.write(0x1, 0x05).unwrap();
        assert_eq!(map.read(0x1), Ok(0x05));
        assert_eq!(map.cached(0x1), Some(0x05));
        assert_eq!(map.bus().reads, 0);

        let config = config.with_cache_type(CacheType::None);
        let mut map = Regmap::init(FakeBus::default(), &config).unwrap();

        map.write(0x1, 0x05).unwrap();
        assert_eq!(map.read(0x1), Ok(0x05));
        assert_eq!(map.cached(0x1), None);
        assert_eq!(map.bus().reads, 1);
    }

    #[test]
    fn dump_skips_precious() {
        let mut map = regmap();

        assert_eq!(map.dump(), Ok(vec![(0x0, 0x42), (0x1, 0x00), (0x3, 0x11)]));
    }

    #[test]
    fn unsupported_geometry() {
        let config = Config::<regs::AccessOps>::new(16, 8).with_max_register(0x4);

        assert!(Regmap::init(FakeBus::default(), &config).is_err());
    }
}
