// SPDX-License-Identifier: GPL-2.0

//! Driver for the Analog Devices ADV7511 and ADV7533 HDMI transmitters
//!
//! Datasheet: https://www.analog.com/media/en/technical-documentation/data-sheets/ADV7511.pdf
//!
//! The ADV7511 takes parallel RGB or YCbCr video, the ADV7533 takes MIPI DSI through a
//! receiver controlled from its CEC register map. Both expose the main register map at the
//! client address, the EDID shadow memory and the CEC map on dummy clients, and reset most of
//! their registers when powered down or when the sink is unplugged.
//!
//! The device is driven from a single context. A caller that services the interrupt line from
//! another thread shares the device behind a [`Mutex`](kernel::sync::Mutex) and takes the lock
//! for each operation.

use kernel::{
    delay::{DelayNs, StdDelay},
    device::Device,
    drm::{
        connector::{ConnectorStatus, DisplayInfo, ModeStatus},
        edid::Edid,
        mode::DisplayMode,
    },
    i2c, of,
    prelude::*,
    regmap::{self, RegSequence, Regmap},
    sync::Arc,
};
use regs::{cec, main, MainAccess};

mod adv7533;
mod edid;
mod hpd;
mod irq;
mod link;
#[cfg(test)]
mod mock;
mod power;
mod regs;
mod video;

pub use edid::EdidWait;
pub use hpd::HpdPolicy;
pub use link::{InputClock, InputJustification, LinkConfig, SyncPolarity, SyncPulse};

/// Addresses the chip is told to answer on, in 8-bit form.
const EDID_I2C_ADDR: u32 = 0x7e;
const PACKET_I2C_ADDR: u32 = 0x70;
const CEC_I2C_ADDR: u32 = 0x78;

/// Highest TMDS clock the transmitter supports, in kHz.
const MAX_PIXEL_CLOCK: u32 = 165000;

/// Chip family member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// ADV7511, ADV7511W and ADV7513: parallel video input.
    Adv7511,
    /// ADV7533: MIPI DSI input.
    Adv7533,
}

/// Per-variant description, selected from the id tables at probe.
#[derive(Debug)]
pub struct ChipInfo {
    /// Chip family member.
    pub variant: Variant,
    fixed_registers: &'static [RegSequence],
    cec_fixed_registers: &'static [RegSequence],
    /// Whether the chip has a DSI receiver behind the CEC map.
    pub has_dsi_receiver: bool,
}

const ADV7511_INFO: ChipInfo = ChipInfo {
    variant: Variant::Adv7511,
    fixed_registers: &regs::ADV7511_FIXED_REGISTERS,
    cec_fixed_registers: &[],
    has_dsi_receiver: false,
};

const ADV7533_INFO: ChipInfo = ChipInfo {
    variant: Variant::Adv7533,
    fixed_registers: &regs::ADV7533_FIXED_REGISTERS,
    cec_fixed_registers: &regs::ADV7533_CEC_FIXED_REGISTERS,
    has_dsi_receiver: true,
};

kernel::i2c_device_table!(
    I2C_ID_TABLE,
    ChipInfo,
    [
        (i2c::DeviceId::new("adv7511"), ADV7511_INFO),
        (i2c::DeviceId::new("adv7511w"), ADV7511_INFO),
        (i2c::DeviceId::new("adv7513"), ADV7511_INFO),
        (i2c::DeviceId::new("adv7533"), ADV7533_INFO),
    ]
);

kernel::of_device_table!(
    OF_ID_TABLE,
    ChipInfo,
    [
        (of::DeviceId::new("adi,adv7511"), ADV7511_INFO),
        (of::DeviceId::new("adi,adv7511w"), ADV7511_INFO),
        (of::DeviceId::new("adi,adv7513"), ADV7511_INFO),
        (of::DeviceId::new("adi,adv7533"), ADV7533_INFO),
    ]
);

/// The display pipeline the transmitter is attached to.
pub trait DisplayPipeline: Send {
    /// A sink was plugged or unplugged, connectors should be probed again.
    fn hotplug_event(&mut self);

    /// The DSI link needs to be reset after a receiver error.
    fn dsi_reset(&mut self) {}
}

/// An ADV7511 family transmitter.
pub struct Adv7511<A: i2c::Algorithm, D: DelayNs = StdDelay> {
    dev: Arc<Device>,
    info: &'static ChipInfo,
    regmap: Regmap<i2c::Client<A>>,
    regmap_cec: Regmap<i2c::Client<A>>,
    i2c_edid: i2c::Client<A>,
    irq: Option<u32>,
    hpd_policy: HpdPolicy,

    powered: bool,
    status: ConnectorStatus,

    edid: Option<Edid>,
    edid_buf: [u8; 256],
    current_edid_segment: Option<u32>,
    edid_wait: Arc<EdidWait>,
    display_info: DisplayInfo,

    curr_mode: DisplayMode,
    f_tmds: u32,

    rgb: bool,
    embedded_sync: bool,
    hsync_polarity: SyncPolarity,
    vsync_polarity: SyncPolarity,
    num_dsi_lanes: u32,

    pipeline: Option<Box<dyn DisplayPipeline>>,
    delay: D,
}

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    /// Brings up the transmitter at `client` and leaves it powered down.
    ///
    /// The link configuration is read from the client's firmware node before the bus is
    /// touched. `delay` paces the DDC status polling.
    pub fn new(client: &i2c::Client<A>, info: &'static ChipInfo, delay: D) -> Result<Self> {
        let dev = client.device();

        let link_config = LinkConfig::from_device(&dev, info.variant)?;
        let hpd_policy = HpdPolicy::from_device(&dev);

        let config = regmap::Config::<MainAccess>::new(8, 8)
            .with_max_register(0xff)
            .with_cache_type(regmap::CacheType::RbTree)
            .with_reg_defaults_raw(&regs::REG_DEFAULTS);
        let mut regmap = Regmap::init_i2c(client, &config)?;

        let revision = main::chip_revision::value::read(&mut regmap)?;
        dev_dbg!(dev, "Rev. {}\n", revision);

        regmap.register_patch(info.fixed_registers)?;

        regmap.write(main::edid_i2c_addr::addr(), EDID_I2C_ADDR)?;
        regmap.write(main::packet_i2c_addr::addr(), PACKET_I2C_ADDR)?;
        regmap.write(main::cec_i2c_addr::addr(), CEC_I2C_ADDR)?;

        let i2c_edid = client.new_dummy((EDID_I2C_ADDR >> 1) as u16)?;
        let i2c_cec = client.new_dummy((CEC_I2C_ADDR >> 1) as u16)?;

        let cec_config = regmap::Config::<cec::AccessOps>::new(8, 8)
            .with_max_register(0xff)
            .with_cache_type(regmap::CacheType::RbTree);
        let mut regmap_cec = Regmap::init(i2c_cec, &cec_config)?;
        regmap_cec.register_patch(info.cec_fixed_registers)?;

        let mut adv7511 = Self {
            dev,
            info,
            regmap,
            regmap_cec,
            i2c_edid,
            irq: client.irq(),
            hpd_policy,
            powered: false,
            status: ConnectorStatus::Disconnected,
            edid: None,
            edid_buf: [0; 256],
            current_edid_segment: None,
            edid_wait: Arc::new(EdidWait::default()),
            display_info: DisplayInfo::default(),
            curr_mode: DisplayMode::default(),
            f_tmds: 0,
            rgb: true,
            embedded_sync: false,
            hsync_polarity: SyncPolarity::Passthrough,
            vsync_polarity: SyncPolarity::Passthrough,
            num_dsi_lanes: 0,
            pipeline: None,
            delay,
        };

        adv7511.packet_disable(0xffff)?;

        if adv7511.irq.is_some() {
            // Mask everything but the DSI receiver until power on.
            adv7511.regmap.write(main::int_enable0::addr(), 0)?;
            if info.has_dsi_receiver {
                cec::dsi_int_ctrl::enable::set(&mut adv7511.regmap_cec)?;
            }
        }

        // CEC is unused.
        adv7511
            .regmap
            .write(main::cec_ctrl::addr(), main::cec_ctrl::power_down::mask())?;

        adv7511.power_off()?;
        adv7511.set_link_config(&link_config)?;

        Ok(adv7511)
    }

    /// Connects the transmitter to the display pipeline and requests a first probe.
    pub fn attach(&mut self, mut pipeline: Box<dyn DisplayPipeline>) {
        pipeline.hotplug_event();
        self.pipeline = Some(pipeline);
    }

    /// Checks whether the transmitter can drive `mode`.
    pub fn mode_valid(&self, mode: &DisplayMode) -> ModeStatus {
        if mode.clock > MAX_PIXEL_CLOCK {
            return ModeStatus::ClockHigh;
        }

        ModeStatus::Ok
    }

    /// Returns the chip description.
    pub fn info(&self) -> &'static ChipInfo {
        self.info
    }

    /// Returns whether the transmitter is powered up.
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Returns the connection state reported by the last [`Adv7511::detect`].
    pub fn status(&self) -> ConnectorStatus {
        self.status
    }

    /// Returns the EDID read by the last [`Adv7511::get_modes`], if any.
    pub fn edid(&self) -> Option<&Edid> {
        self.edid.as_ref()
    }

    /// Returns the sink capabilities learnt from the EDID.
    pub fn display_info(&self) -> DisplayInfo {
        self.display_info
    }

    /// Returns the mode programmed by the last [`Adv7511::mode_set`].
    pub fn current_mode(&self) -> &DisplayMode {
        &self.curr_mode
    }

    /// Returns the TMDS clock of the current mode in kHz.
    pub fn tmds_clock(&self) -> u32 {
        self.f_tmds
    }

    /// Returns the EDID readiness flag raised by the interrupt handler.
    pub fn edid_waiter(&self) -> Arc<EdidWait> {
        self.edid_wait.clone()
    }
}

impl<A: i2c::Algorithm, D: DelayNs + Default> i2c::Driver<A> for Adv7511<A, D> {
    type IdInfo = ChipInfo;

    const I2C_ID_TABLE: Option<i2c::IdTable<Self::IdInfo>> = Some(I2C_ID_TABLE);
    const OF_ID_TABLE: Option<of::IdTable<Self::IdInfo>> = Some(OF_ID_TABLE);

    fn probe(client: &mut i2c::Client<A>, id_info: Option<&'static Self::IdInfo>) -> Result<Self> {
        let info = id_info.ok_or(ENODEV)?;

        Self::new(client, info, D::default())
    }
}

impl<A: i2c::Algorithm, D: DelayNs> Drop for Adv7511<A, D> {
    fn drop(&mut self) {
        dev_dbg!(self.dev, "removed\n");
    }
}
