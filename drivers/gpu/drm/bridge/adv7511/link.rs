// SPDX-License-Identifier: GPL-2.0

//! Input link configuration.
//!
//! The link between the video source and the transmitter is fixed by the board: color depth,
//! colorspace, clocking and how the sync signals are carried. It is read from the firmware node
//! once at probe and programmed into the chip.

use crate::{
    regs::{main, main::video_input_cfg2::justification},
    Adv7511, Variant,
};
use kernel::{bits::field_prep, delay::DelayNs, device::Device, hdmi::Colorspace, i2c, prelude::*};

/// Input clock mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputClock {
    /// One clock edge per pixel.
    #[default]
    Clk1x,
    /// Clock at twice the pixel rate.
    Clk2x,
    /// Data on both clock edges.
    Ddr,
}

/// Position of the data bits on a wider input bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputJustification {
    #[default]
    Left,
    Evenly,
    Right,
}

/// Sync signal polarity handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPolarity {
    /// Forward the input polarity unchanged.
    #[default]
    Passthrough,
    /// Input sync is active low.
    Low,
    /// Input sync is active high.
    High,
}

/// Sync pulse carried on the dedicated input pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum SyncPulse {
    Vsync = 0,
    Hsync = 1,
    #[default]
    None = 3,
}

/// Board-level description of the video input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkConfig {
    pub input_color_depth: u32,
    pub input_colorspace: Colorspace,
    pub input_clock: InputClock,
    pub input_style: u32,
    pub input_justification: InputJustification,
    pub clock_delay: i32,
    pub embedded_sync: bool,
    pub sync_pulse: SyncPulse,
    pub hsync_polarity: SyncPolarity,
    pub vsync_polarity: SyncPolarity,
    /// DSI lane count, 0 to pick one per mode.
    pub num_dsi_lanes: u32,
}

const COLORSPACES: [(&str, Colorspace); 3] = [
    ("rgb", Colorspace::Rgb),
    ("yuv422", Colorspace::Yuv422),
    ("yuv444", Colorspace::Yuv444),
];

const CLOCKS: [(&str, InputClock); 3] = [
    ("1x", InputClock::Clk1x),
    ("2x", InputClock::Clk2x),
    ("ddr", InputClock::Ddr),
];

const JUSTIFICATIONS: [(&str, InputJustification); 3] = [
    ("left", InputJustification::Left),
    ("evenly", InputJustification::Evenly),
    ("right", InputJustification::Right),
];

const POLARITIES: [(&str, SyncPolarity); 3] = [
    ("passthrough", SyncPolarity::Passthrough),
    ("low", SyncPolarity::Low),
    ("high", SyncPolarity::High),
];

fn read_choice<T: Copy>(dev: &Device, name: &str, choices: &[(&str, T)]) -> Result<T> {
    let s = dev.property_read_string(name)?;

    choices
        .iter()
        .find(|(key, _)| *key == s)
        .map(|&(_, val)| val)
        .ok_or_else(|| {
            dev_err!(dev, "invalid {}: {}\n", name, s);
            EINVAL
        })
}

impl LinkConfig {
    /// Reads the link configuration from the `adi,*` properties of `dev`.
    ///
    /// The ADV7533 is fed over DSI and only takes the depth, the colorspace and an optional
    /// lane count.
    pub fn from_device(dev: &Device, variant: Variant) -> Result<Self> {
        let mut config = LinkConfig::default();

        config.input_color_depth = dev.property_read::<u32>("adi,input-depth", Some(0))?;
        if !matches!(config.input_color_depth, 8 | 10 | 12) {
            dev_err!(dev, "invalid input depth {}\n", config.input_color_depth);
            return Err(EINVAL);
        }

        config.input_colorspace = read_choice(dev, "adi,input-colorspace", &COLORSPACES)?;

        if variant == Variant::Adv7533 {
            if dev.property_present("adi,dsi-lanes") {
                config.num_dsi_lanes = dev.property_read::<u32>("adi,dsi-lanes", None)?;
                if !(1..=4).contains(&config.num_dsi_lanes) {
                    dev_err!(dev, "invalid DSI lane count {}\n", config.num_dsi_lanes);
                    return Err(EINVAL);
                }
            }

            return Ok(config);
        }

        config.input_clock = read_choice(dev, "adi,input-clock", &CLOCKS)?;

        if config.input_colorspace == Colorspace::Yuv422 || config.input_clock != InputClock::Clk1x
        {
            config.input_style = dev.property_read::<u32>("adi,input-style", None)?;
            if !(1..=3).contains(&config.input_style) {
                return Err(EINVAL);
            }

            config.input_justification =
                read_choice(dev, "adi,input-justification", &JUSTIFICATIONS)?;
        } else {
            config.input_style = 1;
            config.input_justification = InputJustification::Left;
        }

        config.clock_delay = dev.property_read::<i32>("adi,clock-delay", Some(0))?;
        if !(-1200..=1600).contains(&config.clock_delay) || config.clock_delay % 400 != 0 {
            dev_err!(dev, "invalid clock delay {}\n", config.clock_delay);
            return Err(EINVAL);
        }

        config.embedded_sync = dev.property_read_bool("adi,embedded-sync");

        config.sync_pulse = SyncPulse::None;
        if dev.property_present("adi,hsync-polarity") {
            config.hsync_polarity = read_choice(dev, "adi,hsync-polarity", &POLARITIES)?;
        }
        if dev.property_present("adi,vsync-polarity") {
            config.vsync_polarity = read_choice(dev, "adi,vsync-polarity", &POLARITIES)?;
        }

        Ok(config)
    }

    fn input_id(&self) -> u32 {
        match (self.input_colorspace, self.input_clock, self.embedded_sync) {
            (Colorspace::Yuv422, InputClock::Ddr, true) => 8,
            (Colorspace::Yuv422, InputClock::Ddr, false) => 7,
            (Colorspace::Yuv422, InputClock::Clk2x, true) => 4,
            (Colorspace::Yuv422, InputClock::Clk2x, false) => 3,
            (Colorspace::Yuv422, InputClock::Clk1x, true) => 2,
            (Colorspace::Yuv422, InputClock::Clk1x, false) => 1,
            (_, InputClock::Ddr, _) => 5,
            _ => 0,
        }
    }

    fn color_depth_code(&self) -> u32 {
        match self.input_color_depth {
            8 => 3,
            10 => 1,
            _ => 2,
        }
    }
}

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    /// Programs the input link registers from `config` and keeps the parts used per mode.
    pub(crate) fn set_link_config(&mut self, config: &LinkConfig) -> Result {
        // The input style register values are not in datasheet order.
        const INPUT_STYLES: [u32; 4] = [0, 2, 1, 3];

        self.rgb = config.input_colorspace == Colorspace::Rgb;

        if self.info.has_dsi_receiver {
            self.num_dsi_lanes = config.num_dsi_lanes;
            return Ok(());
        }

        let clock_delay = ((config.clock_delay + 1200) / 400) as u32;
        let style = INPUT_STYLES[config.input_style as usize & 0x3];
        let regmap = &mut self.regmap;

        main::i2c_freq_id_cfg::input_id::write(regmap, config.input_id())?;
        regmap.update_bits(
            main::video_input_cfg1::addr(),
            0x7e,
            (config.color_depth_code() << 4) | (style << 2),
        )?;

        let input_justification = match config.input_justification {
            InputJustification::Evenly => justification::Evenly,
            InputJustification::Right => justification::Right,
            InputJustification::Left => justification::Left,
        };
        regmap.write(
            main::video_input_cfg2::addr(),
            field_prep(justification::mask(), input_justification.into()),
        )?;
        regmap.write(
            main::timing_gen_seq::addr(),
            field_prep(main::timing_gen_seq::sync_pulse::mask(), config.sync_pulse as u32),
        )?;
        regmap.write(
            main::clock_delay::addr(),
            field_prep(main::clock_delay::delay::mask(), clock_delay),
        )?;

        self.embedded_sync = config.embedded_sync;
        self.hsync_polarity = config.hsync_polarity;
        self.vsync_polarity = config.vsync_polarity;

        Ok(())
    }
}
