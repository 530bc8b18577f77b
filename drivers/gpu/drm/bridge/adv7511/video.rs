// SPDX-License-Identifier: GPL-2.0

//! Output video configuration: colorspace conversion, AVI infoframe and mode timings.

use crate::{
    regs::{
        self, main,
        main::{hdcp_hdmi_cfg, low_refresh::rate},
        PACKET_ENABLE_AVI_INFOFRAME,
    },
    Adv7511, SyncPolarity,
};
use kernel::{
    delay::DelayNs,
    drm::{
        connector::color_format,
        mode::{flags, DisplayMode},
    },
    hdmi::{AviInfoframe, Colorspace, ScanMode, AVI_INFOFRAME_SIZE},
    i2c,
    prelude::*,
};

/// YCbCr to RGB conversion coefficients.
const CSC_YCBCR_TO_RGB: [u16; 12] = [
    0x0734, 0x04ad, 0x0000, 0x1c1b, //
    0x1ddc, 0x04ad, 0x1f24, 0x0135, //
    0x0000, 0x04ad, 0x087c, 0x1b77,
];

const CSC_SCALING_4: u32 = 2;

/// Active sizes that need the clock recovery adjustment.
const CLOCK_RECOVERY_SIZES: [(u32, u32); 5] = [
    (1920, 1080),
    (1280, 720),
    (1280, 576),
    (720, 576),
    (720, 480),
];

/// Output format decided from the input format and the sink capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct VideoConfig {
    pub(crate) csc_enable: bool,
    pub(crate) hdmi_mode: bool,
    pub(crate) colorspace: Colorspace,
}

impl VideoConfig {
    /// `color_formats` are the sink's [`color_format`] bits.
    pub(crate) fn new(rgb: bool, color_formats: u32, hdmi_mode: bool) -> Self {
        let (csc_enable, colorspace) = if rgb {
            (false, Colorspace::Rgb)
        } else if color_formats & color_format::YCRCB422 != 0 && hdmi_mode {
            (false, Colorspace::Yuv422)
        } else {
            (true, Colorspace::Rgb)
        };

        Self {
            csc_enable,
            hdmi_mode,
            colorspace,
        }
    }

    /// Returns whether the output is 4:2:2 and whether it is YCbCr.
    pub(crate) fn output_format(&self) -> (bool, bool) {
        if !self.hdmi_mode {
            return (false, false);
        }

        match self.colorspace {
            Colorspace::Yuv444 => (false, true),
            Colorspace::Yuv422 => (true, true),
            _ => (false, false),
        }
    }
}

fn low_refresh_rate(vrefresh: u32) -> main::low_refresh::rate_enum {
    match vrefresh {
        0..=24 => rate::Hz24,
        25 => rate::Hz25,
        26..=30 => rate::Hz30,
        _ => rate::None,
    }
}

/// Whether the sync output must be inverted for a configured `polarity`, given the mode's.
fn invert_sync(polarity: SyncPolarity, mode_negative: bool) -> bool {
    match polarity {
        SyncPolarity::Passthrough => false,
        SyncPolarity::Low => !mode_negative,
        SyncPolarity::High => mode_negative,
    }
}

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    /// Enables the packets in the 16-bit `packet` mask.
    pub(crate) fn packet_enable(&mut self, packet: u32) -> Result {
        if packet & 0xff != 0 {
            self.regmap
                .update_bits(main::packet_enable0::addr(), packet & 0xff, 0xff)?;
        }

        if packet & 0xff00 != 0 {
            self.regmap
                .update_bits(main::packet_enable1::addr(), (packet >> 8) & 0xff, 0xff)?;
        }

        Ok(())
    }

    /// Disables the packets in the 16-bit `packet` mask.
    pub(crate) fn packet_disable(&mut self, packet: u32) -> Result {
        if packet & 0xff != 0 {
            self.regmap
                .update_bits(main::packet_enable0::addr(), packet & 0xff, 0)?;
        }

        if packet & 0xff00 != 0 {
            self.regmap
                .update_bits(main::packet_enable1::addr(), (packet >> 8) & 0xff, 0)?;
        }

        Ok(())
    }

    fn set_colormap(&mut self, enable: bool, coeff: &[u16; 12], scaling_factor: u32) -> Result {
        // Hold the coefficients until they are all written.
        main::csc_update::hold::set(&mut self.regmap)?;

        if enable {
            for (i, &c) in (0u32..).zip(coeff) {
                self.regmap
                    .update_bits(regs::csc_upper(i), 0x1f, u32::from(c >> 8))?;
                self.regmap
                    .write(regs::csc_lower(i), u32::from(c & 0xff))?;
            }

            self.regmap.update_bits(
                main::csc_ctrl::addr(),
                main::csc_ctrl::enable::mask() | main::csc_ctrl::scaling::mask(),
                main::csc_ctrl::enable::mask() | (scaling_factor << 5),
            )?;
        } else {
            main::csc_ctrl::enable::clear(&mut self.regmap)?;
        }

        main::csc_update::hold::clear(&mut self.regmap)
    }

    /// Configures the colorspace conversion, output format and AVI infoframe for an input
    /// that is RGB if `rgb` is set.
    pub(crate) fn set_config_csc(&mut self, rgb: bool) -> Result {
        let hdmi = self.edid.as_ref().is_some_and(|edid| edid.is_hdmi_monitor());
        let config = VideoConfig::new(rgb, self.display_info.color_formats, hdmi);
        let (output_format_422, output_format_ycbcr) = config.output_format();

        let frame = AviInfoframe {
            colorspace: config.colorspace,
            scan_mode: ScanMode::Underscan,
            ..AviInfoframe::new()
        };
        let mut infoframe = [0u8; AVI_INFOFRAME_SIZE];
        frame.pack(&mut infoframe)?;

        self.packet_disable(PACKET_ENABLE_AVI_INFOFRAME)?;

        self.set_colormap(config.csc_enable, &CSC_YCBCR_TO_RGB, CSC_SCALING_4)?;

        self.regmap.update_bits(
            main::video_input_cfg1::addr(),
            main::video_input_cfg1::yuv422::mask() | main::video_input_cfg1::ycbcr::mask(),
            (u32::from(output_format_422) << 7) | u32::from(output_format_ycbcr),
        )?;

        let mode = if config.hdmi_mode {
            hdcp_hdmi_cfg::mode::Hdmi
        } else {
            hdcp_hdmi_cfg::mode::Dvi
        };
        hdcp_hdmi_cfg::mode::write(&mut self.regmap, mode)?;

        // The infoframe type is fixed, only version onwards is written.
        self.regmap
            .bulk_write(main::avi_infoframe_version::addr(), &infoframe[1..])?;

        self.packet_enable(PACKET_ENABLE_AVI_INFOFRAME)
    }

    fn set_embedded_sync(&mut self, adj: &DisplayMode) -> Result {
        let hsync_offset = adj.hsync_start.saturating_sub(adj.hdisplay);
        let hsync_len = adj.hsync_end.saturating_sub(adj.hsync_start);
        // The vsync generator is off by one.
        let vsync_offset = adj.vsync_start.saturating_sub(adj.vdisplay) + 1;
        let vsync_len = adj.vsync_end.saturating_sub(adj.vsync_start);

        let regmap = &mut self.regmap;

        regmap.write(
            main::hsync_placement_msb::addr(),
            ((hsync_offset >> 10) & 0x7) << 5,
        )?;
        regmap.write(regs::sync_decoder(0), (hsync_offset >> 2) & 0xff)?;
        regmap.write(
            regs::sync_decoder(1),
            ((hsync_offset & 0x3) << 6) | ((hsync_len >> 4) & 0x3f),
        )?;
        regmap.write(
            regs::sync_decoder(2),
            ((hsync_len & 0xf) << 4) | ((vsync_offset >> 6) & 0xf),
        )?;
        regmap.write(
            regs::sync_decoder(3),
            ((vsync_offset & 0x3f) << 2) | ((vsync_len >> 8) & 0x3),
        )?;
        regmap.write(regs::sync_decoder(4), vsync_len & 0xff)
    }

    /// Programs the transmitter for `mode`, with `adj` the timings after pipeline adjustment.
    pub fn mode_set(&mut self, mode: &DisplayMode, adj: &DisplayMode) -> Result {
        if self.info.has_dsi_receiver {
            self.regmap
                .write(main::blank::addr(), main::blank::black::mask())?;
        }

        let (hsync_polarity, vsync_polarity) = if self.embedded_sync {
            self.set_embedded_sync(adj)?;

            (
                adj.flags & flags::PHSYNC == 0,
                adj.flags & flags::PVSYNC == 0,
            )
        } else {
            (
                invert_sync(self.hsync_polarity, adj.flags & flags::NHSYNC != 0),
                invert_sync(self.vsync_polarity, adj.flags & flags::NVSYNC != 0),
            )
        };

        if self.info.has_dsi_receiver {
            self.dsi_config_lanes(adj.clock)?;
        }

        main::low_refresh::rate::write(&mut self.regmap, low_refresh_rate(mode.vrefresh()))?;

        self.regmap.update_bits(
            main::video_input_cfg_sync::addr(),
            main::video_input_cfg_sync::hsync_polarity::mask()
                | main::video_input_cfg_sync::vsync_polarity::mask(),
            (u32::from(vsync_polarity) << 6) | (u32::from(hsync_polarity) << 5),
        )?;

        self.curr_mode = *adj;
        self.f_tmds = mode.clock;

        let clock_recovery = CLOCK_RECOVERY_SIZES
            .iter()
            .any(|&(h, v)| mode.is_size(h, v));
        // Shares the HDMI mode bit of the HDCP/HDMI configuration register.
        self.regmap.update_bits(
            main::hdcp_hdmi_cfg::addr(),
            hdcp_hdmi_cfg::mode::mask(),
            if clock_recovery { hdcp_hdmi_cfg::mode::mask() } else { 0 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MAIN_ADDR};

    fn position(writes: &[(u16, u8, u8)], reg: u8, pred: impl Fn(u8) -> bool) -> usize {
        writes
            .iter()
            .position(|&(addr, r, val)| addr == MAIN_ADDR && r == reg && pred(val))
            .unwrap()
    }

    #[test]
    fn csc_decisions() {
        let yuv422 = color_format::RGB444 | color_format::YCRCB422;

        let config = VideoConfig::new(true, yuv422, true);
        assert!(!config.csc_enable);
        assert_eq!(config.colorspace, Colorspace::Rgb);
        assert_eq!(config.output_format(), (false, false));

        let config = VideoConfig::new(false, yuv422, true);
        assert!(!config.csc_enable);
        assert_eq!(config.colorspace, Colorspace::Yuv422);
        assert_eq!(config.output_format(), (true, true));

        let config = VideoConfig::new(false, color_format::RGB444, true);
        assert!(config.csc_enable);
        assert_eq!(config.colorspace, Colorspace::Rgb);

        // A DVI sink never gets YCbCr.
        let config = VideoConfig::new(false, yuv422, false);
        assert!(config.csc_enable);
        assert_eq!(config.output_format(), (false, false));
    }

    #[test]
    fn colormap_is_written_under_hold() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().writes.clear();

        adv.set_config_csc(false).unwrap();

        let chip = adapter.lock_bus();
        assert_eq!(chip.main[0x18], 0xc7);
        assert_eq!(chip.main[0x19], 0x34);
        assert_eq!(chip.main[0x1a] & 0x3f, 0x04);
        assert_eq!(chip.main[0x2f], 0x77);

        let hold = position(&chip.writes, 0x1a, |v| v & 0x20 != 0);
        let enable = position(&chip.writes, 0x18, |v| v & 0x80 != 0);
        let release = position(&chip.writes[hold..], 0x1a, |v| v & 0x20 == 0) + hold;
        assert!(hold < enable && enable < release);

        // No EDID: DVI with RGB output and the AVI packet back on.
        assert_eq!(chip.main[0xaf] & 0x02, 0);
        assert_eq!(chip.main[0x16] & 0x81, 0);
        assert_eq!(chip.main[0x52..0x56], [0x02, 0x0d, 0x6d, 0x02]);
        assert_ne!(chip.main[0x44] & 0x04, 0);
    }

    #[test]
    fn avi_packet_is_disabled_while_updating() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adv.set_config_csc(true).unwrap();
        adapter.lock_bus().writes.clear();

        adv.set_config_csc(true).unwrap();

        let chip = adapter.lock_bus();
        let disable = position(&chip.writes, 0x44, |v| v & 0x04 == 0);
        let infoframe = position(&chip.writes, 0x52, |_| true);
        let enable = position(&chip.writes, 0x44, |v| v & 0x04 != 0);
        assert!(disable < infoframe && infoframe < enable);
        // Disabling the conversion leaves the coefficients alone.
        assert_eq!(chip.writes.iter().filter(|w| w.1 == 0x19).count(), 0);
    }

    #[test]
    fn ycbcr_sink_gets_yuv422() {
        let node = mock::link_node()
            .with_string("adi,input-colorspace", "yuv422")
            .with_int("adi,input-style", 1)
            .with_string("adi,input-justification", "left");
        let (adapter, mut adv) = mock::probe_with("adv7511", node);

        assert_eq!(adv.get_modes().len(), 1);

        let chip = adapter.lock_bus();
        assert_eq!(chip.main[0x18] & 0x80, 0);
        assert_eq!(chip.main[0x16] & 0x81, 0x81);
        assert_ne!(chip.main[0xaf] & 0x02, 0);
        assert_eq!(chip.main[0x55], 0x22);
    }

    #[test]
    fn embedded_sync_timings() {
        let node = mock::link_node().with_bool("adi,embedded-sync");
        let (adapter, mut adv) = mock::probe_with("adv7511", node);

        adv.mode_set(&mock::MODE_720P60, &mock::MODE_720P60).unwrap();

        let chip = adapter.lock_bus();
        assert_eq!(chip.main[0xfa], 0);
        assert_eq!(chip.main[0x30..0x35], [0x1b, 0x82, 0x80, 0x18, 0x05]);
        // Positive syncs are not inverted.
        assert_eq!(chip.main[0x17] & 0x60, 0);
        assert_eq!(*adv.current_mode(), mock::MODE_720P60);
        assert_eq!(adv.tmds_clock(), 74250);
    }

    #[test]
    fn sync_polarity_overrides() {
        let node = mock::link_node().with_string("adi,hsync-polarity", "low");
        let (adapter, mut adv) = mock::probe_with("adv7511", node);

        adv.mode_set(&mock::MODE_720P60, &mock::MODE_720P60).unwrap();
        assert_eq!(adapter.lock_bus().main[0x17] & 0x60, 0x20);

        let mut mode = mock::MODE_720P60;
        mode.flags = flags::NHSYNC | flags::NVSYNC;
        adv.mode_set(&mode, &mode).unwrap();
        assert_eq!(adapter.lock_bus().main[0x17] & 0x60, 0);
    }

    #[test]
    fn refresh_bands() {
        assert_eq!(low_refresh_rate(24), rate::Hz24);
        assert_eq!(low_refresh_rate(25), rate::Hz25);
        assert_eq!(low_refresh_rate(30), rate::Hz30);
        assert_eq!(low_refresh_rate(50), rate::None);

        let (adapter, mut adv) = mock::probe("adv7511");
        let mode_1080p24 = DisplayMode {
            clock: 74250,
            hdisplay: 1920,
            hsync_start: 2558,
            hsync_end: 2602,
            htotal: 2750,
            vdisplay: 1080,
            vsync_start: 1084,
            vsync_end: 1089,
            vtotal: 1125,
            flags: flags::PHSYNC | flags::PVSYNC,
        };

        adv.mode_set(&mode_1080p24, &mode_1080p24).unwrap();
        assert_eq!((adapter.lock_bus().main[0xfb] >> 1) & 0x3, 1);

        adv.mode_set(&mock::MODE_720P60, &mock::MODE_720P60).unwrap();
        assert_eq!((adapter.lock_bus().main[0xfb] >> 1) & 0x3, 0);
    }

    #[test]
    fn clock_recovery_sizes() {
        let (adapter, mut adv) = mock::probe("adv7511");

        adv.mode_set(&mock::MODE_720P60, &mock::MODE_720P60).unwrap();
        assert_ne!(adapter.lock_bus().main[0xaf] & 0x02, 0);

        let mode = DisplayMode {
            hdisplay: 1024,
            vdisplay: 768,
            ..mock::MODE_720P60
        };
        adv.mode_set(&mode, &mode).unwrap();
        assert_eq!(adapter.lock_bus().main[0xaf] & 0x02, 0);
    }

    #[test]
    fn dsi_lanes_follow_the_mode() {
        let (adapter, mut adv) = mock::probe("adv7533");
        let mode = DisplayMode {
            clock: 150000,
            ..mock::MODE_720P60
        };

        adv.mode_set(&mode, &mode).unwrap();

        let chip = adapter.lock_bus();
        assert_eq!(chip.cec[0x1c], 4 << 4);
        assert_eq!(chip.cec[0x16], 3 << 3);
        assert_eq!(chip.main[0xd5], 1);
    }
}
