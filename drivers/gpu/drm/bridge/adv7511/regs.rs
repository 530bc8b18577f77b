// SPDX-License-Identifier: GPL-2.0

//! Register layout of the ADV7511 main and CEC/DSI maps.

use kernel::regmap::{self, ConfigOps, RegSequence};

// Field layout only. The map is configured with `MainAccess`, which also covers the registers
// not described here.
regmap::define_regmap_field_descs!(pub main, {
    (chip_revision, 0x00, READ | VOLATILE, { value => raw([7:0], ro) }),
    (i2c_freq_id_cfg, 0x15, RW, { input_id => raw([3:0], rw) }),
    (video_input_cfg1, 0x16, RW, {
        ycbcr  => bit(0, rw),
        style  => raw([3:2], rw),
        depth  => raw([5:4], rw),
        yuv422 => bit(7, rw),
    }),
    (video_input_cfg_sync, 0x17, RW, {
        hsync_polarity => bit(5, rw),
        vsync_polarity => bit(6, rw),
    }),
    (csc_ctrl, 0x18, RW, {
        scaling => raw([6:5], rw),
        enable  => bit(7, rw),
    }),
    (csc_update, 0x1a, RW, { hold => bit(5, rw) }),
    (dsi_ctrl, 0x26, RW, { dsi_enable => bit(5, rw) }),
    (sync_decoder0, 0x30, RW, {}),
    (packet_enable0, 0x40, RW, {}),
    (power, 0x41, RW, { power_down => bit(6, rw) }),
    (status, 0x42, READ | VOLATILE, { hpd => bit(6, ro) }),
    (edid_i2c_addr, 0x43, RW, {}),
    (packet_enable1, 0x44, RW, {}),
    (packet_i2c_addr, 0x45, RW, {}),
    (video_input_cfg2, 0x48, RW, {
        justification => enum([4:3], rw, {
            Evenly = 0x0,
            Right = 0x1,
            Left = 0x2,
        }),
    }),
    (avi_infoframe_version, 0x52, RW, {}),
    (int_enable0, 0x94, RW, {
        edid_ready => bit(2, rw),
        hpd        => bit(7, rw),
    }),
    (int_enable1, 0x95, RW, { ddc_error => bit(7, rw) }),
    (int0, 0x96, RW | VOLATILE, {
        edid_ready => bit(2, rw),
        hpd        => bit(7, rw),
    }),
    (int1, 0x97, RW | VOLATILE, { ddc_error => bit(7, rw) }),
    (hdcp_hdmi_cfg, 0xaf, RW, {
        mode => enum([1:1], rw, {
            Dvi = 0x0,
            Hdmi = 0x1,
        }),
    }),
    (clock_delay, 0xba, RW, { delay => raw([7:5], rw) }),
    (edid_segment, 0xc4, RW | VOLATILE, {}),
    (ddc_status, 0xc8, READ | VOLATILE, {}),
    (timing_gen_seq, 0xd0, RW, { sync_pulse => raw([3:2], rw) }),
    (blank, 0xd5, RW, { black => bit(0, rw) }),
    (power2, 0xd6, RW, {
        hpd_src => enum([7:6], rw, {
            Both = 0x0,
            Hpd = 0x1,
            Cec = 0x2,
            None = 0x3,
        }),
    }),
    (cec_i2c_addr, 0xe1, RW, {}),
    (cec_ctrl, 0xe2, RW, { power_down => bit(0, rw) }),
    (hsync_placement_msb, 0xfa, RW, {}),
    (low_refresh, 0xfb, RW, {
        rate => enum([2:1], rw, {
            None = 0x0,
            Hz24 = 0x1,
            Hz25 = 0x2,
            Hz30 = 0x3,
        }),
    }),
});

regmap::define_regmap_field_descs!(pub cec, {
    (hdmi_ctrl, 0x03, RW, {}),
    (dsi_ctrl5, 0x05, RW, {}),
    (dsi_ctrl15, 0x15, RW, {}),
    (clock_div, 0x16, RW, { div => raw([5:3], rw) }),
    (dsi_ctrl17, 0x17, RW, {}),
    (dsi_lanes, 0x1c, RW, { lanes => raw([6:4], rw) }),
    (dsi_ctrl24, 0x24, RW, {}),
    (timing_gen, 0x27, RW, {}),
    (dsi_int_ctrl, 0x38, RW, {
        rx_clear => bit(1, rw),
        enable   => bit(4, rw),
    }),
    (dsi_int_status, 0x48, READ | VOLATILE, { rx_error => bit(2, ro) }),
    (test_mode, 0x55, RW, {}),
    (dsi_ctrl57, 0x57, RW, {}),
});

/// Sync decoder register `n`, 0 to 4.
pub(crate) const fn sync_decoder(n: u32) -> u32 {
    main::sync_decoder0::addr() + n
}

/// Upper byte of CSC coefficient `n`.
pub(crate) const fn csc_upper(n: u32) -> u32 {
    main::csc_ctrl::addr() + n * 2
}

/// Lower byte of CSC coefficient `n`.
pub(crate) const fn csc_lower(n: u32) -> u32 {
    main::csc_ctrl::addr() + n * 2 + 1
}

pub(crate) const INT0_HPD: u32 = 1 << 7;
pub(crate) const INT0_EDID_READY: u32 = 1 << 2;
pub(crate) const INT1_DDC_ERROR: u32 = 1 << 7;

/// DDC controller state once a segment was transferred into the shadow memory.
pub(crate) const DDC_STATUS_DONE: u32 = 2;

pub(crate) const PACKET_ENABLE_AVI_INFOFRAME: u32 = 1 << 10;

/// Chip registers without a usable cached value: status, interrupt, DDC and HDCP state.
const VOLATILE_REGS: &[u32] = &[
    0x00, 0x04, 0x05, 0x06, 0x3d, 0x3e, 0x3f, 0x42, 0x4c, 0x96, 0x97, 0x9e, 0xb0, 0xb1, 0xb2,
    0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xbe, 0xc0, 0xc1, 0xc2, 0xc3, 0xc4, 0xc8, 0xca, 0xcb,
    0xf5, 0xf6,
];

const fn volatile_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;

    while i < VOLATILE_REGS.len() {
        table[VOLATILE_REGS[i] as usize] = true;
        i += 1;
    }

    table
}

static VOLATILE: [bool; 256] = volatile_table();

/// Access rules of the main map: every register is readable and writeable.
pub(crate) struct MainAccess;

impl ConfigOps for MainAccess {
    fn is_readable_reg(reg: u32) -> bool {
        reg <= 0xff
    }

    fn is_writeable_reg(reg: u32) -> bool {
        reg <= 0xff
    }

    fn is_volatile_reg(reg: u32) -> bool {
        VOLATILE.get(reg as usize).copied().unwrap_or(false)
    }

    fn is_precious_reg(_reg: u32) -> bool {
        false
    }
}

/// Power-on values of the main map.
#[rustfmt::skip]
pub(crate) static REG_DEFAULTS: [u8; 256] = [
    0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x0e, 0xbc, 0x18, 0x01, 0x13,
    0x25, 0x37, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46, 0x62, 0x04, 0xa8, 0x00, 0x00, 0x1c, 0x84,
    0x1c, 0xbf, 0x04, 0xa8, 0x1e, 0x70, 0x02, 0x1e,
    0x00, 0x00, 0x04, 0xa8, 0x08, 0x12, 0x1b, 0xac,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0xb0,
    0x00, 0x50, 0x90, 0x7e, 0x79, 0x70, 0x00, 0x00,
    0x00, 0xa8, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x0d, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xc0, 0x00, 0x00, 0x00,
    0x0b, 0x02, 0x00, 0x18, 0x5a, 0x60, 0x00, 0x00,
    0x00, 0x00, 0x80, 0x80, 0x08, 0x04, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x40, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x03, 0x00, 0x00, 0x02, 0x00, 0x01, 0x04,
    0x30, 0xff, 0x80, 0x80, 0x80, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x01,
    0x80, 0x75, 0x00, 0x00, 0x60, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x75, 0x11, 0x00,
    0x00, 0x7c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

pub(crate) const ADV7511_FIXED_REGISTERS: [RegSequence; 9] = [
    RegSequence::new(0x98, 0x03),
    RegSequence::new(0x9a, 0xe0),
    RegSequence::new(0x9c, 0x30),
    RegSequence::new(0x9d, 0x61),
    RegSequence::new(0xa2, 0xa4),
    RegSequence::new(0xa3, 0xa4),
    RegSequence::new(0xe0, 0xd0),
    RegSequence::new(0xf9, 0x00),
    RegSequence::new(0x55, 0x02),
];

pub(crate) const ADV7533_FIXED_REGISTERS: [RegSequence; 6] = [
    RegSequence::new(0x16, 0x20),
    RegSequence::new(0x9a, 0xe0),
    RegSequence::new(0xba, 0x70),
    RegSequence::new(0xde, 0x82),
    RegSequence::new(0xe4, 0x40),
    RegSequence::new(0xe5, 0x80),
];

pub(crate) const ADV7533_CEC_FIXED_REGISTERS: [RegSequence; 5] = [
    RegSequence::new(0x15, 0xd0),
    RegSequence::new(0x17, 0xd0),
    RegSequence::new(0x24, 0x20),
    RegSequence::new(0x57, 0x11),
    RegSequence::new(0x05, 0xc8),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatile_table() {
        for reg in [0x00, 0x42, 0x96, 0x97, 0xb4, 0xc4, 0xc8, 0xf6] {
            assert!(MainAccess::is_volatile_reg(reg), "{reg:#x}");
        }
        for reg in [0x15, 0x16, 0x41, 0x94, 0xaf, 0xd6, 0xff] {
            assert!(!MainAccess::is_volatile_reg(reg), "{reg:#x}");
        }
        assert!(!MainAccess::is_readable_reg(0x100));
    }

    #[test]
    fn field_flags_agree_with_access_table() {
        for reg in 0..=0xff {
            if main::AccessOps::is_volatile_reg(reg) {
                assert!(MainAccess::is_volatile_reg(reg), "{reg:#x}");
            }
            if main::AccessOps::is_readable_reg(reg) || main::AccessOps::is_writeable_reg(reg) {
                assert!(MainAccess::is_readable_reg(reg), "{reg:#x}");
            }
        }
    }

    #[test]
    fn register_helpers() {
        assert_eq!(csc_upper(1), 0x1a);
        assert_eq!(csc_lower(11), 0x2f);
        assert_eq!(sync_decoder(4), 0x34);
        assert_eq!(main::power2::hpd_src::Hpd as u32, 0x1);
        assert_eq!(cec::dsi_int_status::addr(), 0x48);
    }
}
