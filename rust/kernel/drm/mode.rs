// SPDX-License-Identifier: GPL-2.0

//! Display modes.
//!
//! C header: [`include/drm/drm_modes.h`](srctree/include/drm/drm_modes.h)

/// Mode flags, as bits of [`DisplayMode::flags`].
pub mod flags {
    /// Positive horizontal sync.
    pub const PHSYNC: u32 = 1 << 0;
    /// Negative horizontal sync.
    pub const NHSYNC: u32 = 1 << 1;
    /// Positive vertical sync.
    pub const PVSYNC: u32 = 1 << 2;
    /// Negative vertical sync.
    pub const NVSYNC: u32 = 1 << 3;
    /// Interlaced scan.
    pub const INTERLACE: u32 = 1 << 4;
}

/// A display mode: pixel clock and timings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayMode {
    /// Pixel clock in kHz.
    pub clock: u32,
    pub hdisplay: u32,
    pub hsync_start: u32,
    pub hsync_end: u32,
    pub htotal: u32,
    pub vdisplay: u32,
    pub vsync_start: u32,
    pub vsync_end: u32,
    pub vtotal: u32,
    /// See [`flags`].
    pub flags: u32,
}

impl DisplayMode {
    /// Returns the vertical refresh rate in Hz, rounded to the closest integer.
    ///
    /// Equivalent to `drm_mode_vrefresh()`.
    pub fn vrefresh(&self) -> u32 {
        if self.htotal == 0 || self.vtotal == 0 {
            return 0;
        }

        let mut num = u64::from(self.clock) * 1000;
        let den = u64::from(self.htotal) * u64::from(self.vtotal);

        if self.flags & flags::INTERLACE != 0 {
            num *= 2;
        }

        ((num + den / 2) / den) as u32
    }

    /// Returns whether the mode has the given active size.
    pub fn is_size(&self, hdisplay: u32, vdisplay: u32) -> bool {
        self.hdisplay == hdisplay && self.vdisplay == vdisplay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODE_720P60: DisplayMode = DisplayMode {
        clock: 74250,
        hdisplay: 1280,
        hsync_start: 1390,
        hsync_end: 1430,
        htotal: 1650,
        vdisplay: 720,
        vsync_start: 725,
        vsync_end: 730,
        vtotal: 750,
        flags: flags::PHSYNC | flags::PVSYNC,
    };

    #[test]
    fn refresh_rates() {
        assert_eq!(MODE_720P60.vrefresh(), 60);

        let mode_1080p24 = DisplayMode {
            clock: 74250,
            hdisplay: 1920,
            htotal: 2750,
            vdisplay: 1080,
            vtotal: 1125,
            ..Default::default()
        };
        assert_eq!(mode_1080p24.vrefresh(), 24);
        assert_eq!(DisplayMode::default().vrefresh(), 0);
        assert!(MODE_720P60.is_size(1280, 720));
    }
}
