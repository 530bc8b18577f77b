// SPDX-License-Identifier: GPL-2.0

//! ADV7533 DSI receiver.

use crate::{
    regs::{cec, main},
    Adv7511,
};
use kernel::{bits::field_prep, delay::DelayNs, i2c, prelude::*};

/// Pixel clock above which four lanes are needed, in kHz.
const FOUR_LANES_MIN_CLOCK: u32 = 115000;

/// Pixel clock divider for 2, 3 and 4 lanes.
const CLOCK_DIV_BY_LANES: [u32; 3] = [6, 4, 3];

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    /// Brings the DSI receiver in line with the power state.
    ///
    /// Powered up, the HDMI side is enabled and the receiver released from reset. Powered
    /// down, video is blanked and the receiver held in reset.
    pub(crate) fn dsi_receiver_dpms(&mut self) -> Result {
        if !self.info.has_dsi_receiver {
            return Ok(());
        }

        if self.powered {
            // Internal timing generator off, HDMI on, test mode off.
            self.regmap_cec.write(cec::timing_gen::addr(), 0x0b)?;
            self.regmap_cec.write(cec::hdmi_ctrl::addr(), 0x89)?;
            self.regmap_cec.write(cec::test_mode::addr(), 0x00)?;

            main::dsi_ctrl::dsi_enable::clear(&mut self.regmap)?;
            main::dsi_ctrl::dsi_enable::set(&mut self.regmap)?;

            self.regmap.write(main::blank::addr(), 0)?;
        } else {
            self.regmap
                .write(main::blank::addr(), main::blank::black::mask())?;
            self.regmap_cec.write(cec::hdmi_ctrl::addr(), 0x0b)?;
            self.regmap_cec.write(cec::timing_gen::addr(), 0x0b)?;

            main::dsi_ctrl::dsi_enable::set(&mut self.regmap)?;
        }

        Ok(())
    }

    /// Picks the lane count and clock divider for a pixel clock of `clock` kHz.
    ///
    /// Does nothing when the lane count is fixed by the board.
    pub(crate) fn dsi_config_lanes(&mut self, clock: u32) -> Result {
        if self.num_dsi_lanes != 0 {
            return Ok(());
        }

        let lanes: u32 = if clock > FOUR_LANES_MIN_CLOCK { 4 } else { 3 };

        self.regmap_cec.write(
            cec::dsi_lanes::addr(),
            field_prep(cec::dsi_lanes::lanes::mask(), lanes),
        )?;
        self.regmap_cec.write(
            cec::clock_div::addr(),
            field_prep(
                cec::clock_div::div::mask(),
                CLOCK_DIV_BY_LANES[lanes as usize - 2],
            ),
        )
    }

    /// Recovers the DSI receiver after an error reported with interrupt status `irq0`/`irq1`.
    ///
    /// The receiver interrupt is masked so recovery happens once, then its state is cleared.
    /// A 720p link is also reset on the source side.
    pub(crate) fn dsi_rx_recovery(&mut self, irq0: u32, irq1: u32) -> Result {
        let state = self.regmap_cec.read(cec::dsi_int_status::addr())?;

        if !self.powered || (irq1 != 0 && state & cec::dsi_int_status::rx_error::mask() == 0) {
            return Ok(());
        }

        dev_info!(
            self.dev,
            "DSI RX error: status {:#04x}, irq0 {:#04x}, irq1 {:#04x}\n",
            state,
            irq0,
            irq1
        );

        cec::dsi_int_ctrl::enable::clear(&mut self.regmap_cec)?;
        cec::dsi_int_ctrl::rx_clear::set(&mut self.regmap_cec)?;
        cec::dsi_int_ctrl::rx_clear::clear(&mut self.regmap_cec)?;

        if self.curr_mode.is_size(1280, 720) {
            if let Some(pipeline) = self.pipeline.as_mut() {
                pipeline.dsi_reset();
            }
        }

        Ok(())
    }
}
