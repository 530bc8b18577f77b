// SPDX-License-Identifier: GPL-2.0

//! EDID retrieval.
//!
//! The chip reads the sink's EDID over DDC into a 256 byte shadow memory, one segment of two
//! blocks at a time, which is then read back through the EDID client.

use crate::{
    regs::{main, main::power2::hpd_src, DDC_STATUS_DONE},
    Adv7511,
};
use kernel::{
    delay::DelayNs,
    drm::{
        edid::{self, Edid, EDID_LENGTH},
        mode::DisplayMode,
    },
    i2c::{self, Operation},
    prelude::*,
    sync::{CondVar, Mutex},
};
use std::time::Duration;

const DDC_POLL_ATTEMPTS: u32 = 100;
const DDC_POLL_INTERVAL_MS: u32 = 10;

/// Shadow memory read size, kept small for bus controllers with short transfer limits.
const EDID_CHUNK_SIZE: usize = 64;

/// EDID readiness, raised by the interrupt handler.
#[derive(Debug, Default)]
pub struct EdidWait {
    ready: Mutex<bool>,
    cond: CondVar,
}

impl EdidWait {
    pub(crate) fn clear(&self) {
        *self.ready.lock() = false;
    }

    /// Marks the EDID as ready, waking the waiters if `wake` is set.
    pub(crate) fn complete(&self, wake: bool) {
        *self.ready.lock() = true;

        if wake {
            self.cond.notify_all();
        }
    }

    /// Returns whether the EDID was reported ready since the last segment change.
    pub fn is_ready(&self) -> bool {
        *self.ready.lock()
    }

    /// Blocks until the EDID is ready, failing with `ETIMEDOUT` after `timeout`.
    pub fn wait_for_edid(&self, timeout: Duration) -> Result {
        let guard = self.ready.lock();
        let (_guard, ready) = self.cond.wait_timeout(guard, timeout, |ready| *ready);

        if !ready {
            return Err(ETIMEDOUT);
        }

        Ok(())
    }
}

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    fn wait_ddc_done(&mut self) -> Result {
        for attempt in 0..DDC_POLL_ATTEMPTS {
            if attempt > 0 {
                self.delay.delay_ms(DDC_POLL_INTERVAL_MS);
            }

            if self.regmap.read(main::ddc_status::addr())? == DDC_STATUS_DONE {
                return Ok(());
            }
        }

        dev_err!(self.dev, "timeout waiting for EDID segment\n");
        Err(ETIMEDOUT)
    }

    /// Copies EDID block `block` into `buf`, loading its segment first if needed.
    pub(crate) fn get_edid_block(&mut self, buf: &mut [u8], block: u32) -> Result {
        if buf.len() > EDID_LENGTH {
            return Err(EINVAL);
        }

        let segment = block / 2;
        if self.current_edid_segment != Some(segment) {
            self.current_edid_segment = None;
            self.edid_wait.clear();

            self.regmap.write(main::edid_segment::addr(), segment)?;
            self.wait_ddc_done()?;

            for (i, chunk) in self.edid_buf.chunks_mut(EDID_CHUNK_SIZE).enumerate() {
                let offset = [(i * EDID_CHUNK_SIZE) as u8];

                let ret = self
                    .i2c_edid
                    .transfer(&mut [Operation::Write(&offset), Operation::Read(chunk)])?;
                if ret != 2 {
                    return Err(EIO);
                }
            }

            self.current_edid_segment = Some(segment);
        }

        let start = (block % 2) as usize * EDID_LENGTH;
        buf.copy_from_slice(&self.edid_buf[start..start + buf.len()]);

        Ok(())
    }

    fn fetch_edid(&mut self) -> Result<Edid> {
        let powered = self.powered;

        // DDC only works with the chip powered up.
        if !powered {
            hpd_src::write(&mut self.regmap, hpd_src::Hpd)?;
            main::power::power_down::clear(&mut self.regmap)?;
            self.current_edid_segment = None;
        }

        let edid = edid::do_get_edid(|buf, block| self.get_edid_block(buf, block));

        if !powered {
            main::power::power_down::set(&mut self.regmap)?;
        }

        edid
    }

    /// Reads the sink's EDID and returns the modes it lists.
    ///
    /// The output colorspace conversion is configured for the sink. A sink without a readable
    /// EDID yields no modes.
    pub fn get_modes(&mut self) -> Vec<DisplayMode> {
        let edid = match self.fetch_edid() {
            Ok(edid) => edid,
            Err(e) => {
                dev_dbg!(self.dev, "no EDID: {:?}\n", e);
                self.edid = None;
                return Vec::new();
            }
        };

        self.display_info = edid.display_info();
        let modes = edid.modes();
        self.edid = Some(edid);

        if let Err(e) = self.set_config_csc(self.rgb) {
            dev_err!(self.dev, "failed to configure output colorspace: {:?}\n", e);
        }

        modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, EDID_ADDR};
    use kernel::{drm::connector::color_format, sync::Arc};
    use std::thread;

    #[test]
    fn segment_is_loaded_once() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adv.power_on().unwrap();
        let mut buf = [0u8; EDID_LENGTH];

        adv.get_edid_block(&mut buf, 0).unwrap();
        adv.get_edid_block(&mut buf, 1).unwrap();
        assert_eq!(adapter.lock_bus().transfers_to(EDID_ADDR), 4);
        assert_eq!(buf[..], adapter.lock_bus().edid[128..256]);

        adv.get_edid_block(&mut buf, 1).unwrap();
        assert_eq!(adapter.lock_bus().transfers_to(EDID_ADDR), 4);
    }

    #[test]
    fn segment_change_reloads() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().edid = mock::edid(4, true, false);
        adv.power_on().unwrap();
        let mut buf = [0u8; EDID_LENGTH];

        adv.get_edid_block(&mut buf, 1).unwrap();
        adv.get_edid_block(&mut buf, 2).unwrap();
        let chip = adapter.lock_bus();
        assert_eq!(chip.transfers_to(EDID_ADDR), 8);
        assert_eq!(chip.main[0xc4], 1);
        assert_eq!(buf[..], chip.edid[256..384]);
    }

    #[test]
    fn ddc_poll_times_out() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().ddc_status = 1;
        adv.power_on().unwrap();
        let mut buf = [0u8; EDID_LENGTH];

        assert_eq!(adv.get_edid_block(&mut buf, 0), Err(ETIMEDOUT));
        assert_eq!(adapter.lock_bus().reads[0xc8], 100);
        assert_eq!(adv.delay.sleeps(), 99);
        assert_eq!(adapter.lock_bus().transfers_to(EDID_ADDR), 0);
        assert_eq!(adv.current_edid_segment, None);
    }

    #[test]
    fn ddc_status_is_matched_whole() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().ddc_status = 0x12;
        adv.power_on().unwrap();
        let mut buf = [0u8; EDID_LENGTH];

        assert_eq!(adv.get_edid_block(&mut buf, 0), Err(ETIMEDOUT));
        assert_eq!(adapter.lock_bus().transfers_to(EDID_ADDR), 0);
    }

    #[test]
    fn short_transfer_is_an_io_error() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().short_edid = true;
        adv.power_on().unwrap();
        let mut buf = [0u8; EDID_LENGTH];

        assert_eq!(adv.get_edid_block(&mut buf, 0), Err(EIO));
        assert_eq!(adapter.lock_bus().transfers_to(EDID_ADDR), 1);
        assert_eq!(adv.current_edid_segment, None);
    }

    #[test]
    fn failed_segment_load_drops_the_cached_one() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().edid = mock::edid(4, true, false);
        adv.power_on().unwrap();
        let mut buf = [0u8; EDID_LENGTH];

        adv.get_edid_block(&mut buf, 0).unwrap();
        adapter.lock_bus().short_edid = true;
        assert_eq!(adv.get_edid_block(&mut buf, 2), Err(EIO));
        assert_eq!(adv.current_edid_segment, None);

        adapter.lock_bus().short_edid = false;
        adv.get_edid_block(&mut buf, 0).unwrap();
        let chip = adapter.lock_bus();
        assert_eq!(chip.main[0xc4], 0);
        assert_eq!(buf[..], chip.edid[..128]);
    }

    #[test]
    fn oversized_request() {
        let (_adapter, mut adv) = mock::probe("adv7511");

        assert_eq!(adv.get_edid_block(&mut [0u8; 129], 0), Err(EINVAL));
    }

    #[test]
    fn modes_read_while_powered_down() {
        let (adapter, mut adv) = mock::probe("adv7511");

        assert_eq!(adv.get_modes(), [mock::MODE_720P60]);
        assert!(!adv.is_powered());
        assert_ne!(adapter.lock_bus().main[0x41] & 0x40, 0);

        let edid = adv.edid().unwrap();
        assert!(edid.is_hdmi_monitor());
        assert_eq!(edid.extension_count(), 1);
        assert_ne!(adv.display_info().color_formats & color_format::YCRCB422, 0);
    }

    #[test]
    fn unreadable_edid_yields_no_modes() {
        let (adapter, mut adv) = mock::probe("adv7511");
        assert!(!adv.get_modes().is_empty());

        adapter.lock_bus().edid = vec![0; 256];
        adv.power_off().unwrap();
        assert!(adv.get_modes().is_empty());
        assert!(adv.edid().is_none());
        assert_ne!(adapter.lock_bus().main[0x41] & 0x40, 0);
    }

    #[test]
    fn waiter_is_woken() {
        let wait = Arc::new(EdidWait::default());
        let waiter = {
            let wait = wait.clone();
            thread::spawn(move || wait.wait_for_edid(Duration::from_secs(10)))
        };

        wait.complete(true);
        assert_eq!(waiter.join().unwrap(), Ok(()));
        assert!(wait.is_ready());

        wait.clear();
        assert_eq!(wait.wait_for_edid(Duration::from_millis(10)), Err(ETIMEDOUT));
    }
}
