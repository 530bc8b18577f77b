// SPDX-License-Identifier: GPL-2.0

//! Hotplug detection.

use crate::{
    regs::{main, main::power2::hpd_src, INT0_HPD},
    Adv7511,
};
use kernel::{delay::DelayNs, device::Device, drm::connector::ConnectorStatus, i2c, prelude::*};

/// How the presence of a sink is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HpdPolicy {
    /// Trust the HPD status read from the chip.
    #[default]
    Bus,
    /// Report a sink as always connected, for boards where HPD is not wired reliably.
    Forced,
}

impl HpdPolicy {
    /// Selects the policy from the `adi,force-hpd` property of `dev`.
    pub fn from_device(dev: &Device) -> Self {
        if dev.property_read_bool("adi,force-hpd") {
            dev_info!(dev, "HPD forced, sink always reported connected\n");
            return HpdPolicy::Forced;
        }

        HpdPolicy::Bus
    }
}

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    /// Consumes a latched HPD interrupt, returning whether there was one.
    fn hpd(&mut self) -> Result<bool> {
        let irq0 = self.regmap.read(main::int0::addr())?;

        if irq0 & INT0_HPD == 0 {
            return Ok(false);
        }

        self.regmap.write(main::int0::addr(), INT0_HPD)?;
        Ok(true)
    }

    /// Determines whether a sink is connected.
    ///
    /// A failed status read reports the sink as disconnected without recording it.
    pub fn detect(&mut self) -> ConnectorStatus {
        let status = match self.hpd_policy {
            HpdPolicy::Forced => ConnectorStatus::Connected,
            HpdPolicy::Bus => match self.bus_status() {
                Ok(status) => status,
                Err(_) => return ConnectorStatus::Disconnected,
            },
        };

        self.status = status;
        status
    }

    fn bus_status(&mut self) -> Result<ConnectorStatus> {
        let mut status = if main::status::hpd::is_set(&mut self.regmap)? {
            ConnectorStatus::Connected
        } else {
            ConnectorStatus::Disconnected
        };

        let hpd = self.hpd().unwrap_or(false);

        // The chip resets itself when the sink goes away. A pending HPD interrupt with the sink
        // present means it came back: restore the chip and have the caller probe again.
        if status == ConnectorStatus::Connected && hpd && self.powered {
            self.regmap.mark_dirty();
            if let Err(e) = self.power_on() {
                dev_err!(self.dev, "failed to restore registers: {:?}\n", e);
            }
            self.get_modes();

            if self.status == ConnectorStatus::Connected {
                status = ConnectorStatus::Disconnected;
            }
        } else if let Err(e) = hpd_src::write(&mut self.regmap, hpd_src::Both) {
            dev_err!(self.dev, "failed to re-enable HPD sensing: {:?}\n", e);
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MAIN_ADDR};

    #[test]
    fn status_follows_hpd() {
        let (adapter, mut adv) = mock::probe("adv7511");

        assert_eq!(adv.detect(), ConnectorStatus::Disconnected);

        adapter.lock_bus().hpd = true;
        assert_eq!(adv.detect(), ConnectorStatus::Connected);
        assert_eq!(adv.status(), ConnectorStatus::Connected);
        // Sensing switched back to both sources.
        assert_eq!(adapter.lock_bus().main[0xd6] >> 6, 0);
    }

    #[test]
    fn status_is_read_every_time() {
        let (adapter, mut adv) = mock::probe("adv7511");

        adv.detect();
        adv.detect();
        assert_eq!(adapter.lock_bus().reads[0x42], 2);
    }

    #[test]
    fn reconnect_while_powered_forces_a_probe() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().hpd = true;
        adv.power_on().unwrap();
        assert_eq!(adv.detect(), ConnectorStatus::Connected);

        {
            let mut chip = adapter.lock_bus();
            chip.reset();
            chip.main[0x96] |= 0x80;
            chip.writes.clear();
        }

        assert_eq!(adv.detect(), ConnectorStatus::Disconnected);
        {
            let chip = adapter.lock_bus();
            // The interrupt was consumed and the registers restored.
            assert_eq!(chip.main[0x96] & 0x80, 0);
            assert!(chip.wrote(MAIN_ADDR, 0xe2));
            assert_eq!(chip.main[0x16], 0x38);
        }
        assert!(adv.edid().is_some());

        assert_eq!(adv.detect(), ConnectorStatus::Connected);
    }

    #[test]
    fn pending_hpd_without_power_is_consumed() {
        let (adapter, mut adv) = mock::probe("adv7511");
        {
            let mut chip = adapter.lock_bus();
            chip.hpd = true;
            chip.main[0x96] |= 0x80;
        }

        assert_eq!(adv.detect(), ConnectorStatus::Connected);
        assert_eq!(adapter.lock_bus().main[0x96] & 0x80, 0);
        assert!(adv.edid().is_none());
    }

    #[test]
    fn bus_errors_report_disconnected() {
        let (adapter, mut adv) = mock::probe("adv7511");
        adapter.lock_bus().hpd = true;
        adv.detect();

        adapter.lock_bus().fail = Some(MAIN_ADDR);
        assert_eq!(adv.detect(), ConnectorStatus::Disconnected);
        assert_eq!(adv.status(), ConnectorStatus::Connected);
    }

    #[test]
    fn forced_policy_skips_the_bus() {
        let node = mock::link_node().with_bool("adi,force-hpd");
        let (adapter, mut adv) = mock::probe_with("adv7511", node);

        assert_eq!(adv.detect(), ConnectorStatus::Connected);
        assert_eq!(adapter.lock_bus().reads[0x42], 0);
    }
}
