// SPDX-License-Identifier: GPL-2.0

//! Power sequencing.
//!
//! The chip loses most of its register contents while powered down, so powering up replays
//! the register cache.

use crate::{
    regs::{main, main::power2::hpd_src, INT0_EDID_READY, INT0_HPD, INT1_DDC_ERROR},
    Adv7511,
};
use kernel::{delay::DelayNs, i2c, prelude::*};

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    /// Powers the transmitter up and restores its registers.
    pub fn power_on(&mut self) -> Result {
        self.current_edid_segment = None;

        main::power::power_down::clear(&mut self.regmap)?;

        // Only the HPD pin is a reliable hotplug source while the chip powers up.
        hpd_src::write(&mut self.regmap, hpd_src::Hpd)?;

        if self.irq.is_some() {
            self.regmap
                .write(main::int_enable0::addr(), INT0_HPD | INT0_EDID_READY)?;
            self.regmap
                .write(main::int_enable1::addr(), INT1_DDC_ERROR)?;
        }

        self.regmap.sync()?;
        self.powered = true;

        self.dsi_receiver_dpms()
    }

    /// Powers the transmitter down.
    ///
    /// The register cache is marked dirty: the chip resets its registers the next time the
    /// sink goes away.
    pub fn power_off(&mut self) -> Result {
        main::power::power_down::set(&mut self.regmap)?;
        self.regmap.mark_dirty();
        self.powered = false;

        self.dsi_receiver_dpms()
    }
}

#[cfg(test)]
mod tests {
    use crate::{mock, regs};
    use kernel::regmap::ConfigOps;

    #[test]
    fn power_cycle_restores_registers() {
        let (adapter, mut adv) = mock::probe("adv7511");

        adv.power_off().unwrap();
        adapter.lock_bus().reset();
        adv.power_on().unwrap();
        assert!(adv.is_powered());

        let chip = adapter.lock_bus();
        assert_eq!(chip.main[0x41] & 0x40, 0);
        assert_eq!(chip.main[0xd6] >> 6, 1);

        for reg in 0..=0xffu32 {
            if regs::MainAccess::is_volatile_reg(reg) {
                continue;
            }

            let Some(cached) = adv.regmap.cached(reg) else {
                continue;
            };
            let patched = regs::ADV7511_FIXED_REGISTERS
                .iter()
                .find(|r| r.reg == reg)
                .map(|r| r.def);

            let expected = match patched {
                Some(def) if cached == u32::from(regs::REG_DEFAULTS[reg as usize]) => def,
                _ => cached,
            };
            assert_eq!(u32::from(chip.main[reg as usize]), expected, "{reg:#x}");
        }
    }

    #[test]
    fn interrupts_enabled_with_irq_line() {
        let (adapter, mut adv) = mock::probe_irq("adv7511");
        assert_eq!(adapter.lock_bus().main[0x94], 0);

        adv.power_on().unwrap();
        let chip = adapter.lock_bus();
        assert_eq!(chip.main[0x94], 0x84);
        assert_eq!(chip.main[0x95], 0x80);
    }

    #[test]
    fn sync_is_skipped_when_clean() {
        let (adapter, mut adv) = mock::probe("adv7511");

        adv.power_on().unwrap();
        adapter.lock_bus().writes.clear();
        adv.power_on().unwrap();

        assert!(adapter.lock_bus().writes.is_empty());
    }
}
