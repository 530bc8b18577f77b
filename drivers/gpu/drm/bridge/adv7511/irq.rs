// SPDX-License-Identifier: GPL-2.0

//! Interrupt handling.

use crate::{
    regs::{main, INT0_EDID_READY, INT0_HPD, INT1_DDC_ERROR},
    Adv7511,
};
use kernel::{delay::DelayNs, i2c, irq::IrqReturn, prelude::*};

impl<A: i2c::Algorithm, D: DelayNs> Adv7511<A, D> {
    /// Services the interrupt line.
    ///
    /// The status bits are left latched, the HPD one is consumed by [`Adv7511::detect`].
    pub fn irq_handler(&mut self) -> IrqReturn {
        match self.irq_process() {
            Ok(()) => IrqReturn::Handled,
            Err(_) => IrqReturn::None,
        }
    }

    fn irq_process(&mut self) -> Result {
        let irq0 = self.regmap.read(main::int0::addr())?;
        let irq1 = self.regmap.read(main::int1::addr())?;

        if irq0 & INT0_HPD != 0 {
            if let Some(pipeline) = self.pipeline.as_mut() {
                pipeline.hotplug_event();
            }
        }

        if irq0 & INT0_EDID_READY != 0 || irq1 & INT1_DDC_ERROR != 0 {
            self.edid_wait.complete(self.irq.is_some());
        }

        if self.info.has_dsi_receiver {
            self.dsi_rx_recovery(irq0, irq1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, CEC_ADDR, MAIN_ADDR};

    #[test]
    fn hotplug_is_forwarded() {
        let (adapter, mut adv) = mock::probe_irq("adv7511");
        let events = mock::Events::default();
        adv.attach(Box::new(events.clone()));

        assert_eq!(adv.irq_handler(), IrqReturn::Handled);
        assert_eq!(events.hotplug(), 1);

        adapter.lock_bus().main[0x96] = 0x80;
        assert_eq!(adv.irq_handler(), IrqReturn::Handled);
        assert_eq!(events.hotplug(), 2);
        assert_eq!(adapter.lock_bus().main[0x96], 0x80);
    }

    #[test]
    fn edid_ready_and_ddc_error_complete_the_wait() {
        let (adapter, mut adv) = mock::probe_irq("adv7511");
        let wait = adv.edid_waiter();

        adv.irq_handler();
        assert!(!wait.is_ready());

        adapter.lock_bus().main[0x96] = 0x04;
        adv.irq_handler();
        assert!(wait.is_ready());

        wait.clear();
        adapter.lock_bus().main[0x96] = 0;
        adapter.lock_bus().main[0x97] = 0x80;
        adv.irq_handler();
        assert!(wait.is_ready());
    }

    #[test]
    fn bus_errors_are_not_handled() {
        let (adapter, mut adv) = mock::probe_irq("adv7511");

        adapter.lock_bus().fail = Some(MAIN_ADDR);
        assert_eq!(adv.irq_handler(), IrqReturn::None);
    }

    #[test]
    fn dsi_errors_reset_a_720p_link() {
        let (adapter, mut adv) = mock::probe_irq("adv7533");
        let events = mock::Events::default();
        adv.attach(Box::new(events.clone()));
        adv.power_on().unwrap();
        adv.mode_set(&mock::MODE_720P60, &mock::MODE_720P60).unwrap();

        {
            let mut chip = adapter.lock_bus();
            chip.cec[0x48] = 0x04;
            chip.main[0x97] = 0x80;
        }
        assert_eq!(adv.irq_handler(), IrqReturn::Handled);
        assert_eq!(events.dsi_reset(), 1);
        assert_eq!(adapter.lock_bus().cec[0x38] & 0x10, 0);
    }

    #[test]
    fn dsi_status_failure_is_not_handled() {
        let (adapter, mut adv) = mock::probe_irq("adv7533");
        adv.power_on().unwrap();

        adapter.lock_bus().fail = Some(CEC_ADDR);
        assert_eq!(adv.irq_handler(), IrqReturn::None);
    }

    #[test]
    fn adv7511_has_no_dsi_recovery() {
        let (adapter, mut adv) = mock::probe_irq("adv7511");
        adv.power_on().unwrap();

        adv.irq_handler();
        assert_eq!(adapter.lock_bus().transfers_to(CEC_ADDR), 0);
    }
}
