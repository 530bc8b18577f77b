// SPDX-License-Identifier: GPL-2.0

//! Register-level model of an ADV7511 for the driver tests.

use crate::{regs::REG_DEFAULTS, Adv7511, DisplayPipeline};
use kernel::{
    delay::DelayNs,
    drm::mode::{flags, DisplayMode},
    fwnode::FwNode,
    i2c::{self, Operation},
    prelude::*,
};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

pub(crate) const MAIN_ADDR: u16 = 0x39;
pub(crate) const CEC_ADDR: u16 = 0x3c;
pub(crate) const EDID_ADDR: u16 = 0x3f;

pub(crate) const MODE_720P60: DisplayMode = DisplayMode {
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

const DTD_720P: [u8; 18] = [
    0x01, 0x1d, 0x00, 0x72, 0x51, 0xd0, 0x1e, 0x20, 0x6e, 0x28, 0x55, 0x00, 0xc4, 0x8e, 0x21, 0x00,
    0x00, 0x1e,
];

fn fix_checksum(block: &mut [u8]) {
    let sum = block[..127].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    block[127] = 0u8.wrapping_sub(sum);
}

/// Builds an EDID of `blocks` blocks: a 720p base block and CEA extensions.
pub(crate) fn edid(blocks: usize, hdmi: bool, ycbcr422: bool) -> Vec<u8> {
    let mut base = [0u8; 128];
    base[..8].copy_from_slice(&[0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00]);
    base[0x12] = 1;
    base[0x13] = 3;
    base[0x14] = 0x80;
    base[0x36..0x36 + 18].copy_from_slice(&DTD_720P);
    base[0x7e] = (blocks - 1) as u8;
    fix_checksum(&mut base);

    let mut ext = [0u8; 128];
    ext[0] = 0x02;
    ext[1] = 3;
    ext[2] = 10;
    ext[3] = if ycbcr422 { 0x10 } else { 0x00 };
    if hdmi {
        ext[4..10].copy_from_slice(&[0x65, 0x03, 0x0c, 0x00, 0x10, 0x00]);
    } else {
        ext[4..10].copy_from_slice(&[0x65, 0x00, 0x00, 0x00, 0x10, 0x00]);
    }
    fix_checksum(&mut ext);

    let mut data = base.to_vec();
    for _ in 1..blocks {
        data.extend_from_slice(&ext);
    }

    data
}

/// An ADV7511 answering on its main, CEC and EDID addresses.
///
/// Interrupt status bits are cleared by writing ones. A write to the EDID segment register
/// loads `ddc_status` into the DDC status register, raising EDID ready when it reads done.
pub(crate) struct FakeChip {
    pub(crate) main: [u8; 256],
    pub(crate) cec: [u8; 256],
    pub(crate) edid: Vec<u8>,
    pub(crate) hpd: bool,
    pub(crate) ddc_status: u8,
    segment: usize,

    /// Reads per main map register.
    pub(crate) reads: [usize; 256],
    /// Transfers per client address.
    pub(crate) transfers: BTreeMap<u16, usize>,
    /// Register writes as (address, register, value).
    pub(crate) writes: Vec<(u16, u8, u8)>,

    /// Address whose transfers fail.
    pub(crate) fail: Option<u16>,
    /// Report one message less than transferred on EDID reads.
    pub(crate) short_edid: bool,
}

impl FakeChip {
    pub(crate) fn new() -> Self {
        Self {
            main: REG_DEFAULTS,
            cec: [0; 256],
            edid: edid(2, true, true),
            hpd: false,
            ddc_status: 2,
            segment: 0,
            reads: [0; 256],
            transfers: BTreeMap::new(),
            writes: Vec::new(),
            fail: None,
            short_edid: false,
        }
    }

    pub(crate) fn transfers_to(&self, addr: u16) -> usize {
        self.transfers.get(&addr).copied().unwrap_or(0)
    }

    pub(crate) fn wrote(&self, addr: u16, reg: u8) -> bool {
        self.writes.iter().any(|&(a, r, _)| a == addr && r == reg)
    }

    /// Loses the main map contents, as the chip does when the sink is unplugged.
    pub(crate) fn reset(&mut self) {
        for (reg, &def) in REG_DEFAULTS.iter().enumerate() {
            if !matches!(reg, 0x41 | 0x42 | 0x96 | 0x97) {
                self.main[reg] = def;
            }
        }
    }

    fn read_main(&mut self, reg: u8) -> u8 {
        self.reads[reg as usize] += 1;

        match reg {
            0x42 => (self.main[0x42] & !0x40) | if self.hpd { 0x40 } else { 0 },
            _ => self.main[reg as usize],
        }
    }

    fn write_main(&mut self, reg: u8, val: u8) {
        match reg {
            0x96 | 0x97 => self.main[reg as usize] &= !val,
            0xc4 => {
                self.main[0xc4] = val;
                self.segment = val as usize;
                self.main[0xc8] = self.ddc_status;
                if self.ddc_status == 2 {
                    self.main[0x96] |= 0x04;
                }
            }
            _ => self.main[reg as usize] = val,
        }
    }

    fn read(&mut self, addr: u16, reg: u8, buf: &mut [u8]) -> Result {
        for (i, b) in buf.iter_mut().enumerate() {
            let reg = reg.wrapping_add(i as u8);

            *b = match addr {
                MAIN_ADDR => self.read_main(reg),
                CEC_ADDR => self.cec[reg as usize],
                EDID_ADDR => {
                    let offset = self.segment * 256 + reg as usize;
                    self.edid.get(offset).copied().unwrap_or(0)
                }
                _ => return Err(ENXIO),
            };
        }

        Ok(())
    }

    fn write(&mut self, addr: u16, reg: u8, vals: &[u8]) -> Result {
        for (i, &val) in vals.iter().enumerate() {
            let reg = reg.wrapping_add(i as u8);

            self.writes.push((addr, reg, val));
            match addr {
                MAIN_ADDR => self.write_main(reg, val),
                CEC_ADDR => self.cec[reg as usize] = val,
                _ => return Err(ENXIO),
            }
        }

        Ok(())
    }
}

impl i2c::Algorithm for FakeChip {
    fn master_xfer(&mut self, addr: u16, msgs: &mut [Operation<'_>]) -> Result<usize> {
        *self.transfers.entry(addr).or_default() += 1;

        if self.fail == Some(addr) {
            return Err(EREMOTEIO);
        }

        match msgs {
            [Operation::Write(w), Operation::Read(r)] => {
                let reg = *w.first().ok_or(EIO)?;
                self.read(addr, reg, r)?;
            }
            [Operation::Write(w)] => {
                let (&reg, vals) = w.split_first().ok_or(EIO)?;
                self.write(addr, reg, vals)?;
            }
            _ => return Err(EIO),
        }

        if self.short_edid && addr == EDID_ADDR {
            return Ok(msgs.len() - 1);
        }

        Ok(msgs.len())
    }
}

/// A delay that only counts the millisecond sleeps requested.
#[derive(Clone, Default)]
pub(crate) struct NoDelay(Arc<AtomicU32>);

impl NoDelay {
    pub(crate) fn sleeps(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, _ms: u32) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// Counts the calls the transmitter makes into the display pipeline.
#[derive(Clone, Default)]
pub(crate) struct Events {
    hotplug: Arc<AtomicU32>,
    dsi_reset: Arc<AtomicU32>,
}

impl Events {
    pub(crate) fn hotplug(&self) -> u32 {
        self.hotplug.load(Ordering::Relaxed)
    }

    pub(crate) fn dsi_reset(&self) -> u32 {
        self.dsi_reset.load(Ordering::Relaxed)
    }
}

impl DisplayPipeline for Events {
    fn hotplug_event(&mut self) {
        self.hotplug.fetch_add(1, Ordering::Relaxed);
    }

    fn dsi_reset(&mut self) {
        self.dsi_reset.fetch_add(1, Ordering::Relaxed);
    }
}

/// An RGB 1x input link.
pub(crate) fn link_node() -> FwNode {
    FwNode::new()
        .with_int("adi,input-depth", 8)
        .with_string("adi,input-colorspace", "rgb")
        .with_string("adi,input-clock", "1x")
}

pub(crate) type TestAdv7511 = Adv7511<FakeChip, NoDelay>;

pub(crate) fn probe_client(client: &i2c::Client<FakeChip>) -> TestAdv7511 {
    let mut client = client.clone();

    i2c::probe::<TestAdv7511, _>(&mut client).unwrap()
}

pub(crate) fn probe_with(name: &str, node: FwNode) -> (i2c::Adapter<FakeChip>, TestAdv7511) {
    let adapter = i2c::Adapter::new(FakeChip::new());
    let client = i2c::Client::new(&adapter, name, MAIN_ADDR, node);
    let adv = probe_client(&client);

    (adapter, adv)
}

pub(crate) fn probe(name: &str) -> (i2c::Adapter<FakeChip>, TestAdv7511) {
    probe_with(name, link_node())
}

pub(crate) fn probe_irq(name: &str) -> (i2c::Adapter<FakeChip>, TestAdv7511) {
    let adapter = i2c::Adapter::new(FakeChip::new());
    let client = i2c::Client::new(&adapter, name, MAIN_ADDR, link_node()).with_irq(42);
    let adv = probe_client(&client);

    (adapter, adv)
}
