// SPDX-License-Identifier: GPL-2.0

//! EDID retrieval and parsing.
//!
//! C header: [`include/drm/drm_edid.h`](srctree/include/drm/drm_edid.h)

use super::{
    connector::{color_format, DisplayInfo},
    mode::{flags, DisplayMode},
};
use crate::error::{code::*, Result};

/// Size of one EDID block.
pub const EDID_LENGTH: usize = 128;

const EDID_HEADER: [u8; 8] = [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];
const EDID_RETRIES: usize = 4;

const REVISION: usize = 0x13;
const INPUT: usize = 0x14;
const FEATURES: usize = 0x18;
const DETAILED_TIMINGS: usize = 0x36;
const EXTENSIONS: usize = 0x7e;
const CHECKSUM: usize = 0x7f;

const INPUT_DIGITAL: u8 = 1 << 7;
const FEATURE_YCRCB444: u8 = 1 << 3;
const FEATURE_YCRCB422: u8 = 1 << 4;

const CEA_EXT: u8 = 0x02;
const CEA_YCRCB444: u8 = 1 << 5;
const CEA_YCRCB422: u8 = 1 << 4;
const CEA_VENDOR_BLOCK: u8 = 0x03;
const HDMI_IEEE_OUI: [u8; 3] = [0x03, 0x0c, 0x00];

const DTD_SIZE: usize = 18;

fn block_checksum_ok(block: &[u8]) -> bool {
    block.iter().fold(0u8, |sum, &b| sum.wrapping_add(b)) == 0
}

fn block_valid(block: &[u8], index: usize) -> bool {
    if index == 0 && block[..EDID_HEADER.len()] != EDID_HEADER {
        return false;
    }

    block_checksum_ok(block)
}

/// A complete EDID: the base block followed by its valid extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edid {
    data: Vec<u8>,
}

/// Reads an EDID through `get_edid_block`, which fills its buffer with the given block.
///
/// Each block is read up to four times until its checksum (and for the base block, its
/// header) checks out. A corrupt base block fails with `EINVAL`, corrupt extensions are
/// dropped and the extension count and checksum fixed up. Errors returned by
/// `get_edid_block` abort the read.
///
/// Equivalent to `drm_do_get_edid()`.
pub fn do_get_edid<F>(mut get_edid_block: F) -> Result<Edid>
where
    F: FnMut(&mut [u8], u32) -> Result,
{
    let mut read_block = |index: usize| -> Result<Option<[u8; EDID_LENGTH]>> {
        let mut block = [0u8; EDID_LENGTH];
        let num = u32::try_from(index).map_err(|_| EINVAL)?;

        for _ in 0..EDID_RETRIES {
            get_edid_block(&mut block, num)?;
            if block_valid(&block, index) {
                return Ok(Some(block));
            }
        }

        Ok(None)
    };

    let base = read_block(0)?.ok_or(EINVAL)?;
    let extensions = usize::from(base[EXTENSIONS]);

    let mut data = base.to_vec();
    let mut valid = 0u8;
    for index in 1..=extensions {
        if let Some(block) = read_block(index)? {
            data.extend_from_slice(&block);
            valid += 1;
        }
    }

    if usize::from(valid) != extensions {
        crate::pr_debug!("dropped {} corrupt EDID extension(s)", extensions - valid as usize);
        data[EXTENSIONS] = valid;
        let sum = data[..CHECKSUM].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
        data[CHECKSUM] = 0u8.wrapping_sub(sum);
    }

    Ok(Edid { data })
}

fn detailed_timing(d: &[u8]) -> Option<DisplayMode> {
    let clock = u32::from(u16::from_le_bytes([d[0], d[1]])) * 10;
    if clock == 0 {
        return None;
    }

    let hactive = u32::from(d[2]) | (u32::from(d[4] & 0xf0) << 4);
    let hblank = u32::from(d[3]) | (u32::from(d[4] & 0x0f) << 8);
    let vactive = u32::from(d[5]) | (u32::from(d[7] & 0xf0) << 4);
    let vblank = u32::from(d[6]) | (u32::from(d[7] & 0x0f) << 8);
    let hsync_offset = u32::from(d[8]) | (u32::from(d[11] & 0xc0) << 2);
    let hsync_pulse = u32::from(d[9]) | (u32::from(d[11] & 0x30) << 4);
    let vsync_offset = u32::from(d[10] >> 4) | (u32::from(d[11] & 0x0c) << 2);
    let vsync_pulse = u32::from(d[10] & 0x0f) | (u32::from(d[11] & 0x03) << 4);
    let misc = d[17];

    if hactive == 0 || vactive == 0 {
        return None;
    }

    let mut mode = DisplayMode {
        clock,
        hdisplay: hactive,
        hsync_start: hactive + hsync_offset,
        hsync_end: hactive + hsync_offset + hsync_pulse,
        htotal: hactive + hblank,
        vdisplay: vactive,
        vsync_start: vactive + vsync_offset,
        vsync_end: vactive + vsync_offset + vsync_pulse,
        vtotal: vactive + vblank,
        flags: 0,
    };

    mode.flags |= if misc & (1 << 1) != 0 {
        flags::PHSYNC
    } else {
        flags::NHSYNC
    };
    mode.flags |= if misc & (1 << 2) != 0 {
        flags::PVSYNC
    } else {
        flags::NVSYNC
    };

    if misc & (1 << 7) != 0 {
        mode.vdisplay *= 2;
        mode.vsync_start *= 2;
        mode.vsync_end *= 2;
        mode.vtotal = mode.vtotal * 2 + 1;
        mode.flags |= flags::INTERLACE;
    }

    Some(mode)
}

impl Edid {
    /// Returns the raw EDID bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of extension blocks.
    pub fn extension_count(&self) -> usize {
        self.data.len() / EDID_LENGTH - 1
    }

    fn cea_extensions(&self) -> impl Iterator<Item = &[u8]> {
        self.data
            .chunks_exact(EDID_LENGTH)
            .skip(1)
            .filter(|ext| ext[0] == CEA_EXT)
    }

    fn cea_data_blocks(ext: &[u8]) -> impl Iterator<Item = &[u8]> {
        let end = usize::from(ext[2]).clamp(4, EDID_LENGTH - 1);
        let mut pos = 4;

        core::iter::from_fn(move || {
            if pos >= end {
                return None;
            }

            let len = usize::from(ext[pos] & 0x1f);
            let block = ext.get(pos..pos + 1 + len).filter(|_| pos + 1 + len <= end)?;
            pos += 1 + len;
            Some(block)
        })
    }

    /// Returns whether the sink advertises the HDMI vendor-specific data block.
    ///
    /// Equivalent to `drm_detect_hdmi_monitor()`.
    pub fn is_hdmi_monitor(&self) -> bool {
        self.cea_extensions().any(|ext| {
            Self::cea_data_blocks(ext).any(|db| {
                db[0] >> 5 == CEA_VENDOR_BLOCK && db.len() >= 6 && db[1..4] == HDMI_IEEE_OUI
            })
        })
    }

    /// Returns the sink's color capabilities.
    pub fn display_info(&self) -> DisplayInfo {
        let mut info = DisplayInfo::default();

        if self.data[REVISION] < 3 || self.data[INPUT] & INPUT_DIGITAL == 0 {
            return info;
        }

        info.color_formats |= color_format::RGB444;
        for ext in self.cea_extensions() {
            if ext[3] & CEA_YCRCB444 != 0 {
                info.color_formats |= color_format::YCRCB444;
            }
            if ext[3] & CEA_YCRCB422 != 0 {
                info.color_formats |= color_format::YCRCB422;
            }
        }

        if self.data[REVISION] < 4 {
            return info;
        }

        info.bpc = match (self.data[INPUT] >> 4) & 0x7 {
            1 => 6,
            2 => 8,
            3 => 10,
            4 => 12,
            5 => 14,
            6 => 16,
            _ => 0,
        };

        if self.data[FEATURES] & FEATURE_YCRCB444 != 0 {
            info.color_formats |= color_format::YCRCB444;
        }
        if self.data[FEATURES] & FEATURE_YCRCB422 != 0 {
            info.color_formats |= color_format::YCRCB422;
        }

        info
    }

    /// Returns the detailed timings of the base block and the CEA extensions.
    pub fn modes(&self) -> Vec<DisplayMode> {
        let base = self.data[DETAILED_TIMINGS..DETAILED_TIMINGS + 4 * DTD_SIZE]
            .chunks_exact(DTD_SIZE)
            .filter_map(detailed_timing);

        let cea = self.cea_extensions().flat_map(|ext| {
            let start = usize::from(ext[2]);
            let dtds = if start >= 4 && start < CHECKSUM {
                &ext[start..CHECKSUM]
            } else {
                &ext[..0]
            };

            dtds.chunks_exact(DTD_SIZE).map_while(detailed_timing)
        });

        base.chain(cea).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drm::connector::color_format::*;

    const DTD_720P: [u8; 18] = [
        0x01, 0x1d, 0x00, 0x72, 0x51, 0xd0, 0x1e, 0x20, 0x6e, 0x28, 0x55, 0x00, 0xc4, 0x8e, 0x21,
        0x00, 0x00, 0x1e,
    ];

    fn fix_checksum(block: &mut [u8]) {
        let sum = block[..127].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
        block[127] = 0u8.wrapping_sub(sum);
    }

    fn base_block(extensions: u8) -> [u8; 128] {
        let mut block = [0u8; 128];
        block[..8].copy_from_slice(&EDID_HEADER);
        block[0x12] = 1;
        block[REVISION] = 4;
        block[INPUT] = INPUT_DIGITAL | (2 << 4);
        block[DETAILED_TIMINGS..DETAILED_TIMINGS + 18].copy_from_slice(&DTD_720P);
        block[EXTENSIONS] = extensions;
        fix_checksum(&mut block);
        block
    }

    fn cea_block(hdmi: bool, ycbcr: u8) -> [u8; 128] {
        let mut block = [0u8; 128];
        block[0] = CEA_EXT;
        block[1] = 3;
        block[3] = ycbcr;
        let vsdb: &[u8] = if hdmi {
            &[0x65, 0x03, 0x0c, 0x00, 0x10, 0x00]
        } else {
            &[0x65, 0x00, 0x00, 0x00, 0x10, 0x00]
        };
        block[4..4 + vsdb.len()].copy_from_slice(vsdb);
        block[2] = (4 + vsdb.len()) as u8;
        let dtd = usize::from(block[2]);
        block[dtd..dtd + 18].copy_from_slice(&DTD_720P);
        block[dtd + 17] = 0x18;
        fix_checksum(&mut block);
        block
    }

    fn read_from(blocks: Vec<[u8; 128]>) -> (Result<Edid>, Vec<u32>) {
        let mut reads = Vec::new();
        let edid = do_get_edid(|buf, block| {
            reads.push(block);
            buf.copy_from_slice(blocks.get(block as usize).ok_or(EIO)?);
            Ok(())
        });
        (edid, reads)
    }

    #[test]
    fn hdmi_sink() {
        let (edid, reads) = read_from(vec![base_block(1), cea_block(true, CEA_YCRCB422)]);
        let edid = edid.unwrap();

        assert_eq!(reads, vec![0, 1]);
        assert_eq!(edid.extension_count(), 1);
        assert!(edid.is_hdmi_monitor());
        assert_eq!(
            edid.display_info(),
            DisplayInfo {
                color_formats: RGB444 | YCRCB422,
                bpc: 8
            }
        );

        let modes = edid.modes();
        assert_eq!(modes.len(), 2);
        assert!(modes[0].is_size(1280, 720));
        assert_eq!(modes[0].hsync_start, 1390);
        assert_eq!(modes[0].vtotal, 750);
        assert_eq!(modes[0].flags, flags::PHSYNC | flags::PVSYNC);
        assert_eq!(modes[0].vrefresh(), 60);
        assert_eq!(modes[1].flags, flags::NHSYNC | flags::NVSYNC);
    }

    #[test]
    fn dvi_sink() {
        let (edid, _) = read_from(vec![base_block(1), cea_block(false, 0)]);
        let edid = edid.unwrap();

        assert!(!edid.is_hdmi_monitor());
        assert_eq!(edid.display_info().color_formats, RGB444);
    }

    #[test]
    fn corrupt_base_block_is_retried() {
        let mut bad = base_block(0);
        bad[0x20] ^= 0xff;

        let (edid, reads) = read_from(vec![bad]);
        assert_eq!(edid, Err(EINVAL));
        assert_eq!(reads, vec![0, 0, 0, 0]);
    }

    #[test]
    fn corrupt_extension_is_dropped() {
        let mut bad = cea_block(true, 0);
        bad[10] ^= 0x01;

        let (edid, reads) = read_from(vec![base_block(1), bad]);
        let edid = edid.unwrap();

        assert_eq!(reads, vec![0, 1, 1, 1, 1]);
        assert_eq!(edid.extension_count(), 0);
        assert_eq!(edid.data()[EXTENSIONS], 0);
        assert!(block_checksum_ok(edid.data()));
        assert!(!edid.is_hdmi_monitor());
    }

    #[test]
    fn read_errors_abort() {
        let (edid, reads) = read_from(vec![base_block(2), cea_block(true, 0)]);

        assert_eq!(edid, Err(EIO));
        assert_eq!(reads, vec![0, 1, 2]);
    }
}
