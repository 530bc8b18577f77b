// SPDX-License-Identifier: GPL-2.0

//! HDMI infoframes.
//!
//! C header: [`include/linux/hdmi.h`](srctree/include/linux/hdmi.h)

use crate::error::{code::*, Result};

const AVI_INFOFRAME_TYPE: u8 = 0x82;
const AVI_INFOFRAME_VERSION: u8 = 2;
const AVI_INFOFRAME_LENGTH: u8 = 13;
const INFOFRAME_HEADER_SIZE: usize = 4;

/// Size of a packed AVI infoframe, header included.
pub const AVI_INFOFRAME_SIZE: usize = INFOFRAME_HEADER_SIZE + AVI_INFOFRAME_LENGTH as usize;

/// Pixel encoding signalled in the AVI infoframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Colorspace {
    /// RGB 4:4:4.
    #[default]
    Rgb = 0,
    /// YCbCr 4:2:2.
    Yuv422 = 1,
    /// YCbCr 4:4:4.
    Yuv444 = 2,
    /// YCbCr 4:2:0.
    Yuv420 = 3,
}

/// Scan information signalled in the AVI infoframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ScanMode {
    /// No data.
    #[default]
    None = 0,
    /// Composed for an overscanned display.
    Overscan = 1,
    /// Composed for an underscanned display.
    Underscan = 2,
}

/// Auxiliary Video Information infoframe.
///
/// Equivalent to `struct hdmi_avi_infoframe`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AviInfoframe {
    pub colorspace: Colorspace,
    pub scan_mode: ScanMode,
    pub colorimetry: u8,
    pub picture_aspect: u8,
    pub active_aspect: u8,
    pub itc: bool,
    pub extended_colorimetry: u8,
    pub quantization_range: u8,
    pub nups: u8,
    pub video_code: u8,
    pub ycc_quantization_range: u8,
    pub content_type: u8,
    pub pixel_repeat: u8,
    pub top_bar: u16,
    pub bottom_bar: u16,
    pub left_bar: u16,
    pub right_bar: u16,
}

impl AviInfoframe {
    /// Creates an infoframe with every field set to "no data".
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs the infoframe into `buf`, computing the checksum.
    ///
    /// Returns the number of bytes written, [`AVI_INFOFRAME_SIZE`]. Fails with `ENOSPC` if
    /// `buf` is too small.
    pub fn pack(&self, buf: &mut [u8]) -> Result<usize> {
        let buf = buf.get_mut(..AVI_INFOFRAME_SIZE).ok_or(ENOSPC)?;
        buf.fill(0);

        buf[0] = AVI_INFOFRAME_TYPE;
        buf[1] = AVI_INFOFRAME_VERSION;
        buf[2] = AVI_INFOFRAME_LENGTH;

        let pb = &mut buf[INFOFRAME_HEADER_SIZE..];

        pb[0] = ((self.colorspace as u8 & 0x3) << 5) | (self.scan_mode as u8 & 0x3);
        // Data byte 1, bit 4 has to be set when the active aspect ratio is valid.
        if self.active_aspect & 0xf != 0 {
            pb[0] |= 1 << 4;
        }
        if self.top_bar != 0 || self.bottom_bar != 0 {
            pb[0] |= 1 << 3;
        }
        if self.left_bar != 0 || self.right_bar != 0 {
            pb[0] |= 1 << 2;
        }

        pb[1] = ((self.colorimetry & 0x3) << 6)
            | ((self.picture_aspect & 0x3) << 4)
            | (self.active_aspect & 0xf);

        pb[2] = ((self.extended_colorimetry & 0x7) << 4)
            | ((self.quantization_range & 0x3) << 2)
            | (self.nups & 0x3);
        if self.itc {
            pb[2] |= 1 << 7;
        }

        pb[3] = self.video_code & 0x7f;

        pb[4] = ((self.ycc_quantization_range & 0x3) << 6)
            | ((self.content_type & 0x3) << 4)
            | (self.pixel_repeat & 0xf);

        pb[5..7].copy_from_slice(&self.top_bar.to_le_bytes());
        pb[7..9].copy_from_slice(&self.bottom_bar.to_le_bytes());
        pb[9..11].copy_from_slice(&self.left_bar.to_le_bytes());
        pb[11..13].copy_from_slice(&self.right_bar.to_le_bytes());

        let sum = buf.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
        buf[3] = 0u8.wrapping_sub(sum);

        Ok(AVI_INFOFRAME_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscan_rgb() {
        let frame = AviInfoframe {
            scan_mode: ScanMode::Underscan,
            ..AviInfoframe::new()
        };
        let mut buf = [0xffu8; AVI_INFOFRAME_SIZE];

        assert_eq!(frame.pack(&mut buf), Ok(17));
        assert_eq!(buf[..5], [0x82, 0x02, 0x0d, 0x6d, 0x02]);
        assert!(buf[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn checksum_covers_payload() {
        let frame = AviInfoframe {
            colorspace: Colorspace::Yuv422,
            scan_mode: ScanMode::Underscan,
            video_code: 16,
            top_bar: 0x123,
            ..AviInfoframe::new()
        };
        let mut buf = [0u8; 32];

        frame.pack(&mut buf).unwrap();
        assert_eq!(buf[4], 0x2a);
        assert_eq!(buf[7], 16);
        assert_eq!(buf[9..11], [0x23, 0x01]);
        let sum = buf[..AVI_INFOFRAME_SIZE]
            .iter()
            .fold(0u8, |sum, &b| sum.wrapping_add(b));
        assert_eq!(sum, 0);
    }

    #[test]
    fn short_buffer() {
        assert_eq!(AviInfoframe::new().pack(&mut [0u8; 16]), Err(ENOSPC));
    }
}
