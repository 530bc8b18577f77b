// SPDX-License-Identifier: GPL-2.0

//! DRM connector state.
//!
//! C header: [`include/drm/drm_connector.h`](srctree/include/drm/drm_connector.h)

/// Connection state of a connector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectorStatus {
    /// A sink is attached.
    Connected,
    /// No sink is attached.
    Disconnected,
    /// The state can't be determined.
    #[default]
    Unknown,
}

/// Pixel encodings a sink accepts, as bits of [`DisplayInfo::color_formats`].
pub mod color_format {
    /// RGB 4:4:4.
    pub const RGB444: u32 = 1 << 0;
    /// YCbCr 4:4:4.
    pub const YCRCB444: u32 = 1 << 1;
    /// YCbCr 4:2:2.
    pub const YCRCB422: u32 = 1 << 2;
    /// YCbCr 4:2:0.
    pub const YCRCB420: u32 = 1 << 3;
}

/// Sink capabilities learnt from the EDID.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Supported pixel encodings, see [`color_format`].
    pub color_formats: u32,
    /// Bits per color component, 0 when unknown.
    pub bpc: u32,
}

/// Result of validating a mode against a device's limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeStatus {
    /// The mode can be driven.
    Ok,
    /// The pixel clock is too high.
    ClockHigh,
}
