// SPDX-License-Identifier: GPL-2.0

//! DRM display helpers: connector state, display modes and EDID parsing.
//!
//! C header: [`include/drm/drm_connector.h`](srctree/include/drm/drm_connector.h)

pub mod connector;
pub mod edid;
pub mod mode;
