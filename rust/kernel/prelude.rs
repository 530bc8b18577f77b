// SPDX-License-Identifier: GPL-2.0

//! The `kernel` prelude.
//!
//! These are the most common items used by Rust code in the kernel,
//! intended to be imported by all Rust code, for convenience.
//!
//! # Examples
//!
//! ```
//! use kernel::prelude::*;
//! ```

pub use crate::{bit, dev_dbg, dev_err, dev_info, dev_warn, genmask};

pub use crate::{pr_debug, pr_err, pr_info, pr_warn};

pub use crate::error::{code::*, Error, Result};

pub use crate::regmap::{
    BitFieldReadOps, BitFieldWriteOps, EnumFieldReadOps, EnumFieldWriteOps, FieldCommonOps,
    RawFieldReadOps, RawFieldWriteOps,
};
