// SPDX-License-Identifier: GPL-2.0

//! Bit manipulation macros.
//!
//! C header: [`include/linux/bits.h`](srctree/include/linux/bits.h)

/// Produces a literal where bit `n` is set.
///
/// Equivalent to the kernel's `BIT` macro.
///
#[macro_export]
macro_rules! bit {
    ($n:expr) => {
        (1 << $n)
    };
}

/// Create a contiguous bitmask starting at bit position `l` and ending at
/// position `h`, where `h >= l`.
///
/// # Examples
/// ```
///     use kernel::genmask;
///     let mask = genmask!(39, 21);
///     assert_eq!(mask, 0x000000ffffe00000);
/// ```
///
#[macro_export]
macro_rules! genmask {
    ($h:expr, $l:expr) => {{
        const _: () = {
            assert!($h >= $l);
        };
        ((!0u64 - (1u64 << $l) + 1) & (!0u64 >> (64 - 1 - $h)))
    }};
}

/// Shifts `val` into the position described by `mask`.
///
/// Equivalent to the kernel's `FIELD_PREP`, bits of `val` that do not fit are dropped.
pub const fn field_prep(mask: u32, val: u32) -> u32 {
    if mask == 0 {
        return 0;
    }

    (val << mask.trailing_zeros()) & mask
}

/// Extracts the field described by `mask` from `reg`.
///
/// Equivalent to the kernel's `FIELD_GET`.
pub const fn field_get(mask: u32, reg: u32) -> u32 {
    if mask == 0 {
        return 0;
    }

    (reg & mask) >> mask.trailing_zeros()
}
