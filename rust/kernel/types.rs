// SPDX-License-Identifier: GPL-2.0

//! Kernel types.

/// Integer types that firmware properties can be read as.
pub trait Integer: Copy + TryFrom<i64> {}

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(impl Integer for $t {})*
    };
}

impl_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
