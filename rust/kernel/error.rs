// SPDX-License-Identifier: GPL-2.0

//! Kernel errors.
//!
//! C header: [`include/uapi/asm-generic/errno-base.h`](srctree/include/uapi/asm-generic/errno-base.h)

use core::fmt;

/// Contains the error codes used by the driver-support crate and the drivers built on it.
pub mod code {
    macro_rules! declare_err {
        ($err:tt $(,)? $($doc:expr),+) => {
            $(
            #[doc = $doc]
            )*
            pub const $err: super::Error = super::Error(-(errno::$err));
        };
    }

    mod errno {
        pub(super) const EIO: i32 = 5;
        pub(super) const ENXIO: i32 = 6;
        pub(super) const EAGAIN: i32 = 11;
        pub(super) const ENOMEM: i32 = 12;
        pub(super) const ENODEV: i32 = 19;
        pub(super) const EINVAL: i32 = 22;
        pub(super) const ENOSPC: i32 = 28;
        pub(super) const ENODATA: i32 = 61;
        pub(super) const EOVERFLOW: i32 = 75;
        pub(super) const ETIMEDOUT: i32 = 110;
        pub(super) const EREMOTEIO: i32 = 121;
        pub(super) const ENOTSUPP: i32 = 524;
    }

    declare_err!(EIO, "I/O error.");
    declare_err!(ENXIO, "No such device or address.");
    declare_err!(EAGAIN, "Try again.");
    declare_err!(ENOMEM, "Out of memory.");
    declare_err!(ENODEV, "No such device.");
    declare_err!(EINVAL, "Invalid argument.");
    declare_err!(ENOSPC, "No space left on device.");
    declare_err!(ENODATA, "No data available.");
    declare_err!(EOVERFLOW, "Value too large for defined data type.");
    declare_err!(ETIMEDOUT, "Connection timed out.");
    declare_err!(EREMOTEIO, "Remote I/O error.");
    declare_err!(ENOTSUPP, "Operation is not supported.");
}

/// Generic integer kernel error.
///
/// The kernel defines a set of integer generic error codes based on C and POSIX ones. These codes
/// may have a more specific meaning in some contexts.
///
/// # Invariants
///
/// The value is a valid `errno` (i.e. `>= -MAX_ERRNO && < 0`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Error(i32);

const MAX_ERRNO: i32 = 4095;

impl Error {
    /// Creates an [`Error`] from a kernel error code.
    ///
    /// Values outside of the errno range map to `EINVAL`.
    pub fn from_errno(errno: i32) -> Error {
        if !(-MAX_ERRNO..0).contains(&errno) {
            crate::pr_warn!("attempted to create an Error with out of range `errno`: {}", errno);
            return code::EINVAL;
        }

        Error(errno)
    }

    /// Returns the kernel error code.
    pub fn to_errno(self) -> i32 {
        self.0
    }

    /// Returns the symbolic name of the error, if it is one of the known codes.
    pub fn name(&self) -> Option<&'static str> {
        use code::*;

        let name = match *self {
            EIO => "EIO",
            ENXIO => "ENXIO",
            EAGAIN => "EAGAIN",
            ENOMEM => "ENOMEM",
            ENODEV => "ENODEV",
            EINVAL => "EINVAL",
            ENOSPC => "ENOSPC",
            ENODATA => "ENODATA",
            EOVERFLOW => "EOVERFLOW",
            ETIMEDOUT => "ETIMEDOUT",
            EREMOTEIO => "EREMOTEIO",
            ENOTSUPP => "ENOTSUPP",
            _ => return None,
        };

        Some(name)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            // Print out number if no name can be found.
            None => f.debug_tuple("Error").field(&-self.0).finish(),
            Some(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            None => write!(f, "error {}", self.0),
            Some(name) => write!(f, "{} ({})", name, self.0),
        }
    }
}

impl std::error::Error for Error {}

impl From<embedded_hal::i2c::ErrorKind> for Error {
    fn from(kind: embedded_hal::i2c::ErrorKind) -> Self {
        use embedded_hal::i2c::ErrorKind;

        match kind {
            ErrorKind::NoAcknowledge(_) => code::ENXIO,
            ErrorKind::ArbitrationLoss => code::EAGAIN,
            ErrorKind::Overrun => code::EOVERFLOW,
            _ => code::EREMOTEIO,
        }
    }
}

/// A [`Result`] with an [`Error`] error type.
///
/// To be used as the return type for functions that may fail.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Converts an integer as returned by a C-style status call into a [`Result`].
pub fn to_result(err: i32) -> Result {
    if err < 0 {
        Err(Error::from_errno(err))
    } else {
        Ok(())
    }
}
