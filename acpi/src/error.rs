//! Error type for the address-space handler core.

use core::ffi::c_int;

/// Failure returned by a handler's attach/detach/read/write routine.
///
/// Follows the `as_c_int`/`from_c_int` convention used by
/// `slopos_abi::error`'s kernel error enums, adapted by hand rather than
/// through `impl_kernel_error!` because `Platform` carries the platform's
/// own raw status code and can't be represented as a plain `#[repr(i32)]`
/// discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerError {
    /// Context allocation failed at attach.
    OutOfMemory,
    /// Platform `map`/`io_map` failed at attach.
    MappingFailed,
    /// No controlling device ancestor exists for a PCI region.
    NotFound,
    /// Unknown op code or unsupported access width.
    InvalidArgument,
    /// Pass-through: the platform layer reported this status for a
    /// read/write. Carries the platform's own code unchanged.
    Platform(i32),
}

impl HandlerError {
    /// Convert to a C-style negative status code for syscall-style returns.
    #[inline]
    pub fn as_c_int(self) -> c_int {
        match self {
            Self::OutOfMemory => -1,
            Self::MappingFailed => -2,
            Self::NotFound => -3,
            Self::InvalidArgument => -4,
            Self::Platform(_) => -5,
        }
    }

    /// Convert from a C-style negative status code.
    ///
    /// `Platform` status can't round-trip through this (the original
    /// platform code is lost once collapsed to -5); unknown codes fall
    /// back to `InvalidArgument`.
    #[inline]
    pub fn from_c_int(val: c_int) -> Self {
        match val {
            -1 => Self::OutOfMemory,
            -2 => Self::MappingFailed,
            -3 => Self::NotFound,
            _ => Self::InvalidArgument,
        }
    }
}
