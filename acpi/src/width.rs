//! Width-discriminated access sizes.

/// A byte width an access primitive is allowed to perform.
///
/// Deliberately closed over {1,2,4,8}: a width outside this set must be
/// rejected by the caller (see [`AccessWidth::try_from_bytes`]) rather than
/// synthesized from narrower accesses.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessWidth {
    Byte = 1,
    Word = 2,
    Dword = 4,
    Qword = 8,
}

impl AccessWidth {
    /// Number of bytes this width covers.
    #[inline]
    pub const fn bytes(self) -> usize {
        self as u8 as usize
    }

    /// Validate a raw byte width, rejecting anything not in {1,2,4,8}.
    #[inline]
    pub const fn try_from_bytes(width: u8) -> Option<Self> {
        match width {
            1 => Some(Self::Byte),
            2 => Some(Self::Word),
            4 => Some(Self::Dword),
            8 => Some(Self::Qword),
            _ => None,
        }
    }
}
