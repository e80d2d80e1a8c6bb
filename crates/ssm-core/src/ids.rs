//! Strongly typed, zero-cost identifier wrappers.
//!
//! Both IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub`; prefer
//! the `.index()` helper when indexing per-choice or per-draw `Vec`s.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID": the inner type's `MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A discrete response label.
    ///
    /// For race families this is the accumulator index.  For the DDM,
    /// `Choice::UPPER` (0) is the boundary at `α` and `Choice::LOWER` (1) the
    /// boundary at 0.
    pub struct Choice(u16);
}

typed_id! {
    /// Position of a draw within a sampling batch.  Also the key from which the
    /// draw's RNG stream is derived.
    pub struct DrawId(u64);
}

impl Choice {
    /// DDM upper boundary (`α`).
    pub const UPPER: Choice = Choice(0);
    /// DDM lower boundary (0).
    pub const LOWER: Choice = Choice(1);
}
