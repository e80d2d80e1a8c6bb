//! Model family tags.

use std::fmt;

/// Identifies which stochastic process and density formula apply to a
/// specification.
///
/// The tag is an open, `Copy` wrapper around a static name so downstream
/// crates can introduce families of their own:
///
/// ```
/// use ssm_core::ModelFamily;
///
/// const LCA: ModelFamily = ModelFamily::new("LCA");
/// assert_eq!(LCA.name(), "LCA");
/// assert!(LCA.matches_name("lca"));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelFamily(&'static str);

impl ModelFamily {
    /// Diffusion Decision Model.
    pub const DDM: ModelFamily = ModelFamily("DDM");
    /// Linear Ballistic Accumulator.
    pub const LBA: ModelFamily = ModelFamily("LBA");
    /// Racing Diffusion Model.
    pub const RDM: ModelFamily = ModelFamily("RDM");
    /// Shifted Wald (single diffusion accumulator).
    pub const WALD: ModelFamily = ModelFamily("Wald");
    /// Lognormal race.
    pub const LNR: ModelFamily = ModelFamily("LNR");

    pub const fn new(name: &'static str) -> Self {
        ModelFamily(name)
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.0
    }

    /// Case-insensitive comparison against a user-supplied name.
    pub fn matches_name(self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
