//! `ssm-models`: sequential sampling model families.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`model`]  | `SsmModel` trait (typed), domain helper `decision_time`        |
//! | [`spec`]   | `Specification`, object-safe `DynModel`, `erase`               |
//! | [`ddm`]    | Diffusion Decision Model (Euler sampler, Navarro–Fuss density) |
//! | [`lba`]    | Linear Ballistic Accumulator (truncated-drift race)            |
//! | [`rdm`]    | Racing Diffusion Model (uniform-start Wald race)               |
//! | [`wald`]   | Shifted Wald, single accumulator                               |
//! | [`lnr`]    | Lognormal race                                                 |
//! | [`normal`] | Standard normal pdf/cdf helpers in linear and log space        |
//!
//! # Design notes
//!
//! Every family is a unit struct implementing [`SsmModel`] with its own
//! immutable `Params` type.  Typed callers use the family directly:
//!
//! ```
//! use ssm_core::{Choice, DensityConfig, Outcome};
//! use ssm_models::{Ddm, DdmParams, SsmModel};
//!
//! let params = DdmParams::new(1.0, 0.8, 0.3, 0.5).unwrap();
//! let eval = Ddm.log_density(&params, Outcome::new(Choice::UPPER, 0.5), &DensityConfig::default());
//! assert!(eval.log_density.is_finite());
//! ```
//!
//! The registry in `ssm-sim` stores families behind [`DynModel`] and passes
//! parameters around as type-erased [`Specification`]s.

pub mod ddm;
pub mod lba;
pub mod lnr;
pub mod model;
pub mod normal;
pub mod rdm;
pub mod spec;
pub mod wald;

#[cfg(test)]
mod tests;

pub use ddm::{Ddm, DdmParams};
pub use lba::{Lba, LbaParams};
pub use lnr::{Lnr, LnrParams};
pub use model::{SsmModel, decision_time};
pub use rdm::{Rdm, RdmParams};
pub use spec::{DynModel, Specification, erase};
pub use wald::{Wald, WaldParams};
