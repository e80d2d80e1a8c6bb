//! `ssm-core`: foundational types for the `rust_ssm` toolkit.
//!
//! This crate is a dependency of every other `ssm-*` crate.  It intentionally
//! has no `ssm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`ids`]       | `Choice`, `DrawId`                                         |
//! | [`family`]    | `ModelFamily` tag                                          |
//! | [`outcome`]   | `Outcome`, `OutcomeBatch`, `Trajectory`, density results   |
//! | [`params`]    | `RawParams`, `ParamSchema`, `Domain`, `ParamReader`        |
//! | [`config`]    | `SamplerConfig`, `DensityConfig`, `RunConfig`              |
//! | [`rng`]       | `DrawRng` (per-draw), `SimRng` (caller-held)               |
//! | [`error`]     | `SsmError`, `ValidationError`, `NumericalWarning`          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to configs, parameters, and   |
//!           | outcomes (`ModelFamily` is serialize-only).                  |

pub mod config;
pub mod error;
pub mod family;
pub mod ids;
pub mod outcome;
pub mod params;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DensityConfig, RunConfig, SamplerConfig};
pub use error::{ElementIndex, NumericalWarning, SsmError, SsmResult, ValidationError, ValidationResult};
pub use family::ModelFamily;
pub use ids::{Choice, DrawId};
pub use outcome::{DensityBatch, DensityEval, Outcome, OutcomeBatch, Trajectory};
pub use params::{ChoiceCount, Domain, MAX_ACCUMULATORS, ParamKind, ParamReader, ParamSchema, ParamValue, RawParams};
pub use rng::{DrawRng, SimRng};
