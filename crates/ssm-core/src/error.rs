//! Error taxonomy shared by every `ssm-*` crate.
//!
//! - [`ValidationError`]: a bad, missing, or out-of-domain parameter.  Always
//!   recoverable by the caller.
//! - [`SsmError`]: everything else that can stop a request: unknown family,
//!   exhausted rejection/step budgets, cancellation, bad configuration.
//! - [`NumericalWarning`]: not an error.  Attached to a density value that
//!   was computed from a truncated series which never met its tolerance.

use std::fmt;

use thiserror::Error;

use crate::{ModelFamily, params::Domain};

// ── ValidationError ───────────────────────────────────────────────────────────

/// Optional element position of a vector-valued parameter, printed as `[i]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct ElementIndex(pub Option<usize>);

impl fmt::Display for ElementIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(i) => write!(f, "[{i}]"),
            None => Ok(()),
        }
    }
}

/// A parameter set was rejected.  Every variant names the family and the
/// parameter involved; nothing is ever clamped or silently defaulted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{family}: missing required parameter `{param}` ({symbol})")]
    Missing {
        family: ModelFamily,
        param:  &'static str,
        symbol: &'static str,
    },

    #[error("{family}: parameter `{param}` ({symbol}){at} = {value} violates constraint: must be {domain}")]
    OutOfDomain {
        family: ModelFamily,
        param:  &'static str,
        symbol: &'static str,
        at:     ElementIndex,
        value:  f64,
        domain: Domain,
    },

    #[error("{family}: parameter `{param}` ({symbol}) has {got} elements, expected {expected} (one per accumulator)")]
    LengthMismatch {
        family:   ModelFamily,
        param:    &'static str,
        symbol:   &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("{family}: parameter `{param}` ({symbol}) must be a scalar, got {len} values")]
    ExpectedScalar {
        family: ModelFamily,
        param:  &'static str,
        symbol: &'static str,
        len:    usize,
    },

    #[error("{family}: parameter `{param}` ({symbol}) must be a vector with one value per accumulator")]
    ExpectedVector {
        family: ModelFamily,
        param:  &'static str,
        symbol: &'static str,
    },

    #[error("{family}: parameter `{param}` ({symbol}) must declare at least one accumulator")]
    NoAccumulators {
        family: ModelFamily,
        param:  &'static str,
        symbol: &'static str,
    },

    #[error("{family}: parameter `{param}` ({symbol}) declares {got} accumulators, at most {max} are supported")]
    TooManyAccumulators {
        family: ModelFamily,
        param:  &'static str,
        symbol: &'static str,
        max:    usize,
        got:    usize,
    },

    #[error("{family}: parameter `{param}` was given twice (as `{param}` and `{symbol}`)")]
    Duplicate {
        family: ModelFamily,
        param:  &'static str,
        symbol: &'static str,
    },

    #[error("{family}: unknown parameter `{name}`")]
    Unknown {
        family: ModelFamily,
        name:   String,
    },
}

impl ValidationError {
    /// The offending parameter's name as the caller wrote it (or its schema
    /// name).
    pub fn param(&self) -> &str {
        match self {
            ValidationError::Missing { param, .. }
            | ValidationError::OutOfDomain { param, .. }
            | ValidationError::LengthMismatch { param, .. }
            | ValidationError::ExpectedScalar { param, .. }
            | ValidationError::ExpectedVector { param, .. }
            | ValidationError::NoAccumulators { param, .. }
            | ValidationError::TooManyAccumulators { param, .. }
            | ValidationError::Duplicate { param, .. } => param,
            ValidationError::Unknown { name, .. } => name,
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            ValidationError::Missing { family, .. }
            | ValidationError::OutOfDomain { family, .. }
            | ValidationError::LengthMismatch { family, .. }
            | ValidationError::ExpectedScalar { family, .. }
            | ValidationError::ExpectedVector { family, .. }
            | ValidationError::NoAccumulators { family, .. }
            | ValidationError::TooManyAccumulators { family, .. }
            | ValidationError::Duplicate { family, .. }
            | ValidationError::Unknown { family, .. } => *family,
        }
    }
}

/// Shorthand for validator results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// ── SsmError ──────────────────────────────────────────────────────────────────

/// The top-level error type for all `ssm-*` crates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SsmError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unsupported model family `{0}`")]
    UnsupportedModel(String),

    /// A rejection loop or discretised path ran out of budget.  Indicates a
    /// pathological parameter region.
    #[error("{family}: sampling exhausted after {attempts} attempts: {reason}")]
    SamplingExhaustion {
        family:   ModelFamily,
        attempts: u64,
        reason:   String,
    },

    #[error("specification for {got} cannot be used with the {expected} model")]
    FamilyMismatch {
        expected: ModelFamily,
        got:      ModelFamily,
    },

    #[error("{0} has no evidence-path representation")]
    NoTrajectory(ModelFamily),

    #[error("cancelled after {completed} of {requested} items")]
    Cancelled {
        completed: usize,
        requested: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `ssm-*` crates.
pub type SsmResult<T> = Result<T, SsmError>;

// ── NumericalWarning ──────────────────────────────────────────────────────────

/// A series expansion hit its term cap before the next term fell below the
/// tolerance.  The accompanying density value is the best available estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NumericalWarning {
    pub family:    ModelFamily,
    /// Number of series terms accumulated.
    pub terms:     usize,
    /// Magnitude bound of the first term that was not added.
    pub last_term: f64,
    /// Relative tolerance that was requested.
    pub tolerance: f64,
}

impl fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: series truncated at {} terms without reaching tolerance {:e} (next term bound {:e})",
            self.family, self.terms, self.tolerance, self.last_term,
        )
    }
}
