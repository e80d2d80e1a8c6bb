//! Raw parameter mappings and the schema used to validate them.
//!
//! # Flow
//!
//! ```text
//! RawParams ──ParamReader::new──► (unknown keys rejected, choice count fixed)
//!           ──reader.scalar(&SCHEMA) / reader.per_choice(&SCHEMA)──► checked f64 / Vec<f64>
//!           ──family constructor──► immutable typed params
//! ```
//!
//! Each model module declares one `ParamSchema` constant per parameter.  The
//! same constants are used both by the raw-mapping path and by the typed
//! constructors, so the two can never disagree about a domain.

use std::collections::BTreeMap;
use std::fmt;

use crate::{ElementIndex, ModelFamily, ValidationError, ValidationResult};

// ── ParamValue / RawParams ────────────────────────────────────────────────────

/// One raw parameter value: a scalar or a per-accumulator vector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::Vector(v)
    }
}

impl<const N: usize> From<[f64; N]> for ParamValue {
    fn from(v: [f64; N]) -> Self {
        ParamValue::Vector(v.to_vec())
    }
}

/// Unvalidated mapping of parameter name → value, as supplied by a caller.
///
/// Keys may be the ASCII schema name (`"alpha"`) or its symbol (`"α"`).
///
/// ```
/// use ssm_core::RawParams;
///
/// let raw = RawParams::new()
///     .with("nu", [3.0, 2.0])
///     .with("A", 0.8)
///     .with("k", 0.2)
///     .with("tau", 0.3);
/// assert_eq!(raw.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RawParams(BTreeMap<String, ParamValue>);

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Domain ────────────────────────────────────────────────────────────────────

/// Admissible set for every element of a parameter.  All domains exclude NaN
/// and infinities.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Domain {
    Real,
    Positive,
    NonNegative,
    /// The open unit interval (0, 1).
    OpenUnit,
}

impl Domain {
    pub fn contains(self, v: f64) -> bool {
        if !v.is_finite() {
            return false;
        }
        match self {
            Domain::Real        => true,
            Domain::Positive    => v > 0.0,
            Domain::NonNegative => v >= 0.0,
            Domain::OpenUnit    => v > 0.0 && v < 1.0,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Domain::Real        => "finite",
            Domain::Positive    => "finite and > 0",
            Domain::NonNegative => "finite and >= 0",
            Domain::OpenUnit    => "in the open interval (0, 1)",
        })
    }
}

/// Largest accumulator set a family may declare.  Labels run
/// `0..MAX_ACCUMULATORS`; `Choice::INVALID` stays out of range.
pub const MAX_ACCUMULATORS: usize = u16::MAX as usize;

// ── ParamSchema ───────────────────────────────────────────────────────────────

/// Shape of a parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    /// One value per accumulator.
    PerChoice,
    /// Either one shared value (broadcast) or one per accumulator.
    ScalarOrPerChoice,
}

/// Static description of one model parameter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParamSchema {
    /// ASCII key, e.g. `"alpha"`.
    pub name:    &'static str,
    /// Conventional symbol, e.g. `"α"`.  Accepted as an alias key.
    pub symbol:  &'static str,
    pub kind:    ParamKind,
    pub domain:  Domain,
    /// Value used when the caller omits the parameter.  `None` = required.
    pub default: Option<f64>,
}

impl ParamSchema {
    pub const fn required(name: &'static str, symbol: &'static str, kind: ParamKind, domain: Domain) -> Self {
        Self { name, symbol, kind, domain, default: None }
    }

    pub const fn optional(
        name:    &'static str,
        symbol:  &'static str,
        kind:    ParamKind,
        domain:  Domain,
        default: f64,
    ) -> Self {
        Self { name, symbol, kind, domain, default: Some(default) }
    }

    /// `true` if `key` names this parameter (by name or symbol).
    pub fn is_named(&self, key: &str) -> bool {
        key == self.name || key == self.symbol
    }

    /// Check one element against the domain.
    pub fn check(&self, family: ModelFamily, value: f64, index: Option<usize>) -> ValidationResult<f64> {
        if self.domain.contains(value) {
            Ok(value)
        } else {
            Err(ValidationError::OutOfDomain {
                family,
                param:  self.name,
                symbol: self.symbol,
                at:     ElementIndex(index),
                value,
                domain: self.domain,
            })
        }
    }

    /// Check a per-accumulator vector: length first, then every element.
    pub fn check_all(&self, family: ModelFamily, values: &[f64], expected: usize) -> ValidationResult<()> {
        if values.len() != expected {
            return Err(ValidationError::LengthMismatch {
                family,
                param:  self.name,
                symbol: self.symbol,
                expected,
                got:    values.len(),
            });
        }
        for (i, &v) in values.iter().enumerate() {
            self.check(family, v, Some(i))?;
        }
        Ok(())
    }

    /// Check the vector that defines the accumulator set and return its
    /// length.
    pub fn check_accumulators(&self, family: ModelFamily, values: &[f64]) -> ValidationResult<usize> {
        let n = self.check_accumulator_count(family, values.len())?;
        self.check_all(family, values, n)?;
        Ok(n)
    }

    fn check_accumulator_count(&self, family: ModelFamily, n: usize) -> ValidationResult<usize> {
        if n == 0 {
            return Err(ValidationError::NoAccumulators { family, param: self.name, symbol: self.symbol });
        }
        if n > MAX_ACCUMULATORS {
            return Err(ValidationError::TooManyAccumulators {
                family,
                param:  self.name,
                symbol: self.symbol,
                max:    MAX_ACCUMULATORS,
                got:    n,
            });
        }
        Ok(n)
    }

    fn missing(&self, family: ModelFamily) -> ValidationError {
        ValidationError::Missing { family, param: self.name, symbol: self.symbol }
    }
}

// ── ParamReader ───────────────────────────────────────────────────────────────

/// How a family decides its number of choices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChoiceCount {
    /// Fixed by the family (DDM = 2, Wald = 1).
    Fixed(usize),
    /// Taken from the length of this per-choice parameter.
    FromParam(ParamSchema),
}

/// Validating view over a [`RawParams`] for one family.
///
/// Construction rejects unknown or duplicated keys and settles the number of
/// choices; the accessors then fetch, default, shape-check, and domain-check
/// individual parameters.
pub struct ParamReader<'a> {
    family:    ModelFamily,
    raw:       &'a RawParams,
    n_choices: usize,
}

impl<'a> ParamReader<'a> {
    pub fn new(
        family: ModelFamily,
        schema: &[ParamSchema],
        raw:    &'a RawParams,
        count:  ChoiceCount,
    ) -> ValidationResult<Self> {
        for (key, _) in raw.iter() {
            if !schema.iter().any(|p| p.is_named(key)) {
                return Err(ValidationError::Unknown { family, name: key.to_owned() });
            }
        }
        for p in schema {
            if p.name != p.symbol && raw.get(p.name).is_some() && raw.get(p.symbol).is_some() {
                return Err(ValidationError::Duplicate { family, param: p.name, symbol: p.symbol });
            }
        }

        let n_choices = match count {
            ChoiceCount::Fixed(n) => n,
            ChoiceCount::FromParam(p) => match lookup(raw, &p) {
                None => return Err(p.missing(family)),
                Some(ParamValue::Scalar(_)) => {
                    return Err(ValidationError::ExpectedVector { family, param: p.name, symbol: p.symbol });
                }
                Some(ParamValue::Vector(v)) => p.check_accumulator_count(family, v.len())?,
            },
        };

        Ok(Self { family, raw, n_choices })
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn n_choices(&self) -> usize {
        self.n_choices
    }

    /// Fetch a scalar parameter (or its default) and check its domain.
    pub fn scalar(&self, p: &ParamSchema) -> ValidationResult<f64> {
        match lookup(self.raw, p) {
            Some(ParamValue::Scalar(v)) => p.check(self.family, *v, None),
            Some(ParamValue::Vector(v)) => Err(ValidationError::ExpectedScalar {
                family: self.family,
                param:  p.name,
                symbol: p.symbol,
                len:    v.len(),
            }),
            None => match p.default {
                Some(d) => Ok(d),
                None => Err(p.missing(self.family)),
            },
        }
    }

    /// Fetch a per-choice parameter, broadcasting a scalar where the schema
    /// allows it, and check length and domain.
    pub fn per_choice(&self, p: &ParamSchema) -> ValidationResult<Vec<f64>> {
        let values = match lookup(self.raw, p) {
            Some(ParamValue::Vector(v)) => v.clone(),
            Some(ParamValue::Scalar(v)) => match p.kind {
                ParamKind::ScalarOrPerChoice | ParamKind::Scalar => vec![*v; self.n_choices],
                ParamKind::PerChoice => {
                    return Err(ValidationError::ExpectedVector {
                        family: self.family,
                        param:  p.name,
                        symbol: p.symbol,
                    });
                }
            },
            None => match p.default {
                Some(d) => vec![d; self.n_choices],
                None => return Err(p.missing(self.family)),
            },
        };
        p.check_all(self.family, &values, self.n_choices)?;
        Ok(values)
    }
}

fn lookup<'r>(raw: &'r RawParams, p: &ParamSchema) -> Option<&'r ParamValue> {
    raw.get(p.name).or_else(|| raw.get(p.symbol))
}
