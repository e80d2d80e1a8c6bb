//! The `SsmModel` trait: the extension point for new model families.

use std::fmt;

use ssm_core::{
    Choice, DensityConfig, DensityEval, DrawRng, MAX_ACCUMULATORS, ModelFamily, Outcome, ParamSchema, RawParams,
    SamplerConfig, SsmError, SsmResult, Trajectory, ValidationResult,
};

/// One sequential sampling model family.
///
/// Implement this trait (and register the model in `ssm-sim`'s `Registry`)
/// to add a family; callers of the registry need no changes.
///
/// # Required behavior
///
/// - [`validate`][Self::validate] never clamps or defaults an invalid value;
///   only parameters whose schema entry has a default may be omitted.
/// - [`sample`][Self::sample] consumes randomness from `rng` in a fixed,
///   documented order so batches are reproducible.
/// - [`log_density`][Self::log_density] returns `−∞` (density 0) for an
///   outcome whose choice is not a valid label or whose RT is below the
///   non-decision time.  It never fails; numerical trouble degrades to a
///   best estimate with a `NumericalWarning` attached.
///
/// # Thread safety
///
/// Samplers and density evaluators run on many threads at once, so models
/// must be `Send + Sync`.  All per-draw state lives in the `DrawRng`.
pub trait SsmModel: Send + Sync + 'static {
    /// Validated, immutable parameter set.
    type Params: Clone + fmt::Debug + Send + Sync + 'static;

    fn family(&self) -> ModelFamily;

    /// Parameter names, symbols, shapes, domains, and defaults.
    fn schema(&self) -> &'static [ParamSchema];

    /// Check a raw mapping and build the typed parameters.
    fn validate(&self, raw: &RawParams) -> ValidationResult<Self::Params>;

    /// The family's documented default parameter set.
    fn default_params(&self) -> Self::Params;

    /// Number of valid choice labels (`0..n`).
    fn n_choices(&self, params: &Self::Params) -> usize;

    /// τ: the additive non-decision time.
    fn non_decision_time(&self, params: &Self::Params) -> f64;

    /// Generate one outcome.
    fn sample(&self, params: &Self::Params, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Outcome>;

    /// Joint log-density of one (choice, RT) pair.
    fn log_density(&self, params: &Self::Params, outcome: Outcome, cfg: &DensityConfig) -> DensityEval;

    /// Generate one outcome along with its discretised evidence path(s).
    ///
    /// Default: `Ok(None)`: the family has no path representation.  The
    /// returned trajectory's `draw` field is filled in by the caller.
    fn trajectory(
        &self,
        _params: &Self::Params,
        _rng:    &mut DrawRng,
        _cfg:    &SamplerConfig,
    ) -> SsmResult<Option<Trajectory>> {
        Ok(None)
    }
}

/// Decision time `rt − τ` of an outcome, or `None` when the outcome lies
/// outside the support (unknown choice, RT below τ, non-finite RT).
///
/// `Some(0.0)` is returned for RT exactly equal to τ; every family assigns
/// that point density 0.
#[inline]
pub fn decision_time(outcome: Outcome, n_choices: usize, tau: f64) -> Option<f64> {
    if outcome.choice.index() >= n_choices || !outcome.rt.is_finite() || outcome.rt < tau {
        return None;
    }
    Some(outcome.rt - tau)
}

/// Label and time of the earliest finisher; ties go to the lowest index.
///
/// Fails with `SamplingExhaustion` when no accumulator finished in finite
/// time.
pub(crate) fn first_finisher(family: ModelFamily, times: impl IntoIterator<Item = f64>) -> SsmResult<(Choice, f64)> {
    let mut best = (0usize, f64::INFINITY);
    for (i, t) in times.into_iter().enumerate() {
        if t < best.1 {
            best = (i, t);
        }
    }
    if !best.1.is_finite() {
        return Err(SsmError::SamplingExhaustion {
            family,
            attempts: 1,
            reason:   "no accumulator reached its threshold in finite time".into(),
        });
    }
    Ok((accumulator_label(best.0), best.1))
}

/// Choice label of accumulator `index`.  Validated parameter sets never
/// declare more than `MAX_ACCUMULATORS` accumulators.
#[inline]
pub(crate) fn accumulator_label(index: usize) -> Choice {
    debug_assert!(index < MAX_ACCUMULATORS);
    Choice(index as u16)
}
