//! Shifted Wald (single-boundary diffusion).
//!
//! Evidence starts at 0 and drifts with rate `ν > 0` and unit noise towards
//! threshold `α`; the first-passage time is inverse Gaussian with mean `α/ν`
//! and shape `α²`.  There is only one response, `Choice(0)`.
//!
//! Draw order: one inverse-Gaussian variate per draw.  Trajectory mode runs
//! the Euler path instead (one standard normal per step).

use rand_distr::{Distribution, InverseGaussian, StandardNormal};
use tracing::debug;

use ssm_core::{
    Choice, ChoiceCount, DensityConfig, DensityEval, Domain, DrawId, DrawRng, ModelFamily, Outcome, ParamKind,
    ParamReader, ParamSchema, RawParams, SamplerConfig, SsmError, SsmResult, Trajectory, ValidationResult,
};

use statrs::consts::LN_SQRT_2PI;

use crate::normal;
use crate::{SsmModel, decision_time};

pub const NU: ParamSchema = ParamSchema::required("nu", "ν", ParamKind::Scalar, Domain::Positive);
pub const ALPHA: ParamSchema = ParamSchema::required("alpha", "α", ParamKind::Scalar, Domain::Positive);
pub const TAU: ParamSchema = ParamSchema::required("tau", "τ", ParamKind::Scalar, Domain::NonNegative);

pub const SCHEMA: &[ParamSchema] = &[NU, ALPHA, TAU];

/// Validated Wald parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WaldParams {
    nu:    f64,
    alpha: f64,
    tau:   f64,
}

impl WaldParams {
    pub fn new(nu: f64, alpha: f64, tau: f64) -> ValidationResult<Self> {
        let f = ModelFamily::WALD;
        Ok(Self {
            nu:    NU.check(f, nu, None)?,
            alpha: ALPHA.check(f, alpha, None)?,
            tau:   TAU.check(f, tau, None)?,
        })
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }
}

impl Default for WaldParams {
    fn default() -> Self {
        Self { nu: 3.0, alpha: 0.5, tau: 0.13 }
    }
}

// ── First-passage helpers ─────────────────────────────────────────────────────
//
// Shared with the racing diffusion model.  `t > 0`, `nu > 0`, `dist > 0`.

/// ln of the inverse-Gaussian first-passage density over distance `dist`.
pub(crate) fn ln_pdf(t: f64, nu: f64, dist: f64) -> f64 {
    let r = dist - nu * t;
    dist.ln() - LN_SQRT_2PI - 1.5 * t.ln() - r * r / (2.0 * t)
}

/// First-passage cdf over distance `dist`.
pub(crate) fn cdf(t: f64, nu: f64, dist: f64) -> f64 {
    let sqrt_t = t.sqrt();
    let lead = normal::cdf((nu * t - dist) / sqrt_t);
    // e^{2νd}·Φ(−(νt + d)/√t) overflows naively for large 2νd.
    let tail = (2.0 * nu * dist + normal::ln_cdf(-(nu * t + dist) / sqrt_t)).exp();
    (lead + tail).clamp(0.0, 1.0)
}

/// Inverse-Gaussian first-passage time over `dist` at drift `nu`.
pub(crate) fn first_passage(nu: f64, dist: f64, rng: &mut DrawRng, family: ModelFamily) -> SsmResult<f64> {
    let ig = InverseGaussian::new(dist / nu, dist * dist).map_err(|e| SsmError::SamplingExhaustion {
        family,
        attempts: 0,
        reason:   format!("inverse Gaussian with mean {} and shape {} rejected: {e:?}", dist / nu, dist * dist),
    })?;
    let t: f64 = ig.sample(rng.inner());
    if !t.is_finite() {
        return Err(SsmError::SamplingExhaustion {
            family,
            attempts: 1,
            reason:   format!("first-passage time over {dist} at drift {nu} is not finite"),
        });
    }
    Ok(t)
}

/// The shifted Wald family.
pub struct Wald;

impl SsmModel for Wald {
    type Params = WaldParams;

    fn family(&self) -> ModelFamily {
        ModelFamily::WALD
    }

    fn schema(&self) -> &'static [ParamSchema] {
        SCHEMA
    }

    fn validate(&self, raw: &RawParams) -> ValidationResult<WaldParams> {
        let r = ParamReader::new(ModelFamily::WALD, SCHEMA, raw, ChoiceCount::Fixed(1))?;
        WaldParams::new(r.scalar(&NU)?, r.scalar(&ALPHA)?, r.scalar(&TAU)?)
    }

    fn default_params(&self) -> WaldParams {
        WaldParams::default()
    }

    fn n_choices(&self, _params: &WaldParams) -> usize {
        1
    }

    fn non_decision_time(&self, params: &WaldParams) -> f64 {
        params.tau
    }

    fn sample(&self, p: &WaldParams, rng: &mut DrawRng, _cfg: &SamplerConfig) -> SsmResult<Outcome> {
        let t = first_passage(p.nu, p.alpha, rng, ModelFamily::WALD)?;
        Ok(Outcome::new(Choice(0), t + p.tau))
    }

    fn log_density(&self, p: &WaldParams, outcome: Outcome, _cfg: &DensityConfig) -> DensityEval {
        match decision_time(outcome, 1, p.tau) {
            Some(t) if t > 0.0 => DensityEval::exact(ln_pdf(t, p.nu, p.alpha)),
            _ => DensityEval::zero(),
        }
    }

    fn trajectory(&self, p: &WaldParams, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Option<Trajectory>> {
        let drift = p.nu * cfg.dt;
        let noise = cfg.dt.sqrt();
        let mut x = 0.0;
        let mut path = vec![x];

        for step in 1..=cfg.max_steps {
            let xi: f64 = StandardNormal.sample(rng.inner());
            x += drift + noise * xi;
            path.push(x);
            if x >= p.alpha {
                return Ok(Some(Trajectory {
                    draw:              DrawId::INVALID,
                    dt:                cfg.dt,
                    non_decision_time: p.tau,
                    paths:             vec![path],
                    outcome:           Outcome::new(Choice(0), step as f64 * cfg.dt + p.tau),
                }));
            }
        }

        debug!(max_steps = cfg.max_steps, nu = p.nu, alpha = p.alpha, "Wald path never reached threshold");
        Err(SsmError::SamplingExhaustion {
            family:   ModelFamily::WALD,
            attempts: cfg.max_steps,
            reason:   format!("evidence path stayed below {} for {} steps of {} s", p.alpha, cfg.max_steps, cfg.dt),
        })
    }
}
