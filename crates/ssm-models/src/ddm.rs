//! Diffusion Decision Model.
//!
//! A single accumulator starts at `z·α` and follows
//! `dX = ν dt + σ dW` until it leaves `[0, α]`.  `Choice::UPPER` (0) is the
//! boundary at `α`, `Choice::LOWER` (1) the boundary at 0.
//!
//! # Sampling
//!
//! Euler scheme with step `SamplerConfig::dt`: each step draws one standard
//! normal `ξ` and adds `ν·dt + σ·√dt·ξ`; the first step that ends at or
//! beyond a boundary decides the choice and `RT = steps·dt + τ`.  Because
//! crossings are only seen at step ends, decision times are biased upward by
//! the boundary overshoot, roughly `0.58·σ·√dt / |ν|` seconds for a clear
//! drift (≈ 0.02 s at the default `dt = 1e-3`, σ = ν = 1).  Shrink `dt` when
//! that matters.
//!
//! # Density
//!
//! Navarro & Fuss (2009) first-passage density.  The standardised density
//! (unit boundary, zero drift) is evaluated with whichever of the small-time
//! and large-time series needs fewer terms for the configured tolerance.  The
//! series is accumulated term by term and stops once the magnitude bound of
//! the next term, taken after the term envelope has peaked, is below
//! `DensityConfig::series_tolerance` times the partial sum.  Hitting
//! `DensityConfig::max_terms` first returns the partial sum with a
//! `NumericalWarning`.  Both series are summed in log space relative to their
//! leading term so neither underflows at extreme times.

use std::f64::consts::PI;

use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

use ssm_core::{
    Choice, ChoiceCount, DensityConfig, DensityEval, Domain, DrawId, DrawRng, ModelFamily, NumericalWarning,
    Outcome, ParamKind, ParamReader, ParamSchema, RawParams, SamplerConfig, SsmError, SsmResult, Trajectory,
    ValidationResult,
};

use crate::{SsmModel, decision_time};

// ── Schema ────────────────────────────────────────────────────────────────────

pub const NU: ParamSchema = ParamSchema::required("nu", "ν", ParamKind::Scalar, Domain::Real);
pub const ALPHA: ParamSchema = ParamSchema::required("alpha", "α", ParamKind::Scalar, Domain::Positive);
pub const TAU: ParamSchema = ParamSchema::required("tau", "τ", ParamKind::Scalar, Domain::NonNegative);
pub const Z: ParamSchema = ParamSchema::optional("z", "z", ParamKind::Scalar, Domain::OpenUnit, 0.5);
pub const SIGMA: ParamSchema = ParamSchema::optional("sigma", "σ", ParamKind::Scalar, Domain::Positive, 1.0);

pub const SCHEMA: &[ParamSchema] = &[NU, ALPHA, TAU, Z, SIGMA];

// ── DdmParams ─────────────────────────────────────────────────────────────────

/// Validated DDM parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DdmParams {
    nu:    f64,
    alpha: f64,
    tau:   f64,
    z:     f64,
    sigma: f64,
}

impl DdmParams {
    /// Drift `ν`, boundary separation `α`, non-decision time `τ`, relative
    /// starting point `z`; unit diffusion noise.
    pub fn new(nu: f64, alpha: f64, tau: f64, z: f64) -> ValidationResult<Self> {
        Self::with_sigma(nu, alpha, tau, z, 1.0)
    }

    pub fn with_sigma(nu: f64, alpha: f64, tau: f64, z: f64, sigma: f64) -> ValidationResult<Self> {
        let f = ModelFamily::DDM;
        Ok(Self {
            nu:    NU.check(f, nu, None)?,
            alpha: ALPHA.check(f, alpha, None)?,
            tau:   TAU.check(f, tau, None)?,
            z:     Z.check(f, z, None)?,
            sigma: SIGMA.check(f, sigma, None)?,
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

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Drift and boundary rescaled to unit diffusion noise.
    fn unit_scale(&self) -> (f64, f64) {
        (self.nu / self.sigma, self.alpha / self.sigma)
    }

    /// Analytic probability of `choice` (0 for labels other than upper/lower).
    pub fn choice_probability(&self, choice: Choice) -> f64 {
        let (v, a) = self.unit_scale();
        match choice {
            Choice::UPPER => upper_probability(v, a, self.z),
            Choice::LOWER => 1.0 - upper_probability(v, a, self.z),
            _ => 0.0,
        }
    }

    /// Analytic mean decision time (RT minus τ), both boundaries pooled.
    pub fn mean_decision_time(&self) -> f64 {
        let (v, a) = self.unit_scale();
        if v.abs() < 1e-12 {
            return self.z * (1.0 - self.z) * a * a;
        }
        a * (upper_probability(v, a, self.z) - self.z) / v
    }
}

impl Default for DdmParams {
    fn default() -> Self {
        Self { nu: 1.0, alpha: 0.8, tau: 0.3, z: 0.5, sigma: 1.0 }
    }
}

/// P(hit α) for unit noise, drift `v`, boundary `a`, relative start `w`.
fn upper_probability(v: f64, a: f64, w: f64) -> f64 {
    if v.abs() < 1e-12 {
        w
    } else if v > 0.0 {
        (-2.0 * v * a * w).exp_m1() / (-2.0 * v * a).exp_m1()
    } else {
        1.0 - upper_probability(-v, a, 1.0 - w)
    }
}

// ── Ddm ───────────────────────────────────────────────────────────────────────

/// The DDM family.
pub struct Ddm;

impl Ddm {
    /// Euler walk shared by `sample` and `trajectory`.  `record` sees the
    /// starting point and the state after every step.
    fn walk(
        &self,
        p:      &DdmParams,
        rng:    &mut DrawRng,
        cfg:    &SamplerConfig,
        mut record: impl FnMut(f64),
    ) -> SsmResult<(Choice, u64)> {
        let mut x = p.z * p.alpha;
        let drift = p.nu * cfg.dt;
        let noise = p.sigma * cfg.dt.sqrt();
        record(x);

        for step in 1..=cfg.max_steps {
            let xi: f64 = StandardNormal.sample(rng.inner());
            x += drift + noise * xi;
            record(x);
            if x >= p.alpha {
                return Ok((Choice::UPPER, step));
            }
            if x <= 0.0 {
                return Ok((Choice::LOWER, step));
            }
        }

        debug!(max_steps = cfg.max_steps, nu = p.nu, alpha = p.alpha, "DDM path never left the boundaries");
        Err(SsmError::SamplingExhaustion {
            family:   ModelFamily::DDM,
            attempts: cfg.max_steps,
            reason:   format!(
                "evidence path stayed inside [0, {}] for {} steps of {} s",
                p.alpha, cfg.max_steps, cfg.dt
            ),
        })
    }
}

impl SsmModel for Ddm {
    type Params = DdmParams;

    fn family(&self) -> ModelFamily {
        ModelFamily::DDM
    }

    fn schema(&self) -> &'static [ParamSchema] {
        SCHEMA
    }

    fn validate(&self, raw: &RawParams) -> ValidationResult<DdmParams> {
        let r = ParamReader::new(ModelFamily::DDM, SCHEMA, raw, ChoiceCount::Fixed(2))?;
        DdmParams::with_sigma(
            r.scalar(&NU)?,
            r.scalar(&ALPHA)?,
            r.scalar(&TAU)?,
            r.scalar(&Z)?,
            r.scalar(&SIGMA)?,
        )
    }

    fn default_params(&self) -> DdmParams {
        DdmParams::default()
    }

    fn n_choices(&self, _params: &DdmParams) -> usize {
        2
    }

    fn non_decision_time(&self, params: &DdmParams) -> f64 {
        params.tau
    }

    fn sample(&self, p: &DdmParams, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Outcome> {
        let (choice, steps) = self.walk(p, rng, cfg, |_| {})?;
        Ok(Outcome::new(choice, steps as f64 * cfg.dt + p.tau))
    }

    fn log_density(&self, p: &DdmParams, outcome: Outcome, cfg: &DensityConfig) -> DensityEval {
        let Some(t) = decision_time(outcome, 2, p.tau) else {
            return DensityEval::zero();
        };
        if t <= 0.0 {
            return DensityEval::zero();
        }

        // The upper-boundary density is the lower-boundary density of the
        // mirrored process (drift −ν, start 1 − z).
        let (v, a) = p.unit_scale();
        let (v, w) = if outcome.choice == Choice::UPPER { (-v, 1.0 - p.z) } else { (v, p.z) };

        let u = t / (a * a);
        let series = standard_density(u, w, cfg);
        let log_density = series.ln_value - v * a * w - 0.5 * v * v * t - 2.0 * a.ln();

        let warning = (!series.converged).then_some(NumericalWarning {
            family:    ModelFamily::DDM,
            terms:     series.terms,
            last_term: series.next_bound,
            tolerance: cfg.series_tolerance,
        });
        DensityEval { log_density, warning }
    }

    fn trajectory(&self, p: &DdmParams, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Option<Trajectory>> {
        let mut path = Vec::new();
        let (choice, steps) = self.walk(p, rng, cfg, |x| path.push(x))?;
        Ok(Some(Trajectory {
            draw:              DrawId::INVALID,
            dt:                cfg.dt,
            non_decision_time: p.tau,
            paths:             vec![path],
            outcome:           Outcome::new(choice, steps as f64 * cfg.dt + p.tau),
        }))
    }
}

// ── Navarro–Fuss series ───────────────────────────────────────────────────────

/// Result of one truncated series evaluation.
struct Series {
    /// ln of the standardised density.
    ln_value:   f64,
    terms:      usize,
    converged:  bool,
    /// Magnitude bound (relative to the leading term) of the first term left
    /// out.
    next_bound: f64,
}

/// Lower-boundary first-passage density at time `u` for a zero-drift process
/// on `[0, 1]` starting at `w`.
fn standard_density(u: f64, w: f64, cfg: &DensityConfig) -> Series {
    let eps = cfg.series_tolerance;
    if small_time_terms(u, eps) < large_time_terms(u, eps) {
        small_time_series(u, w, cfg)
    } else {
        large_time_series(u, w, cfg)
    }
}

/// Navarro–Fuss bound on the number of small-time terms for error `eps`.
fn small_time_terms(u: f64, eps: f64) -> f64 {
    let c = 2.0 * (2.0 * PI * u).sqrt() * eps;
    if c < 1.0 {
        (2.0 + (-2.0 * u * c.ln()).sqrt()).max(u.sqrt() + 1.0)
    } else {
        2.0
    }
}

/// Navarro–Fuss bound on the number of large-time terms for error `eps`.
fn large_time_terms(u: f64, eps: f64) -> f64 {
    let peak = 1.0 / (PI * u.sqrt());
    let c = PI * u * eps;
    if c < 1.0 {
        (-2.0 * c.ln() / (PI * PI * u)).sqrt().max(peak)
    } else {
        peak
    }
}

/// `(2πu³)^{-1/2} Σ_k (w + 2k) exp(−(w + 2k)² / 2u)`, summed symmetrically
/// outwards from k = 0 with every term scaled by `exp(w² / 2u)`.
fn small_time_series(u: f64, w: f64, cfg: &DensityConfig) -> Series {
    let tol = cfg.series_tolerance;
    let sqrt_u = u.sqrt();
    let mut sum = w;
    let mut terms = 1;
    let mut j = 1.0_f64;

    let (converged, next_bound) = loop {
        // Pair k = ±j, each relative to the k = 0 term's exponent.
        let up = (w + 2.0 * j) * (-2.0 * j * (w + j) / u).exp();
        let down = (w - 2.0 * j) * (-2.0 * j * (j - w) / u).exp();
        let bound = up.abs() + down.abs();
        if 2.0 * j - 1.0 >= sqrt_u && bound <= tol * sum.abs() {
            break (true, bound);
        }
        if terms >= cfg.max_terms {
            break (false, bound);
        }
        sum += up + down;
        terms += 1;
        j += 1.0;
    };

    let ln_value = if sum > 0.0 {
        -w * w / (2.0 * u) + sum.ln() - 0.5 * (2.0 * PI * u * u * u).ln()
    } else {
        f64::NEG_INFINITY
    };
    Series { ln_value, terms, converged, next_bound }
}

/// `π Σ_{k≥1} k exp(−k²π²u / 2) sin(kπw)`, every term scaled by
/// `exp(π²u / 2)`.
fn large_time_series(u: f64, w: f64, cfg: &DensityConfig) -> Series {
    let tol = cfg.series_tolerance;
    let peak = 1.0 / (PI * u.sqrt());
    let mut sum = 0.0_f64;
    let mut terms = 0;
    let mut k = 1.0_f64;

    let (converged, next_bound) = loop {
        let envelope = k * (-(k * k - 1.0) * PI * PI * u / 2.0).exp();
        if k > peak && terms > 0 && envelope <= tol * sum.abs() {
            break (true, envelope);
        }
        if terms >= cfg.max_terms {
            break (false, envelope);
        }
        sum += envelope * (k * PI * w).sin();
        terms += 1;
        k += 1.0;
    };

    let ln_value = if sum > 0.0 {
        PI.ln() - PI * PI * u / 2.0 + sum.ln()
    } else {
        f64::NEG_INFINITY
    };
    Series { ln_value, terms, converged, next_bound }
}

#[cfg(test)]
pub(crate) fn series_for_tests(u: f64, w: f64, cfg: &DensityConfig, small: bool) -> (f64, usize, bool) {
    let s = if small { small_time_series(u, w, cfg) } else { large_time_series(u, w, cfg) };
    (s.ln_value, s.terms, s.converged)
}
