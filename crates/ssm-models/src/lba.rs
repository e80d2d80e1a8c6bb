//! Linear Ballistic Accumulator.
//!
//! Each accumulator `i` starts at `U[0, A)` and rises linearly with a drift
//! rate drawn from `N(ν_i, σ_i)` truncated to positive values.  It finishes at
//! threshold `b = A + k` after `(b − start) / drift`; the earliest finisher is
//! the choice and `RT = min time + τ`.
//!
//! Draw order: for each accumulator in index order, one uniform start point,
//! then standard normals until the drift is positive (at most
//! `SamplerConfig::max_redraws` of them).

use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

use ssm_core::{
    ChoiceCount, DensityConfig, DensityEval, Domain, DrawRng, ModelFamily, Outcome, ParamKind,
    ParamReader, ParamSchema, RawParams, SamplerConfig, SsmError, SsmResult, ValidationResult,
};

use crate::model::first_finisher;
use crate::normal;
use crate::{SsmModel, decision_time};

pub const NU: ParamSchema = ParamSchema::required("nu", "ν", ParamKind::PerChoice, Domain::Real);
pub const A: ParamSchema = ParamSchema::required("A", "A", ParamKind::Scalar, Domain::Positive);
pub const K: ParamSchema = ParamSchema::required("k", "k", ParamKind::Scalar, Domain::Positive);
pub const TAU: ParamSchema = ParamSchema::required("tau", "τ", ParamKind::Scalar, Domain::NonNegative);
pub const SIGMA: ParamSchema =
    ParamSchema::optional("sigma", "σ", ParamKind::ScalarOrPerChoice, Domain::Positive, 1.0);

pub const SCHEMA: &[ParamSchema] = &[NU, A, K, TAU, SIGMA];

/// Validated LBA parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LbaParams {
    nu:    Vec<f64>,
    a:     f64,
    k:     f64,
    tau:   f64,
    sigma: Vec<f64>,
}

impl LbaParams {
    /// Mean drifts `ν`, start-point range `A`, threshold offset `k`,
    /// non-decision time `τ`; unit drift standard deviation.
    pub fn new(nu: Vec<f64>, a: f64, k: f64, tau: f64) -> ValidationResult<Self> {
        let sigma = vec![1.0; nu.len()];
        Self::with_sigma(nu, a, k, tau, sigma)
    }

    pub fn with_sigma(nu: Vec<f64>, a: f64, k: f64, tau: f64, sigma: Vec<f64>) -> ValidationResult<Self> {
        let f = ModelFamily::LBA;
        let n = NU.check_accumulators(f, &nu)?;
        SIGMA.check_all(f, &sigma, n)?;
        Ok(Self {
            a: A.check(f, a, None)?,
            k: K.check(f, k, None)?,
            tau: TAU.check(f, tau, None)?,
            nu,
            sigma,
        })
    }

    pub fn nu(&self) -> &[f64] {
        &self.nu
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// Threshold `b = A + k`.
    pub fn threshold(&self) -> f64 {
        self.a + self.k
    }

    /// ln pdf of accumulator `i` finishing at decision time `t`, conditional
    /// on a positive drift.
    ///
    /// With `h(z) = v·(1 − Φ(z)) + s·φ(z)` the unconditional pdf is
    /// `(h(z1) − h(z2)) / A`.  Both terms are kept in log space so fast
    /// responses, where every Φ rounds to 1, stay finite.
    fn ln_finish_pdf(&self, i: usize, t: f64) -> f64 {
        let (v, s, a, b) = (self.nu[i], self.sigma[i], self.a, self.threshold());
        let ts = t * s;
        let h1 = ln_h((b - a - t * v) / ts, v, s);
        let h2 = ln_h((b - t * v) / ts, v, s);
        let gap = h2 - h1;
        if gap.is_nan() || gap >= 0.0 {
            return f64::NEG_INFINITY;
        }
        h1 + (-gap.exp_m1()).ln() - a.ln() - normal::ln_cdf(v / s)
    }

    /// Finishing-time cdf of accumulator `i` at decision time `t`,
    /// conditional on a positive drift.
    fn finish_cdf(&self, i: usize, t: f64) -> f64 {
        let (v, s, a, b) = (self.nu[i], self.sigma[i], self.a, self.threshold());
        let mass = normal::cdf(v / s);
        if mass <= 0.0 {
            return 0.0;
        }
        let ts = t * s;
        let z1 = (b - a - t * v) / ts;
        let z2 = (b - t * v) / ts;
        let cdf = 1.0 + ((b - a - t * v) / a) * normal::cdf(z1) - ((b - t * v) / a) * normal::cdf(z2)
            + (ts / a) * normal::pdf(z1)
            - (ts / a) * normal::pdf(z2);
        cdf.clamp(0.0, mass) / mass
    }
}

/// `ln(v·(1 − Φ(z)) + s·φ(z))`, positive for every `z` reachable at `t > 0`.
fn ln_h(z: f64, v: f64, s: f64) -> f64 {
    if v > 0.0 {
        ln_add(v.ln() + normal::ln_sf(z), s.ln() + normal::ln_pdf(z))
    } else {
        // v ≤ 0 keeps z > 0, where the Mills ratio is bounded.
        let mills = (normal::ln_sf(z) - normal::ln_pdf(z)).exp();
        normal::ln_pdf(z) + (s + v * mills).ln()
    }
}

/// `ln(eˣ + eʸ)`.
fn ln_add(x: f64, y: f64) -> f64 {
    let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

impl Default for LbaParams {
    fn default() -> Self {
        Self { nu: vec![3.0, 2.0], a: 0.8, k: 0.2, tau: 0.3, sigma: vec![1.0, 1.0] }
    }
}

/// The LBA family.
pub struct Lba;

impl Lba {
    fn positive_drift(&self, p: &LbaParams, i: usize, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<f64> {
        for _ in 0..cfg.max_redraws {
            let xi: f64 = StandardNormal.sample(rng.inner());
            let drift = p.nu[i] + p.sigma[i] * xi;
            if drift > 0.0 {
                return Ok(drift);
            }
        }
        debug!(accumulator = i, nu = p.nu[i], sigma = p.sigma[i], "LBA drift redraws exhausted");
        Err(SsmError::SamplingExhaustion {
            family:   ModelFamily::LBA,
            attempts: u64::from(cfg.max_redraws),
            reason:   format!(
                "accumulator {i} drew no positive drift rate (ν = {}, σ = {})",
                p.nu[i], p.sigma[i]
            ),
        })
    }
}

impl SsmModel for Lba {
    type Params = LbaParams;

    fn family(&self) -> ModelFamily {
        ModelFamily::LBA
    }

    fn schema(&self) -> &'static [ParamSchema] {
        SCHEMA
    }

    fn validate(&self, raw: &RawParams) -> ValidationResult<LbaParams> {
        let r = ParamReader::new(ModelFamily::LBA, SCHEMA, raw, ChoiceCount::FromParam(NU))?;
        LbaParams::with_sigma(
            r.per_choice(&NU)?,
            r.scalar(&A)?,
            r.scalar(&K)?,
            r.scalar(&TAU)?,
            r.per_choice(&SIGMA)?,
        )
    }

    fn default_params(&self) -> LbaParams {
        LbaParams::default()
    }

    fn n_choices(&self, params: &LbaParams) -> usize {
        params.nu.len()
    }

    fn non_decision_time(&self, params: &LbaParams) -> f64 {
        params.tau
    }

    fn sample(&self, p: &LbaParams, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Outcome> {
        let b = p.threshold();
        let mut times = Vec::with_capacity(p.nu.len());
        for i in 0..p.nu.len() {
            let start = rng.gen_range(0.0..p.a);
            let drift = self.positive_drift(p, i, rng, cfg)?;
            times.push((b - start) / drift);
        }
        let (choice, t) = first_finisher(ModelFamily::LBA, times)?;
        Ok(Outcome::new(choice, t + p.tau))
    }

    fn log_density(&self, p: &LbaParams, outcome: Outcome, _cfg: &DensityConfig) -> DensityEval {
        let Some(t) = decision_time(outcome, p.nu.len(), p.tau) else {
            return DensityEval::zero();
        };
        if t <= 0.0 {
            return DensityEval::zero();
        }

        let c = outcome.choice.index();
        let mut log_density = p.ln_finish_pdf(c, t);
        for j in (0..p.nu.len()).filter(|&j| j != c) {
            log_density += (-p.finish_cdf(j, t)).ln_1p();
        }
        DensityEval::exact(log_density)
    }
}
