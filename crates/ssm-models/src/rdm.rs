//! Racing Diffusion Model.
//!
//! One Wiener accumulator per response, each with drift `ν_i > 0` and unit
//! noise, racing from a start point `U[0, A)` to the shared threshold
//! `b = A + k`.  The first to arrive is the choice.  With `A = 0` every
//! accumulator starts at 0 and finishing times are plain Wald.
//!
//! # Sampling
//!
//! The default sampler is exact: for each accumulator in index order, one
//! uniform start point (only when `A > 0`) then one inverse-Gaussian
//! first-passage time over the remaining distance `b − start`.
//!
//! Trajectory mode instead runs an Euler race with step
//! `SamplerConfig::dt`, drawing one standard normal per accumulator per step
//! in index order.  It carries the usual `O(√dt)` discretisation bias.
//!
//! # Density
//!
//! `f_c(t) · Π_{j≠c} S_j(t)` with the uniform-start Wald pdf/cdf of Logan,
//! Van Zandt, Verbruggen & Wagenmakers (2014).

use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

use ssm_core::{
    ChoiceCount, DensityConfig, DensityEval, Domain, DrawId, DrawRng, ModelFamily, Outcome, ParamKind,
    ParamReader, ParamSchema, RawParams, SamplerConfig, SsmError, SsmResult, Trajectory, ValidationResult,
};

use crate::model::{accumulator_label, first_finisher};
use crate::{SsmModel, decision_time, normal, wald};

pub const NU: ParamSchema = ParamSchema::required("nu", "ν", ParamKind::PerChoice, Domain::Positive);
pub const K: ParamSchema = ParamSchema::required("k", "k", ParamKind::Scalar, Domain::Positive);
pub const A: ParamSchema = ParamSchema::optional("A", "A", ParamKind::Scalar, Domain::NonNegative, 0.0);
pub const TAU: ParamSchema = ParamSchema::required("tau", "τ", ParamKind::Scalar, Domain::NonNegative);

pub const SCHEMA: &[ParamSchema] = &[NU, K, A, TAU];

/// Validated RDM parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RdmParams {
    nu:  Vec<f64>,
    k:   f64,
    a:   f64,
    tau: f64,
}

impl RdmParams {
    pub fn new(nu: Vec<f64>, k: f64, a: f64, tau: f64) -> ValidationResult<Self> {
        let f = ModelFamily::RDM;
        NU.check_accumulators(f, &nu)?;
        Ok(Self {
            k: K.check(f, k, None)?,
            a: A.check(f, a, None)?,
            tau: TAU.check(f, tau, None)?,
            nu,
        })
    }

    pub fn nu(&self) -> &[f64] {
        &self.nu
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Threshold `b = A + k`.
    pub fn threshold(&self) -> f64 {
        self.a + self.k
    }

    fn start_point(&self, rng: &mut DrawRng) -> f64 {
        if self.a > 0.0 { rng.gen_range(0.0..self.a) } else { 0.0 }
    }

    /// ln pdf of accumulator `i` finishing at decision time `t`.
    fn ln_finish_pdf(&self, i: usize, t: f64) -> f64 {
        let nu = self.nu[i];
        if self.a <= 0.0 {
            return wald::ln_pdf(t, nu, self.k);
        }
        let sqrt_t = t.sqrt();
        let alpha = (self.k - nu * t) / sqrt_t;
        let beta = (self.threshold() - nu * t) / sqrt_t;
        let pdf = (nu * (normal::cdf(beta) - normal::cdf(alpha)) + (normal::pdf(alpha) - normal::pdf(beta)) / sqrt_t)
            / self.a;
        pdf.max(0.0).ln()
    }

    /// ln survivor of accumulator `i` at decision time `t`.
    fn ln_survivor(&self, i: usize, t: f64) -> f64 {
        let nu = self.nu[i];
        if self.a <= 0.0 {
            return (-wald::cdf(t, nu, self.k)).ln_1p();
        }
        let (k, b) = (self.k, self.threshold());
        let sqrt_t = t.sqrt();
        let alpha = (k - nu * t) / sqrt_t;
        let beta = (b - nu * t) / sqrt_t;

        let i1 = sqrt_t
            * (-alpha * normal::cdf(-alpha) + normal::pdf(alpha) + beta * normal::cdf(-beta) - normal::pdf(beta));
        let far = (2.0 * nu * b + normal::ln_cdf(-(nu * t + b) / sqrt_t)).exp();
        let near = (2.0 * nu * k + normal::ln_cdf(-(nu * t + k) / sqrt_t)).exp();
        let i2 = (far - near) / (2.0 * nu) + (normal::cdf(beta) - normal::cdf(alpha)) / (2.0 * nu);

        let cdf = ((i1 + i2) / self.a).clamp(0.0, 1.0);
        (-cdf).ln_1p()
    }
}

impl Default for RdmParams {
    fn default() -> Self {
        Self { nu: vec![1.0, 2.0], k: 0.3, a: 0.7, tau: 0.2 }
    }
}

/// The RDM family.
pub struct Rdm;

impl SsmModel for Rdm {
    type Params = RdmParams;

    fn family(&self) -> ModelFamily {
        ModelFamily::RDM
    }

    fn schema(&self) -> &'static [ParamSchema] {
        SCHEMA
    }

    fn validate(&self, raw: &RawParams) -> ValidationResult<RdmParams> {
        let r = ParamReader::new(ModelFamily::RDM, SCHEMA, raw, ChoiceCount::FromParam(NU))?;
        RdmParams::new(r.per_choice(&NU)?, r.scalar(&K)?, r.scalar(&A)?, r.scalar(&TAU)?)
    }

    fn default_params(&self) -> RdmParams {
        RdmParams::default()
    }

    fn n_choices(&self, params: &RdmParams) -> usize {
        params.nu.len()
    }

    fn non_decision_time(&self, params: &RdmParams) -> f64 {
        params.tau
    }

    fn sample(&self, p: &RdmParams, rng: &mut DrawRng, _cfg: &SamplerConfig) -> SsmResult<Outcome> {
        let b = p.threshold();
        let mut times = Vec::with_capacity(p.nu.len());
        for &nu in &p.nu {
            let start = p.start_point(rng);
            times.push(wald::first_passage(nu, b - start, rng, ModelFamily::RDM)?);
        }
        let (choice, t) = first_finisher(ModelFamily::RDM, times)?;
        Ok(Outcome::new(choice, t + p.tau))
    }

    fn log_density(&self, p: &RdmParams, outcome: Outcome, _cfg: &DensityConfig) -> DensityEval {
        let Some(t) = decision_time(outcome, p.nu.len(), p.tau) else {
            return DensityEval::zero();
        };
        if t <= 0.0 {
            return DensityEval::zero();
        }
        let c = outcome.choice.index();
        let log_density = (0..p.nu.len())
            .filter(|&j| j != c)
            .fold(p.ln_finish_pdf(c, t), |acc, j| acc + p.ln_survivor(j, t));
        DensityEval::exact(log_density)
    }

    fn trajectory(&self, p: &RdmParams, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Option<Trajectory>> {
        let b = p.threshold();
        let noise = cfg.dt.sqrt();
        let mut x: Vec<f64> = p.nu.iter().map(|_| p.start_point(rng)).collect();
        let mut paths: Vec<Vec<f64>> = x.iter().map(|&x0| vec![x0]).collect();

        for step in 1..=cfg.max_steps {
            let mut winner = None;
            for (i, (xi, path)) in x.iter_mut().zip(paths.iter_mut()).enumerate() {
                let e: f64 = StandardNormal.sample(rng.inner());
                *xi += p.nu[i] * cfg.dt + noise * e;
                path.push(*xi);
                if winner.is_none() && *xi >= b {
                    winner = Some(i);
                }
            }
            if let Some(i) = winner {
                return Ok(Some(Trajectory {
                    draw:              DrawId::INVALID,
                    dt:                cfg.dt,
                    non_decision_time: p.tau,
                    paths,
                    outcome:           Outcome::new(accumulator_label(i), step as f64 * cfg.dt + p.tau),
                }));
            }
        }

        debug!(max_steps = cfg.max_steps, threshold = b, "RDM race produced no finisher");
        Err(SsmError::SamplingExhaustion {
            family:   ModelFamily::RDM,
            attempts: cfg.max_steps,
            reason:   format!("no accumulator reached {b} within {} steps of {} s", cfg.max_steps, cfg.dt),
        })
    }
}
