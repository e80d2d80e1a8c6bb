//! Lognormal race.
//!
//! Accumulator `i` finishes after `exp(ν_i + σ_i ξ_i)` with `ξ_i` standard
//! normal; the fastest is the choice.  Draw order: one standard normal per
//! accumulator in index order.

use rand_distr::{Distribution, StandardNormal};

use ssm_core::{
    ChoiceCount, DensityConfig, DensityEval, Domain, DrawRng, ModelFamily, Outcome, ParamKind,
    ParamReader, ParamSchema, RawParams, SamplerConfig, SsmResult, ValidationResult,
};

use crate::model::first_finisher;
use crate::{SsmModel, decision_time, normal};

pub const NU: ParamSchema = ParamSchema::required("nu", "ν", ParamKind::PerChoice, Domain::Real);
pub const SIGMA: ParamSchema =
    ParamSchema::optional("sigma", "σ", ParamKind::ScalarOrPerChoice, Domain::Positive, 1.0);
pub const TAU: ParamSchema = ParamSchema::required("tau", "τ", ParamKind::Scalar, Domain::NonNegative);

pub const SCHEMA: &[ParamSchema] = &[NU, SIGMA, TAU];

/// Validated LNR parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LnrParams {
    nu:    Vec<f64>,
    sigma: Vec<f64>,
    tau:   f64,
}

impl LnrParams {
    pub fn new(nu: Vec<f64>, sigma: Vec<f64>, tau: f64) -> ValidationResult<Self> {
        let f = ModelFamily::LNR;
        let n = NU.check_accumulators(f, &nu)?;
        SIGMA.check_all(f, &sigma, n)?;
        Ok(Self { tau: TAU.check(f, tau, None)?, nu, sigma })
    }

    pub fn nu(&self) -> &[f64] {
        &self.nu
    }

    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }
}

impl Default for LnrParams {
    fn default() -> Self {
        Self { nu: vec![-1.0, -2.0], sigma: vec![1.0, 1.0], tau: 0.2 }
    }
}

/// The LNR family.
pub struct Lnr;

impl SsmModel for Lnr {
    type Params = LnrParams;

    fn family(&self) -> ModelFamily {
        ModelFamily::LNR
    }

    fn schema(&self) -> &'static [ParamSchema] {
        SCHEMA
    }

    fn validate(&self, raw: &RawParams) -> ValidationResult<LnrParams> {
        let r = ParamReader::new(ModelFamily::LNR, SCHEMA, raw, ChoiceCount::FromParam(NU))?;
        LnrParams::new(r.per_choice(&NU)?, r.per_choice(&SIGMA)?, r.scalar(&TAU)?)
    }

    fn default_params(&self) -> LnrParams {
        LnrParams::default()
    }

    fn n_choices(&self, params: &LnrParams) -> usize {
        params.nu.len()
    }

    fn non_decision_time(&self, params: &LnrParams) -> f64 {
        params.tau
    }

    fn sample(&self, p: &LnrParams, rng: &mut DrawRng, _cfg: &SamplerConfig) -> SsmResult<Outcome> {
        let times: Vec<f64> = p
            .nu
            .iter()
            .zip(&p.sigma)
            .map(|(nu, sigma)| {
                let xi: f64 = StandardNormal.sample(rng.inner());
                (nu + sigma * xi).exp()
            })
            .collect();
        let (choice, t) = first_finisher(ModelFamily::LNR, times)?;
        Ok(Outcome::new(choice, t + p.tau))
    }

    fn log_density(&self, p: &LnrParams, outcome: Outcome, _cfg: &DensityConfig) -> DensityEval {
        let Some(t) = decision_time(outcome, p.nu.len(), p.tau) else {
            return DensityEval::zero();
        };
        if t <= 0.0 {
            return DensityEval::zero();
        }
        let c = outcome.choice.index();
        let ln_t = t.ln();
        let z = |i: usize| (ln_t - p.nu[i]) / p.sigma[i];

        let mut log_density = normal::ln_pdf(z(c)) - ln_t - p.sigma[c].ln();
        for j in (0..p.nu.len()).filter(|&j| j != c) {
            log_density += normal::ln_sf(z(j));
        }
        DensityEval::exact(log_density)
    }
}
