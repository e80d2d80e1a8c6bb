//! Type-erased specifications and the object-safe model interface used by the
//! registry.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use ssm_core::{
    DensityConfig, DensityEval, DrawRng, ModelFamily, Outcome, ParamSchema, RawParams, SamplerConfig,
    SsmError, SsmResult, Trajectory, ValidationResult,
};

use crate::SsmModel;

// ── Specification ─────────────────────────────────────────────────────────────

/// Parameter payloads that can travel inside a [`Specification`].
pub trait SpecParams: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> SpecParams for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A validated, immutable parameter set bound to exactly one model family.
///
/// Cloning is cheap (the payload is shared behind an `Arc`), so one
/// specification can be handed to every worker thread.
#[derive(Clone, Debug)]
pub struct Specification {
    family:            ModelFamily,
    n_choices:         usize,
    non_decision_time: f64,
    params:            Arc<dyn SpecParams>,
}

impl Specification {
    /// Wrap typed parameters of `model`.
    pub fn new<M: SsmModel>(model: &M, params: M::Params) -> Self {
        Self {
            family:            model.family(),
            n_choices:         model.n_choices(&params),
            non_decision_time: model.non_decision_time(&params),
            params:            Arc::new(params),
        }
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn n_choices(&self) -> usize {
        self.n_choices
    }

    pub fn non_decision_time(&self) -> f64 {
        self.non_decision_time
    }

    /// Typed view of the payload; `None` if `P` is not the payload type.
    pub fn params<P: Any>(&self) -> Option<&P> {
        SpecParams::as_any(&*self.params).downcast_ref::<P>()
    }
}

// ── DynModel ──────────────────────────────────────────────────────────────────

/// Object-safe face of an [`SsmModel`], working on [`Specification`]s.
///
/// Obtain one with [`erase`].
pub trait DynModel: Send + Sync {
    fn family(&self) -> ModelFamily;
    fn schema(&self) -> &'static [ParamSchema];
    fn validate(&self, raw: &RawParams) -> ValidationResult<Specification>;
    fn default_spec(&self) -> Specification;
    fn sample(&self, spec: &Specification, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Outcome>;
    fn log_density(&self, spec: &Specification, outcome: Outcome, cfg: &DensityConfig) -> SsmResult<DensityEval>;
    fn trajectory(
        &self,
        spec: &Specification,
        rng:  &mut DrawRng,
        cfg:  &SamplerConfig,
    ) -> SsmResult<Option<Trajectory>>;
}

/// Box a typed model behind the [`DynModel`] interface.
pub fn erase<M: SsmModel>(model: M) -> Arc<dyn DynModel> {
    Arc::new(Erased(model))
}

struct Erased<M>(M);

impl<M: SsmModel> Erased<M> {
    fn params<'s>(&self, spec: &'s Specification) -> SsmResult<&'s M::Params> {
        let expected = self.0.family();
        if spec.family() != expected {
            return Err(SsmError::FamilyMismatch { expected, got: spec.family() });
        }
        spec.params::<M::Params>()
            .ok_or(SsmError::FamilyMismatch { expected, got: spec.family() })
    }
}

impl<M: SsmModel> DynModel for Erased<M> {
    fn family(&self) -> ModelFamily {
        self.0.family()
    }

    fn schema(&self) -> &'static [ParamSchema] {
        self.0.schema()
    }

    fn validate(&self, raw: &RawParams) -> ValidationResult<Specification> {
        let params = self.0.validate(raw)?;
        Ok(Specification::new(&self.0, params))
    }

    fn default_spec(&self) -> Specification {
        Specification::new(&self.0, self.0.default_params())
    }

    fn sample(&self, spec: &Specification, rng: &mut DrawRng, cfg: &SamplerConfig) -> SsmResult<Outcome> {
        let params = self.params(spec)?;
        self.0.sample(params, rng, cfg)
    }

    fn log_density(&self, spec: &Specification, outcome: Outcome, cfg: &DensityConfig) -> SsmResult<DensityEval> {
        let params = self.params(spec)?;
        Ok(self.0.log_density(params, outcome, cfg))
    }

    fn trajectory(
        &self,
        spec: &Specification,
        rng:  &mut DrawRng,
        cfg:  &SamplerConfig,
    ) -> SsmResult<Option<Trajectory>> {
        let params = self.params(spec)?;
        self.0.trajectory(params, rng, cfg)
    }
}
