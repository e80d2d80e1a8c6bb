//! Family → model dispatch table.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use ssm_core::{ModelFamily, Outcome, OutcomeBatch, RawParams, RunConfig, SimRng, SsmError, SsmResult};
use ssm_models::{Ddm, DynModel, Lba, Lnr, Rdm, Specification, SsmModel, Wald, erase};

use crate::{NoopObserver, SimBuilder};

/// Table of registered model families.
///
/// Adding a family means implementing [`SsmModel`] and calling
/// [`register`][Self::register]; code that goes through the registry needs no
/// change.
///
/// ```rust
/// use ssm_core::ModelFamily;
/// use ssm_sim::Registry;
///
/// let registry = Registry::with_builtin_models();
/// assert!(registry.dispatch(ModelFamily::LBA).is_ok());
/// assert!(registry.get_by_name("ddm").is_ok());
/// assert!(registry.get_by_name("lca").is_err());
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    models: FxHashMap<ModelFamily, Arc<dyn DynModel>>,
}

impl Registry {
    /// A registry with no families.
    pub fn empty() -> Self {
        Self::default()
    }

    /// DDM, LBA, RDM, Wald, and LNR.
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::empty();
        registry.register(Ddm);
        registry.register(Lba);
        registry.register(Rdm);
        registry.register(Wald);
        registry.register(Lnr);
        registry
    }

    /// Add `model`, replacing (and returning) any model already registered
    /// for its family.
    pub fn register<M: SsmModel>(&mut self, model: M) -> Option<Arc<dyn DynModel>> {
        self.register_dyn(erase(model))
    }

    pub fn register_dyn(&mut self, model: Arc<dyn DynModel>) -> Option<Arc<dyn DynModel>> {
        let family = model.family();
        debug!(family = %family, params = model.schema().len(), "registering model family");
        self.models.insert(family, model)
    }

    /// The model registered for `family`.
    pub fn dispatch(&self, family: ModelFamily) -> SsmResult<&Arc<dyn DynModel>> {
        self.models
            .get(&family)
            .ok_or_else(|| SsmError::UnsupportedModel(family.name().to_owned()))
    }

    /// Case-insensitive lookup by family name.
    pub fn get_by_name(&self, name: &str) -> SsmResult<&Arc<dyn DynModel>> {
        self.models
            .iter()
            .find(|(family, _)| family.matches_name(name))
            .map(|(_, model)| model)
            .ok_or_else(|| SsmError::UnsupportedModel(name.trim().to_owned()))
    }

    pub fn contains(&self, family: ModelFamily) -> bool {
        self.models.contains_key(&family)
    }

    /// Registered families, sorted by name.
    pub fn families(&self) -> Vec<ModelFamily> {
        let mut families: Vec<ModelFamily> = self.models.keys().copied().collect();
        families.sort();
        families
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    // ── One-shot operations ───────────────────────────────────────────────

    /// Check `raw` against the schema of `family`.
    pub fn validate(&self, family: ModelFamily, raw: &RawParams) -> SsmResult<Specification> {
        Ok(self.dispatch(family)?.validate(raw)?)
    }

    /// Documented default specification of `family`.
    pub fn default_spec(&self, family: ModelFamily) -> SsmResult<Specification> {
        Ok(self.dispatch(family)?.default_spec())
    }

    /// Draw `n` outcomes with default numerics, seeding the batch from `rng`.
    ///
    /// Calling again with a `SimRng` in the same state reproduces the batch.
    pub fn sample(
        &self,
        family: ModelFamily,
        spec:   &Specification,
        n:      usize,
        rng:    &mut SimRng,
    ) -> SsmResult<OutcomeBatch> {
        check_family(family, spec)?;
        SimBuilder::new(self, spec.clone())
            .config(RunConfig::with_seed(rng.next_seed()))
            .build()?
            .sample(n, &mut NoopObserver)
    }

    /// Per-outcome density (or log-density with `log = true`) with default
    /// numerics.
    pub fn density(
        &self,
        family:   ModelFamily,
        spec:     &Specification,
        outcomes: &[Outcome],
        log:      bool,
    ) -> SsmResult<Vec<f64>> {
        check_family(family, spec)?;
        SimBuilder::new(self, spec.clone()).build()?.density(outcomes, log)
    }
}

fn check_family(family: ModelFamily, spec: &Specification) -> SsmResult<()> {
    if spec.family() == family {
        Ok(())
    } else {
        Err(SsmError::FamilyMismatch { expected: family, got: spec.family() })
    }
}
