//! Fluent builder for constructing a [`Simulator`].

use ssm_core::{RunConfig, SsmResult};
use ssm_models::Specification;

use crate::{CancelToken, Registry, Simulator};

/// Fluent builder for [`Simulator`].
///
/// # Required inputs
///
/// - [`Registry`]: resolves the specification's family to its model
/// - [`Specification`]: validated parameters
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                 |
/// |---------------------|-------------------------|
/// | `.config(c)`        | `RunConfig::default()`  |
/// | `.cancel_token(t)`  | A fresh, unshared token |
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimBuilder::new(&registry, spec)
///     .config(RunConfig::with_seed(7))
///     .cancel_token(token.clone())
///     .build()?;
/// let batch = sim.sample(10_000, &mut NoopObserver)?;
/// ```
pub struct SimBuilder<'r> {
    registry: &'r Registry,
    spec:     Specification,
    config:   Option<RunConfig>,
    cancel:   Option<CancelToken>,
}

impl<'r> SimBuilder<'r> {
    pub fn new(registry: &'r Registry, spec: Specification) -> Self {
        Self { registry, spec, config: None, cancel: None }
    }

    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the configuration, resolve the model, and return a ready
    /// [`Simulator`].
    pub fn build(self) -> SsmResult<Simulator> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let model = self.registry.dispatch(self.spec.family())?.clone();
        Simulator::new(model, self.spec, config, self.cancel.unwrap_or_default())
    }
}
