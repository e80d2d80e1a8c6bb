//! `ssm-sim`: registry and batch runner for the rust_ssm framework.
//!
//! # Batch pipeline
//!
//! ```text
//! Registry::validate(family, raw)        → Specification
//! SimBuilder::new(&registry, spec)
//!     .config(RunConfig)                  (seed, threads, chunking, numerics)
//!     .cancel_token(token)
//!     .build()                           → Simulator
//! Simulator::sample(n, observer)         → OutcomeBatch
//! Simulator::trajectories(n, observer)   → Vec<Trajectory>
//! Simulator::density(outcomes, log)      → Vec<f64>
//! Simulator::log_likelihood(outcomes)    → f64
//! ```
//!
//! Draw `i` of a batch always uses `DrawRng::new(seed, DrawId(i))`, so a batch
//! does not depend on chunk size or thread count.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Runs draws and density evaluations on Rayon's thread pool.  |
//! | `serde`    | Forwards to `ssm-core/serde`.                               |
//!
//! # Quick-start
//!
//! ```rust
//! use ssm_core::{ModelFamily, RawParams, RunConfig};
//! use ssm_sim::{NoopObserver, Registry, SimBuilder};
//!
//! let registry = Registry::with_builtin_models();
//! let raw = RawParams::new().with("nu", 1.0).with("alpha", 0.8).with("tau", 0.3);
//! let spec = registry.validate(ModelFamily::DDM, &raw).unwrap();
//!
//! let sim = SimBuilder::new(&registry, spec).config(RunConfig::with_seed(42)).build().unwrap();
//! let batch = sim.sample(100, &mut NoopObserver).unwrap();
//! let ll = sim.log_likelihood(&batch.to_outcomes()).unwrap();
//! assert!(ll.is_finite());
//! ```

pub mod builder;
pub mod cancel;
pub mod observer;
pub mod registry;
pub mod simulator;


pub use builder::SimBuilder;
pub use cancel::CancelToken;
pub use observer::{NoopObserver, SampleObserver};
pub use registry::Registry;
pub use simulator::Simulator;
