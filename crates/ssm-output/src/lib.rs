//! `ssm-output`: output writers for the rust_ssm framework.
//!
//! | Backend | Files created (on first write of each kind) |
//! |---------|---------------------------------------------|
//! | CSV     | `outcomes.csv`, `trajectories.csv`          |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SampleOutputObserver`], which implements `ssm_sim::SampleObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ssm_output::{CsvWriter, SampleOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SampleOutputObserver::new(writer);
//! sim.trajectories(100, &mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SampleOutputObserver;
pub use row::{OutcomeRow, TrajectoryRow};
pub use writer::OutputWriter;
