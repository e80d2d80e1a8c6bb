//! CSV output backend.
//!
//! Writes up to two files in the configured output directory, each created
//! with its header row on the first write of its kind:
//! - `outcomes.csv` (`draw,choice,rt`)
//! - `trajectories.csv` (`draw,accumulator,step,time,evidence`)
//!
//! A plain sampling job therefore leaves no `trajectories.csv` behind.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::debug;

use crate::writer::OutputWriter;
use crate::{OutcomeRow, OutputResult, TrajectoryRow};

const OUTCOME_HEADER: [&str; 3] = ["draw", "choice", "rt"];
const TRAJECTORY_HEADER: [&str; 5] = ["draw", "accumulator", "step", "time", "evidence"];

/// Writes sampler output to CSV files in one directory.
pub struct CsvWriter {
    dir:          PathBuf,
    outcomes:     Option<Writer<File>>,
    trajectories: Option<Writer<File>>,
    rows_written: u64,
    finished:     bool,
}

impl CsvWriter {
    /// Target `dir`, which must already exist.  Files are created lazily.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        if !std::fs::metadata(dir)?.is_dir() {
            let msg = format!("{} is not a directory", dir.display());
            return Err(io::Error::new(io::ErrorKind::NotADirectory, msg).into());
        }
        Ok(Self {
            dir:          dir.to_path_buf(),
            outcomes:     None,
            trajectories: None,
            rows_written: 0,
            finished:     false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// The writer in `slot`, opening `dir/name` and writing `header` first if
/// this is the slot's first use.
fn open<'w>(
    slot:   &'w mut Option<Writer<File>>,
    dir:    &Path,
    name:   &str,
    header: &[&str],
) -> OutputResult<&'w mut Writer<File>> {
    let w = match slot.take() {
        Some(w) => w,
        None => {
            let mut w = Writer::from_path(dir.join(name))?;
            w.write_record(header)?;
            w
        }
    };
    Ok(slot.insert(w))
}

impl OutputWriter for CsvWriter {
    fn write_outcomes(&mut self, rows: &[OutcomeRow]) -> OutputResult<()> {
        let w = open(&mut self.outcomes, &self.dir, "outcomes.csv", &OUTCOME_HEADER)?;
        for row in rows {
            w.write_record(&[row.draw.to_string(), row.choice.to_string(), row.rt.to_string()])?;
        }
        self.rows_written += rows.len() as u64;
        Ok(())
    }

    fn write_trajectory(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()> {
        let w = open(&mut self.trajectories, &self.dir, "trajectories.csv", &TRAJECTORY_HEADER)?;
        for row in rows {
            w.write_record(&[
                row.draw.to_string(),
                row.accumulator.to_string(),
                row.step.to_string(),
                row.time.to_string(),
                row.evidence.to_string(),
            ])?;
        }
        self.rows_written += rows.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        for w in [&mut self.outcomes, &mut self.trajectories].into_iter().flatten() {
            w.flush()?;
        }
        debug!(rows = self.rows_written, dir = %self.dir.display(), "CSV output flushed");
        Ok(())
    }
}
