//! Plain data row types written by output backends.

use ssm_core::{OutcomeBatch, Trajectory};

/// One sampled outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeRow {
    pub draw:   u64,
    pub choice: u16,
    pub rt:     f64,
}

/// Evidence of one accumulator after one Euler step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryRow {
    pub draw:        u64,
    pub accumulator: u16,
    pub step:        u64,
    /// Wall-clock time of the step: non-decision time plus `step · dt`, on
    /// the same axis as RT.
    pub time:        f64,
    pub evidence:    f64,
}

impl OutcomeRow {
    /// Rows for a whole batch; draw `i` is row `i`.
    pub fn from_batch(batch: &OutcomeBatch) -> Vec<OutcomeRow> {
        batch
            .iter()
            .enumerate()
            .map(|(i, o)| OutcomeRow { draw: i as u64, choice: o.choice.0, rt: o.rt })
            .collect()
    }
}

impl TrajectoryRow {
    /// Rows for every accumulator and step of `t`, accumulator-major.
    pub fn from_trajectory(t: &Trajectory) -> Vec<TrajectoryRow> {
        t.paths
            .iter()
            .enumerate()
            .flat_map(|(a, path)| {
                path.iter().enumerate().map(move |(s, &evidence)| TrajectoryRow {
                    draw:        t.draw.0,
                    accumulator: a as u16,
                    step:        s as u64,
                    time:        t.non_decision_time + t.time_at(s),
                    evidence,
                })
            })
            .collect()
    }
}
