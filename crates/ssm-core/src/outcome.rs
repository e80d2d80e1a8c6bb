//! Choice/RT outcomes, batches, trajectories, and density results.

use crate::{Choice, DrawId, NumericalWarning};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// One mixed discrete/continuous observation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub choice: Choice,
    /// Response time in seconds, non-decision time included.
    pub rt:     f64,
}

impl Outcome {
    #[inline]
    pub fn new(choice: Choice, rt: f64) -> Self {
        Self { choice, rt }
    }
}

// ── OutcomeBatch ──────────────────────────────────────────────────────────────

/// Structure-of-Arrays batch of outcomes in draw order.
///
/// `choices[i]` and `rts[i]` belong to draw `i`; both `Vec`s always have the
/// same length.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeBatch {
    choices: Vec<Choice>,
    rts:     Vec<f64>,
}

impl OutcomeBatch {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            choices: Vec::with_capacity(n),
            rts:     Vec::with_capacity(n),
        }
    }

    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let mut batch = Self::with_capacity(outcomes.len());
        for &o in outcomes {
            batch.push(o);
        }
        batch
    }

    #[inline]
    pub fn push(&mut self, outcome: Outcome) {
        self.choices.push(outcome.choice);
        self.rts.push(outcome.rt);
    }

    pub fn len(&self) -> usize {
        self.rts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rts.is_empty()
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn rts(&self) -> &[f64] {
        &self.rts
    }

    pub fn get(&self, i: usize) -> Option<Outcome> {
        Some(Outcome::new(*self.choices.get(i)?, *self.rts.get(i)?))
    }

    /// Iterate outcomes in draw order.
    pub fn iter(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.choices
            .iter()
            .zip(&self.rts)
            .map(|(&choice, &rt)| Outcome { choice, rt })
    }

    /// Array-of-structs copy.
    pub fn to_outcomes(&self) -> Vec<Outcome> {
        self.iter().collect()
    }

    /// Count per choice label for labels `0..n_choices`.  Out-of-range labels
    /// are not counted.
    pub fn choice_counts(&self, n_choices: usize) -> Vec<usize> {
        let mut counts = vec![0usize; n_choices];
        for c in &self.choices {
            if let Some(slot) = counts.get_mut(c.index()) {
                *slot += 1;
            }
        }
        counts
    }

    /// Mean response time, `None` for an empty batch.
    pub fn mean_rt(&self) -> Option<f64> {
        if self.rts.is_empty() {
            return None;
        }
        Some(self.rts.iter().sum::<f64>() / self.rts.len() as f64)
    }

    /// Response times of the draws that ended in `choice`, in draw order.
    pub fn rts_for(&self, choice: Choice) -> Vec<f64> {
        self.iter()
            .filter(|o| o.choice == choice)
            .map(|o| o.rt)
            .collect()
    }

    /// Mean response time of the draws that ended in `choice`, `None` if
    /// there are none.
    pub fn mean_rt_for(&self, choice: Choice) -> Option<f64> {
        let (n, sum) = self
            .iter()
            .filter(|o| o.choice == choice)
            .fold((0usize, 0.0_f64), |(n, sum), o| (n + 1, sum + o.rt));
        (n > 0).then(|| sum / n as f64)
    }
}

impl FromIterator<Outcome> for OutcomeBatch {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut batch = OutcomeBatch::default();
        for o in iter {
            batch.push(o);
        }
        batch
    }
}

// ── Trajectory ────────────────────────────────────────────────────────────────

/// Full evidence path(s) of one discretised draw.
///
/// `paths[a][s]` is the evidence of accumulator `a` after step `s`; step 0 is
/// the starting point, so every path has `steps + 1` entries.  The decision
/// clock of step `s` is `s * dt`; add `non_decision_time` for wall-clock RT.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    pub draw:              DrawId,
    pub dt:                f64,
    pub non_decision_time: f64,
    pub paths:             Vec<Vec<f64>>,
    pub outcome:           Outcome,
}

impl Trajectory {
    /// Number of Euler steps taken (0 if the draw finished immediately).
    pub fn steps(&self) -> usize {
        self.paths.first().map_or(0, |p| p.len().saturating_sub(1))
    }

    /// Decision-clock time of step `s`.
    #[inline]
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.dt
    }
}

// ── Density results ───────────────────────────────────────────────────────────

/// Log-density of one outcome plus an optional numerical warning.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DensityEval {
    /// `f64::NEG_INFINITY` for outcomes outside the support.
    pub log_density: f64,
    pub warning:     Option<NumericalWarning>,
}

impl DensityEval {
    #[inline]
    pub fn exact(log_density: f64) -> Self {
        Self { log_density, warning: None }
    }

    /// Density 0 / log-density −∞.
    #[inline]
    pub fn zero() -> Self {
        Self::exact(f64::NEG_INFINITY)
    }

    #[inline]
    pub fn density(&self) -> f64 {
        self.log_density.exp()
    }
}

/// Per-observation log densities of a batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DensityBatch {
    pub log_densities: Vec<f64>,
    /// `(observation index, warning)` for every degraded evaluation.
    pub warnings:      Vec<(usize, NumericalWarning)>,
}

impl DensityBatch {
    pub fn from_evals(evals: Vec<DensityEval>) -> Self {
        let mut warnings = Vec::new();
        let log_densities = evals
            .into_iter()
            .enumerate()
            .map(|(i, e)| {
                if let Some(w) = e.warning {
                    warnings.push((i, w));
                }
                e.log_density
            })
            .collect();
        Self { log_densities, warnings }
    }

    pub fn len(&self) -> usize {
        self.log_densities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_densities.is_empty()
    }

    /// Sum of log densities: the i.i.d. log-likelihood of the batch.
    pub fn log_likelihood(&self) -> f64 {
        self.log_densities.iter().sum()
    }

    /// Densities on the natural scale.
    pub fn densities(&self) -> Vec<f64> {
        self.log_densities.iter().map(|l| l.exp()).collect()
    }
}
