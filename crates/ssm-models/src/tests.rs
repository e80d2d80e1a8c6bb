//! Unit tests for ssm-models.

#[cfg(test)]
mod support {
    use ssm_core::{Choice, DensityConfig, DrawId, DrawRng, Outcome, SamplerConfig};

    use crate::SsmModel;

    /// `n` independent draws with per-draw RNGs, as the simulator makes them.
    pub fn draws<M: SsmModel>(model: &M, params: &M::Params, n: usize, seed: u64, cfg: &SamplerConfig) -> Vec<Outcome> {
        (0..n as u64)
            .map(|i| model.sample(params, &mut DrawRng::new(seed, DrawId(i)), cfg).unwrap())
            .collect()
    }

    /// Density of choice `c` at decision time `t`.
    pub fn density_at<M: SsmModel>(model: &M, params: &M::Params, c: usize, t: f64) -> f64 {
        let rt = model.non_decision_time(params) + t;
        model.log_density(params, Outcome::new(Choice(c as u16), rt), &DensityConfig::default()).density()
    }

    /// Cumulative trapezoid of `f` on `[0, hi]` with step `h`; entry `i` is
    /// the integral up to `i·h`.
    pub fn cumulative(f: impl Fn(f64) -> f64, hi: f64, h: f64) -> Vec<f64> {
        let n = (hi / h).round() as usize;
        let mut out = Vec::with_capacity(n + 1);
        let mut total = 0.0;
        let mut prev = f(0.0);
        out.push(0.0);
        for i in 1..=n {
            let y = f(i as f64 * h);
            total += 0.5 * h * (prev + y);
            prev = y;
            out.push(total);
        }
        out
    }

    pub fn integrate(f: impl Fn(f64) -> f64, hi: f64, h: f64) -> f64 {
        cumulative(f, hi, h).last().copied().unwrap_or(0.0)
    }

    /// Kolmogorov–Smirnov distance between decision times and a tabulated cdf.
    pub fn ks_distance(mut times: Vec<f64>, table: &[f64], h: f64) -> f64 {
        times.sort_by(f64::total_cmp);
        let n = times.len() as f64;
        let last = table.len() - 1;
        let cdf = |t: f64| {
            let x = (t / h).max(0.0);
            let i = x.floor() as usize;
            if i >= last {
                return table[last];
            }
            let frac = x - i as f64;
            table[i] + frac * (table[i + 1] - table[i])
        };
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let f = cdf(t);
                (f - i as f64 / n).abs().max((f - (i + 1) as f64 / n).abs())
            })
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod model {
    use ssm_core::{Choice, ModelFamily, Outcome, SsmError};

    use crate::decision_time;
    use crate::model::first_finisher;

    #[test]
    fn decision_time_support() {
        assert_eq!(decision_time(Outcome::new(Choice(0), 0.5), 2, 0.3), Some(0.5 - 0.3));
        assert_eq!(decision_time(Outcome::new(Choice(0), 0.3), 2, 0.3), Some(0.0));
        assert_eq!(decision_time(Outcome::new(Choice(0), 0.2), 2, 0.3), None);
        assert_eq!(decision_time(Outcome::new(Choice(2), 0.5), 2, 0.3), None);
        assert_eq!(decision_time(Outcome::new(Choice(0), f64::NAN), 2, 0.3), None);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        assert_eq!(first_finisher(ModelFamily::LBA, [0.4, 0.2, 0.2]), Ok((Choice(1), 0.2)));
        assert_eq!(first_finisher(ModelFamily::LBA, [0.1]), Ok((Choice(0), 0.1)));
        assert_eq!(first_finisher(ModelFamily::LBA, [f64::INFINITY, 0.3]), Ok((Choice(1), 0.3)));
    }

    #[test]
    fn race_without_finite_finisher_fails() {
        for times in [vec![f64::INFINITY, f64::INFINITY], vec![f64::NAN]] {
            match first_finisher(ModelFamily::LNR, times) {
                Err(SsmError::SamplingExhaustion { family, .. }) => assert_eq!(family, ModelFamily::LNR),
                other => panic!("expected exhaustion, got {other:?}"),
            }
        }
    }
}

#[cfg(test)]
mod ddm {
    use approx::assert_relative_eq;
    use ssm_core::{
        Choice, DensityConfig, DrawId, DrawRng, Outcome, RawParams, SamplerConfig, SsmError, ValidationError,
    };

    use super::support::{density_at, draws, integrate};
    use crate::ddm::series_for_tests;
    use crate::{Ddm, DdmParams, SsmModel};

    #[test]
    fn validate_from_names_and_symbols() {
        let raw = RawParams::new().with("nu", 1.0).with("α", 0.8).with("tau", 0.3);
        let p = Ddm.validate(&raw).unwrap();
        assert_eq!(p, DdmParams::default());
        assert_eq!(p.z(), 0.5);
        assert_eq!(p.sigma(), 1.0);
    }

    #[test]
    fn zero_boundary_names_alpha() {
        let raw = RawParams::new().with("nu", 1.0).with("alpha", 0.0).with("tau", 0.3);
        let err = Ddm.validate(&raw).unwrap_err();
        assert_eq!(err.param(), "alpha");
        assert!(matches!(err, ValidationError::OutOfDomain { .. }));
        assert!(err.to_string().contains('α'), "{err}");
        assert!(DdmParams::new(1.0, 0.0, 0.3, 0.5).is_err());
    }

    #[test]
    fn bias_must_lie_strictly_inside() {
        assert!(DdmParams::new(1.0, 0.8, 0.3, 0.0).is_err());
        assert!(DdmParams::new(1.0, 0.8, 0.3, 1.0).is_err());
        assert!(DdmParams::new(1.0, 0.8, -0.1, 0.5).is_err());
    }

    #[test]
    fn missing_tau() {
        let raw = RawParams::new().with("nu", 1.0).with("alpha", 0.8);
        assert!(matches!(Ddm.validate(&raw), Err(ValidationError::Missing { param: "tau", .. })));
    }

    #[test]
    fn choice_probabilities() {
        let p = DdmParams::default();
        let up = p.choice_probability(Choice::UPPER);
        assert_relative_eq!(up + p.choice_probability(Choice::LOWER), 1.0, epsilon = 1e-12);
        assert!(up > 0.5);
        assert_relative_eq!(up, (-0.8f64).exp_m1() / (-1.6f64).exp_m1(), epsilon = 1e-12);

        let unbiased = DdmParams::new(0.0, 1.0, 0.0, 0.3).unwrap();
        assert_relative_eq!(unbiased.choice_probability(Choice::UPPER), 0.3, epsilon = 1e-12);
        assert_relative_eq!(unbiased.mean_decision_time(), 0.21, epsilon = 1e-12);
        assert_eq!(p.choice_probability(Choice(2)), 0.0);
    }

    #[test]
    fn density_outside_support() {
        let p = DdmParams::default();
        let cfg = DensityConfig::default();
        assert_eq!(Ddm.log_density(&p, Outcome::new(Choice::UPPER, 0.3), &cfg).log_density, f64::NEG_INFINITY);
        assert_eq!(Ddm.log_density(&p, Outcome::new(Choice::UPPER, 0.2), &cfg).log_density, f64::NEG_INFINITY);
        assert_eq!(Ddm.log_density(&p, Outcome::new(Choice(2), 0.5), &cfg).log_density, f64::NEG_INFINITY);
    }

    #[test]
    fn mirror_symmetry() {
        let p = DdmParams::with_sigma(1.2, 1.1, 0.2, 0.35, 0.9).unwrap();
        let q = DdmParams::with_sigma(-1.2, 1.1, 0.2, 0.65, 0.9).unwrap();
        let cfg = DensityConfig::default();
        for rt in [0.25, 0.4, 0.9, 2.5] {
            let a = Ddm.log_density(&p, Outcome::new(Choice::UPPER, rt), &cfg).log_density;
            let b = Ddm.log_density(&q, Outcome::new(Choice::LOWER, rt), &cfg).log_density;
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn small_and_large_time_series_agree() {
        let cfg = DensityConfig { series_tolerance: 1e-12, max_terms: 1_000 };
        for u in [0.2, 0.5, 1.0, 2.0] {
            for w in [0.2, 0.5, 0.8] {
                let (small, _, small_ok) = series_for_tests(u, w, &cfg, true);
                let (large, _, large_ok) = series_for_tests(u, w, &cfg, false);
                assert!(small_ok && large_ok);
                assert_relative_eq!(small, large, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn normalises_and_matches_closed_forms() {
        for p in [DdmParams::default(), DdmParams::with_sigma(-1.5, 0.8, 0.1, 0.3, 0.8).unwrap()] {
            let up = integrate(|t| density_at(&Ddm, &p, 0, t), 10.0, 1e-3);
            let low = integrate(|t| density_at(&Ddm, &p, 1, t), 10.0, 1e-3);
            assert_relative_eq!(up + low, 1.0, epsilon = 1e-3);
            assert_relative_eq!(up, p.choice_probability(Choice::UPPER), epsilon = 1e-3);

            let mean = integrate(|t| t * (density_at(&Ddm, &p, 0, t) + density_at(&Ddm, &p, 1, t)), 10.0, 1e-3);
            assert_relative_eq!(mean, p.mean_decision_time(), epsilon = 1e-3);
        }
    }

    #[test]
    fn truncated_series_warns() {
        let p = DdmParams::new(0.5, 1.0, 0.0, 0.5).unwrap();
        let tight = DensityConfig { series_tolerance: 1e-12, max_terms: 1 };
        let eval = Ddm.log_density(&p, Outcome::new(Choice::LOWER, 1.0), &tight);
        let warning = eval.warning.expect("one term cannot reach 1e-12");
        assert_eq!(warning.terms, 1);
        assert!(eval.log_density.is_finite());

        let exact = Ddm.log_density(&p, Outcome::new(Choice::LOWER, 1.0), &DensityConfig::default());
        assert!(exact.warning.is_none());
        assert_relative_eq!(eval.log_density, exact.log_density, epsilon = 1e-5);
    }

    #[test]
    fn euler_sampler_matches_closed_forms() {
        let p = DdmParams::default();
        let cfg = SamplerConfig { dt: 1e-4, ..SamplerConfig::default() };
        let n = 4_000;
        let out = draws(&Ddm, &p, n, 7, &cfg);
        let upper = out.iter().filter(|o| o.choice == Choice::UPPER).count() as f64 / n as f64;
        assert!((upper - p.choice_probability(Choice::UPPER)).abs() < 0.03, "upper share {upper}");

        let mean_dt = out.iter().map(|o| o.rt - p.tau()).sum::<f64>() / n as f64;
        assert!((mean_dt - p.mean_decision_time()).abs() < 0.015, "mean decision time {mean_dt}");
        assert!(out.iter().all(|o| o.rt > p.tau()));
    }

    #[test]
    fn trajectory_replays_sample() {
        let p = DdmParams::default();
        let cfg = SamplerConfig::default();
        for i in 0..20 {
            let outcome = Ddm.sample(&p, &mut DrawRng::new(3, DrawId(i)), &cfg).unwrap();
            let traj = Ddm.trajectory(&p, &mut DrawRng::new(3, DrawId(i)), &cfg).unwrap().unwrap();
            assert_eq!(traj.outcome, outcome);
            assert_eq!(traj.paths.len(), 1);
            assert_eq!(traj.paths[0][0], p.z() * p.alpha());
            assert_relative_eq!(traj.time_at(traj.steps()) + p.tau(), outcome.rt, epsilon = 1e-9);

            let last = traj.paths[0][traj.steps()];
            if outcome.choice == Choice::UPPER {
                assert!(last >= p.alpha());
            } else {
                assert!(last <= 0.0);
            }
        }
    }

    #[test]
    fn step_budget_exhaustion() {
        let p = DdmParams::default();
        let cfg = SamplerConfig { dt: 1e-9, max_steps: 1, ..SamplerConfig::default() };
        let err = Ddm.sample(&p, &mut DrawRng::new(0, DrawId(0)), &cfg).unwrap_err();
        assert!(matches!(err, SsmError::SamplingExhaustion { attempts: 1, .. }));
    }
}

#[cfg(test)]
mod lba {
    use approx::assert_relative_eq;
    use ssm_core::{
        Choice, DensityConfig, DrawId, DrawRng, Outcome, ParamValue, RawParams, SamplerConfig, SsmError,
        ValidationError,
    };

    use super::support::{cumulative, density_at, draws, integrate, ks_distance};
    use crate::{Lba, LbaParams, SsmModel};

    #[test]
    fn validate_broadcasts_sigma() {
        let raw = RawParams::new().with("nu", [3.0, 2.0]).with("A", 0.8).with("k", 0.2).with("τ", 0.3);
        let p = Lba.validate(&raw).unwrap();
        assert_eq!(p, LbaParams::default());
        assert_eq!(Lba.n_choices(&p), 2);
        assert_relative_eq!(p.threshold(), 1.0);
    }

    #[test]
    fn shape_errors() {
        let base = || RawParams::new().with("A", 0.8).with("k", 0.2).with("tau", 0.3);
        let scalar_nu = base().with("nu", 3.0);
        assert!(matches!(Lba.validate(&scalar_nu), Err(ValidationError::ExpectedVector { param: "nu", .. })));

        let short_sigma = base().with("nu", [3.0, 2.0]).with("sigma", [1.0, 1.0, 1.0]);
        assert!(matches!(
            Lba.validate(&short_sigma),
            Err(ValidationError::LengthMismatch { expected: 2, got: 3, .. })
        ));

        let empty = base().with("nu", ParamValue::Vector(vec![]));
        assert!(matches!(Lba.validate(&empty), Err(ValidationError::NoAccumulators { .. })));

        let typo = base().with("nu", [3.0, 2.0]).with("b", 1.0);
        assert!(matches!(Lba.validate(&typo), Err(ValidationError::Unknown { .. })));
    }

    #[test]
    fn density_integrates_to_one() {
        for p in [LbaParams::default(), LbaParams::with_sigma(vec![1.0, 0.5, 1.5], 0.5, 0.4, 0.1, vec![0.8, 1.0, 1.2]).unwrap()] {
            let total: f64 = (0..p.nu().len()).map(|c| integrate(|t| density_at(&Lba, &p, c, t), 30.0, 1e-3)).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn sampler_agrees_with_density() {
        let p = LbaParams::default();
        let out = draws(&Lba, &p, 2_000, 11, &SamplerConfig::default());
        assert!(out.iter().all(|o| o.rt >= p.tau()));

        let table = cumulative(|t| density_at(&Lba, &p, 0, t) + density_at(&Lba, &p, 1, t), 30.0, 1e-3);
        let d = ks_distance(out.iter().map(|o| o.rt - p.tau()).collect(), &table, 1e-3);
        assert!(d < 2.0 / (2_000f64).sqrt(), "KS distance {d}");

        let p0 = integrate(|t| density_at(&Lba, &p, 0, t), 30.0, 1e-3);
        let share = out.iter().filter(|o| o.choice == Choice(0)).count() as f64 / 2_000.0;
        assert!((share - p0).abs() < 0.04, "share {share} vs {p0}");
    }

    #[test]
    fn fast_responses_keep_finite_log_density() {
        // Reference values from 400-digit evaluation of the closed form.
        let p = LbaParams::default();
        let cases = [
            (0, 0.005, -685.116_537_296_846_6),
            (0, 0.01, -145.032_439_108_735_5),
            (1, 0.01, -162.567_727_431_032_1),
            (0, 0.02, -24.843_567_218_645_55),
            (0, 0.3, -0.079_390_703_209_399_57),
            (1, 1.5, -8.979_383_794_322_528),
        ];
        for (c, t, expected) in cases {
            let eval = Lba.log_density(&p, Outcome::new(Choice(c), p.tau() + t), &DensityConfig::default());
            assert!(eval.log_density.is_finite(), "choice {c} at t = {t}");
            assert_relative_eq!(eval.log_density, expected, max_relative = 1e-6);
        }
    }

    #[test]
    fn negative_mean_drift_density_stays_finite() {
        let p = LbaParams::new(vec![-1.0, 0.5], 0.8, 0.2, 0.3).unwrap();
        for (t, expected) in [(0.01, -219.403_450_891_381_3), (2.0, -3.688_313_938_787_862)] {
            let eval = Lba.log_density(&p, Outcome::new(Choice(0), 0.3 + t), &DensityConfig::default());
            assert_relative_eq!(eval.log_density, expected, max_relative = 1e-6);
        }
    }

    #[test]
    fn hopeless_drift_exhausts_redraws() {
        let p = LbaParams::new(vec![-10.0, 1.0], 0.8, 0.2, 0.3).unwrap();
        let err = Lba.sample(&p, &mut DrawRng::new(0, DrawId(0)), &SamplerConfig::default()).unwrap_err();
        match err {
            SsmError::SamplingExhaustion { attempts, reason, .. } => {
                assert_eq!(attempts, 1_000);
                assert!(reason.contains("accumulator 0"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[cfg(test)]
mod rdm {
    use approx::assert_relative_eq;
    use ssm_core::{Choice, DensityConfig, DrawId, DrawRng, Outcome, RawParams, SamplerConfig};

    use super::support::{cumulative, density_at, draws, integrate, ks_distance};
    use crate::{Rdm, RdmParams, SsmModel, Wald, WaldParams};

    #[test]
    fn start_variability_defaults_to_zero() {
        let raw = RawParams::new().with("nu", [1.0, 2.0]).with("k", 0.3).with("tau", 0.2);
        let p = Rdm.validate(&raw).unwrap();
        assert_eq!(p.a(), 0.0);
        assert_relative_eq!(p.threshold(), 0.3);

        let bad = RawParams::new().with("nu", [1.0, 0.0]).with("k", 0.3).with("tau", 0.2);
        let err = Rdm.validate(&bad).unwrap_err();
        assert!(err.to_string().contains("[1]"), "{err}");
    }

    #[test]
    fn single_accumulator_without_start_range_is_wald() {
        let rdm = RdmParams::new(vec![2.0], 0.6, 0.0, 0.1).unwrap();
        let wald = WaldParams::new(2.0, 0.6, 0.1).unwrap();
        let cfg = DensityConfig::default();
        for rt in [0.15, 0.3, 0.7, 2.0] {
            let o = Outcome::new(Choice(0), rt);
            assert_relative_eq!(
                Rdm.log_density(&rdm, o, &cfg).log_density,
                Wald.log_density(&wald, o, &cfg).log_density,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn narrow_start_range_approaches_wald() {
        let narrow = RdmParams::new(vec![1.5, 1.0], 0.5, 1e-4, 0.0).unwrap();
        let point = RdmParams::new(vec![1.5, 1.0], 0.5, 0.0, 0.0).unwrap();
        for t in [0.2, 0.5, 1.0] {
            for c in 0..2 {
                assert_relative_eq!(density_at(&Rdm, &narrow, c, t), density_at(&Rdm, &point, c, t), max_relative = 1e-3);
            }
        }
    }

    #[test]
    fn density_integrates_to_one() {
        for p in [RdmParams::default(), RdmParams::new(vec![1.0, 2.0, 0.5], 0.5, 0.0, 0.1).unwrap()] {
            let total: f64 = (0..p.nu().len()).map(|c| integrate(|t| density_at(&Rdm, &p, c, t), 30.0, 1e-3)).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn exact_sampler_agrees_with_density() {
        let p = RdmParams::default();
        let out = draws(&Rdm, &p, 2_000, 5, &SamplerConfig::default());
        let table = cumulative(|t| density_at(&Rdm, &p, 0, t) + density_at(&Rdm, &p, 1, t), 30.0, 1e-3);
        let d = ks_distance(out.iter().map(|o| o.rt - p.tau()).collect(), &table, 1e-3);
        assert!(d < 2.0 / (2_000f64).sqrt(), "KS distance {d}");

        let p1 = integrate(|t| density_at(&Rdm, &p, 1, t), 30.0, 1e-3);
        let share = out.iter().filter(|o| o.choice == Choice(1)).count() as f64 / 2_000.0;
        assert!((share - p1).abs() < 0.04, "share {share} vs {p1}");
    }

    #[test]
    fn euler_race_trajectory() {
        let p = RdmParams::default();
        let cfg = SamplerConfig::default();
        let traj = Rdm.trajectory(&p, &mut DrawRng::new(9, DrawId(0)), &cfg).unwrap().unwrap();
        assert_eq!(traj.paths.len(), 2);
        assert!(traj.paths.iter().all(|path| path.len() == traj.steps() + 1));
        assert!(traj.paths.iter().all(|path| (0.0..p.a()).contains(&path[0])));

        let winner = traj.outcome.choice.index();
        assert!(traj.paths[winner][traj.steps()] >= p.threshold());
        assert!(traj.paths[..winner].iter().all(|path| path[traj.steps()] < p.threshold()));
        assert_relative_eq!(traj.time_at(traj.steps()) + p.tau(), traj.outcome.rt, epsilon = 1e-9);
    }
}

#[cfg(test)]
mod wald {
    use approx::assert_relative_eq;
    use ssm_core::{Choice, DrawId, DrawRng, RawParams, SamplerConfig};

    use super::support::{cumulative, density_at, draws, integrate, ks_distance};
    use crate::{SsmModel, Wald, WaldParams};

    #[test]
    fn single_response() {
        let raw = RawParams::new().with("ν", 3.0).with("alpha", 0.5).with("tau", 0.13);
        let p = Wald.validate(&raw).unwrap();
        assert_eq!(p, WaldParams::default());
        assert_eq!(Wald.n_choices(&p), 1);
        assert!(WaldParams::new(0.0, 0.5, 0.1).is_err());
    }

    #[test]
    fn density_and_sampler() {
        let p = WaldParams::default();
        assert_relative_eq!(integrate(|t| density_at(&Wald, &p, 0, t), 10.0, 1e-4), 1.0, epsilon = 1e-3);
        let mean = integrate(|t| t * density_at(&Wald, &p, 0, t), 10.0, 1e-4);
        assert_relative_eq!(mean, p.alpha() / p.nu(), epsilon = 1e-3);

        let out = draws(&Wald, &p, 2_000, 21, &SamplerConfig::default());
        assert!(out.iter().all(|o| o.choice == Choice(0)));
        let table = cumulative(|t| density_at(&Wald, &p, 0, t), 10.0, 1e-4);
        let d = ks_distance(out.iter().map(|o| o.rt - p.tau()).collect(), &table, 1e-4);
        assert!(d < 2.0 / (2_000f64).sqrt(), "KS distance {d}");
    }

    #[test]
    fn trajectory_reaches_threshold() {
        let p = WaldParams::default();
        let traj = Wald.trajectory(&p, &mut DrawRng::new(1, DrawId(4)), &SamplerConfig::default()).unwrap().unwrap();
        assert_eq!(traj.paths[0][0], 0.0);
        assert!(traj.paths[0][traj.steps()] >= p.alpha());
        assert!(traj.paths[0][..traj.steps()].iter().all(|&x| x < p.alpha()));
    }
}

#[cfg(test)]
mod lnr {
    use approx::assert_relative_eq;
    use ssm_core::{
        Choice, DensityConfig, DrawId, DrawRng, MAX_ACCUMULATORS, ModelFamily, Outcome, ParamValue, RawParams,
        SamplerConfig, SsmError, ValidationError,
    };
    use statrs::distribution::{Continuous, LogNormal};

    use super::support::{cumulative, density_at, draws, integrate, ks_distance};
    use crate::{Lnr, LnrParams, SsmModel};

    #[test]
    fn validate_defaults() {
        let raw = RawParams::new().with("nu", [-1.0, -2.0]).with("tau", 0.2);
        assert_eq!(Lnr.validate(&raw).unwrap(), LnrParams::default());
        assert!(LnrParams::new(vec![0.0], vec![0.0], 0.0).is_err());
    }

    #[test]
    fn accumulator_count_is_bounded_by_label_range() {
        let at_limit = vec![0.0; MAX_ACCUMULATORS];
        let p = LnrParams::new(at_limit.clone(), vec![1.0; MAX_ACCUMULATORS], 0.0).unwrap();
        assert_eq!(Lnr.n_choices(&p), MAX_ACCUMULATORS);

        let mut over = at_limit;
        over.push(0.0);
        let err = LnrParams::new(over.clone(), vec![1.0; MAX_ACCUMULATORS + 1], 0.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooManyAccumulators { max: MAX_ACCUMULATORS, got, .. } if got == MAX_ACCUMULATORS + 1
        ));

        let raw = RawParams::new().with("nu", ParamValue::Vector(over)).with("tau", 0.0);
        assert!(matches!(Lnr.validate(&raw), Err(ValidationError::TooManyAccumulators { param: "nu", .. })));
    }

    #[test]
    fn overflowing_finishing_times_are_an_error() {
        let p = LnrParams::new(vec![800.0, 800.0], vec![1.0, 1.0], 0.2).unwrap();
        match Lnr.sample(&p, &mut DrawRng::new(0, DrawId(0)), &SamplerConfig::default()) {
            Err(SsmError::SamplingExhaustion { family, .. }) => assert_eq!(family, ModelFamily::LNR),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn single_accumulator_is_lognormal() {
        let p = LnrParams::new(vec![-0.5], vec![0.7], 0.0).unwrap();
        let reference = LogNormal::new(-0.5, 0.7).unwrap();
        for t in [0.1, 0.6, 1.5, 4.0] {
            let eval = Lnr.log_density(&p, Outcome::new(Choice(0), t), &DensityConfig::default());
            assert_relative_eq!(eval.log_density, reference.ln_pdf(t), epsilon = 1e-10);
        }
    }

    #[test]
    fn race_normalises_and_matches_sampler() {
        let p = LnrParams::default();
        let total = integrate(|t| density_at(&Lnr, &p, 0, t) + density_at(&Lnr, &p, 1, t), 30.0, 1e-3);
        assert_relative_eq!(total, 1.0, epsilon = 1e-2);

        let out = draws(&Lnr, &p, 2_000, 17, &SamplerConfig::default());
        let table = cumulative(|t| density_at(&Lnr, &p, 0, t) + density_at(&Lnr, &p, 1, t), 30.0, 1e-3);
        let d = ks_distance(out.iter().map(|o| o.rt - p.tau()).collect(), &table, 1e-3);
        assert!(d < 2.0 / (2_000f64).sqrt(), "KS distance {d}");
    }
}

#[cfg(test)]
mod spec {
    use ssm_core::{
        Choice, DensityConfig, DrawId, DrawRng, ModelFamily, Outcome, RawParams, SamplerConfig, SsmError,
    };

    use crate::{Ddm, DdmParams, Lba, LbaParams, erase};

    #[test]
    fn erased_validation_yields_bound_specification() {
        let ddm = erase(Ddm);
        let raw = RawParams::new().with("nu", 1.0).with("alpha", 0.8).with("tau", 0.3);
        let spec = ddm.validate(&raw).unwrap();
        assert_eq!(spec.family(), ModelFamily::DDM);
        assert_eq!(spec.n_choices(), 2);
        assert_eq!(spec.non_decision_time(), 0.3);
        assert_eq!(spec.params::<DdmParams>(), Some(&DdmParams::default()));
        assert!(spec.params::<LbaParams>().is_none());
    }

    #[test]
    fn default_spec_round_trips_through_dispatch() {
        let lba = erase(Lba);
        let spec = lba.default_spec();
        let outcome = lba.sample(&spec, &mut DrawRng::new(1, DrawId(0)), &SamplerConfig::default()).unwrap();
        let eval = lba.log_density(&spec, outcome, &DensityConfig::default()).unwrap();
        assert!(eval.log_density.is_finite());
        assert_eq!(lba.trajectory(&spec, &mut DrawRng::new(1, DrawId(0)), &SamplerConfig::default()), Ok(None));
    }

    #[test]
    fn wrong_family_rejected() {
        let spec = erase(Ddm).default_spec();
        let lba = erase(Lba);
        let err = lba.sample(&spec, &mut DrawRng::new(0, DrawId(0)), &SamplerConfig::default()).unwrap_err();
        assert_eq!(err, SsmError::FamilyMismatch { expected: ModelFamily::LBA, got: ModelFamily::DDM });
        let outcome = Outcome::new(Choice(0), 1.0);
        assert!(lba.log_density(&spec, outcome, &DensityConfig::default()).is_err());
    }
}
