#[cfg(test)]
mod test_grid {
    use arima_garch::select::{CandidateGrid, CandidateGridConfig};
    use arima_garch::spec::{ArimaSpec, GarchSpec};

    #[test]
    fn grid_18_candidates_in_lexicographic_order() {
        // 3 * 2 * 3 ARIMA combinations, GARCH fixed at (1,1)
        let grid = CandidateGrid::new(CandidateGridConfig {
            max_p: 2,
            max_d: 1,
            max_q: 2,
            max_garch_p: 1,
            max_garch_q: 1,
            restrict_d_to_01: true,
            max_pq_total: None,
        })
        .unwrap();

        assert_eq!(grid.count(), 18);
        let candidates = grid.generate();
        assert_eq!(candidates.len(), 18);

        assert_eq!(candidates[0].arima, ArimaSpec::new(0, 0, 0));
        assert_eq!(candidates[0].garch, GarchSpec::new(1, 1).unwrap());
        assert_eq!(candidates[1].arima, ArimaSpec::new(0, 0, 1));
        assert_eq!(candidates[3].arima, ArimaSpec::new(0, 1, 0));
        assert_eq!(candidates[17].arima, ArimaSpec::new(2, 1, 2));
    }

    #[test]
    fn count_matches_generate_under_restrictions() {
        for max_pq in [0, 1, 2, 3] {
            let grid = CandidateGrid::new(CandidateGridConfig {
                max_p: 2,
                max_d: 2,
                max_q: 2,
                max_garch_p: 2,
                max_garch_q: 1,
                restrict_d_to_01: true,
                max_pq_total: Some(max_pq),
            })
            .unwrap();
            assert_eq!(grid.count(), grid.generate().len(), "max_pq = {max_pq}");
        }

        let unrestricted = CandidateGrid::new(CandidateGridConfig {
            max_p: 3,
            max_d: 2,
            max_q: 1,
            max_garch_p: 2,
            max_garch_q: 2,
            restrict_d_to_01: false,
            max_pq_total: None,
        })
        .unwrap();
        assert_eq!(unrestricted.count(), unrestricted.generate().len());
        assert_eq!(unrestricted.count(), 4 * 3 * 2 * 2 * 2);
    }

    #[test]
    fn garch_bounds_must_be_positive() {
        assert!(CandidateGrid::new(CandidateGridConfig {
            max_garch_p: 0,
            ..CandidateGridConfig::default()
        })
        .is_err());
    }
}

#[cfg(test)]
mod test_selection {
    use more_asserts::assert_lt;

    use arima_garch::estimate::FitOptions;
    use arima_garch::params::ArimaGarchParameters;
    use arima_garch::select::{
        self, CrossValidationConfig, SelectionConfig, SelectionCriterion,
    };
    use arima_garch::sim::{self, InnovationDistribution};
    use arima_garch::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};

    fn garch_series(n: usize, seed: u64) -> Vec<f64> {
        let spec = ArimaGarchSpec::new(ArimaSpec::new(0, 0, 0), GarchSpec::new(1, 1).unwrap());
        let mut params = ArimaGarchParameters::zeros(&spec);
        params.garch.omega = 0.05;
        params.garch.alpha_coef[0] = 0.1;
        params.garch.beta_coef[0] = 0.8;
        sim::simulate(&spec, &params, n, seed, InnovationDistribution::Normal)
            .unwrap()
            .returns
    }

    #[test]
    fn empty_candidate_list_is_invalid_input() {
        let data = garch_series(100, 1);
        assert!(select::select(&data, &[], &SelectionConfig::default()).is_err());
    }

    #[test]
    fn selects_a_candidate_and_counts_outcomes() {
        let data = garch_series(200, 5);
        let candidates = vec![
            ArimaGarchSpec::new(ArimaSpec::new(0, 0, 0), GarchSpec::new(1, 1).unwrap()),
            ArimaGarchSpec::new(ArimaSpec::new(1, 0, 0), GarchSpec::new(1, 1).unwrap()),
        ];
        let result = select::select(&data, &candidates, &SelectionConfig::default()).unwrap();

        assert_eq!(
            result.candidates_evaluated + result.candidates_failed,
            candidates.len()
        );
        assert!(result.candidates_evaluated >= 1);
        assert!(result.best_score.is_finite());
        assert!(result.best_summary.converged);
        assert_eq!(result.ranking.len(), result.candidates_evaluated);
        // ranking is sorted ascending by score
        for pair in result.ranking.windows(2) {
            assert_lt!(pair[0].score, pair[1].score + 1.0e-12);
        }
        // the winner carries the best score
        assert_eq!(result.ranking[0].score, result.best_score);
    }

    #[test]
    fn selection_is_deterministic() {
        let data = garch_series(150, 8);
        let candidates = vec![
            ArimaGarchSpec::new(ArimaSpec::new(0, 0, 0), GarchSpec::new(1, 1).unwrap()),
            ArimaGarchSpec::new(ArimaSpec::new(0, 0, 1), GarchSpec::new(1, 1).unwrap()),
            ArimaGarchSpec::new(ArimaSpec::new(1, 0, 0), GarchSpec::new(1, 1).unwrap()),
        ];
        let config = SelectionConfig {
            criterion: SelectionCriterion::Aic,
            ..SelectionConfig::default()
        };
        let a = select::select(&data, &candidates, &config).unwrap();
        let b = select::select(&data, &candidates, &config).unwrap();
        assert_eq!(a.best_spec, b.best_spec);
        assert_eq!(a.best_score, b.best_score);
    }

    #[test]
    fn cv_returns_none_when_training_window_too_large() {
        let data = garch_series(50, 2);
        let spec = ArimaGarchSpec::new(ArimaSpec::new(0, 0, 0), GarchSpec::new(1, 1).unwrap());
        let config = CrossValidationConfig {
            min_train_size: 50,
            fit: FitOptions::default(),
        };
        let result = select::cross_validation_score(&data, &spec, &config).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn cv_scores_simple_model() {
        let data = garch_series(60, 3);
        let spec = ArimaGarchSpec::new(ArimaSpec::new(0, 0, 0), GarchSpec::new(1, 1).unwrap());
        let config = CrossValidationConfig {
            min_train_size: 55,
            fit: FitOptions {
                seed: 42,
                ..FitOptions::default()
            },
        };
        let result = select::cross_validation_score(&data, &spec, &config)
            .unwrap()
            .expect("at least one fold should fit");
        assert!(result.mse.is_finite());
        assert!(result.mse >= 0.0);
        assert!(result.folds >= 1 && result.folds <= 5);
    }

    #[test]
    fn criterion_parsing() {
        assert_eq!(
            "aic".parse::<SelectionCriterion>().unwrap(),
            SelectionCriterion::Aic
        );
        assert_eq!(
            "BIC".parse::<SelectionCriterion>().unwrap(),
            SelectionCriterion::Bic
        );
        assert_eq!(
            "AICc".parse::<SelectionCriterion>().unwrap(),
            SelectionCriterion::Aicc
        );
        assert_eq!(
            "cv".parse::<SelectionCriterion>().unwrap(),
            SelectionCriterion::Cv
        );
        assert!("mdl".parse::<SelectionCriterion>().is_err());
    }
}
