#[cfg(test)]
mod test_stats {
    use more_asserts::{assert_gt, assert_lt};

    use arima_garch::stats;

    #[test]
    fn mean_and_variance() {
        let x = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_lt!((stats::mean(&x) - 5.0).abs(), 1.0e-12);
        // sample variance with Bessel correction
        assert_lt!((stats::sample_variance(&x) - 4.571428571428571).abs(), 1.0e-9);
    }

    #[test]
    fn variance_degenerate_cases() {
        assert_eq!(stats::sample_variance(&[]), 0.0);
        assert_eq!(stats::sample_variance(&[1.5]), 0.0);
    }

    #[test]
    fn skewness_of_symmetric_data_is_zero() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_lt!(stats::skewness(&x).unwrap().abs(), 1.0e-12);
    }

    #[test]
    fn kurtosis_hand_computed() {
        // m2 = 2, m4 = 6.8, G2 = (4/6) * (6 * 1.7 - 12) = -1.2
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_lt!((stats::kurtosis(&x).unwrap() - -1.2).abs(), 1.0e-12);
    }

    #[test]
    fn moments_reject_short_series() {
        assert!(stats::skewness(&[1.0, 2.0]).is_err());
        assert!(stats::kurtosis(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn ln_gamma_known_values() {
        // Gamma(5) = 24
        assert_lt!((stats::ln_gamma(5.0) - 24.0f64.ln()).abs(), 1.0e-10);
        // Gamma(0.5) = sqrt(pi)
        assert_lt!(
            (stats::ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs(),
            1.0e-10
        );
        // Gamma(1) = 1
        assert_lt!(stats::ln_gamma(1.0).abs(), 1.0e-10);
    }

    #[test]
    fn chi_square_ccdf_two_dof_is_exponential() {
        // for dof = 2 the CCDF is exp(-x/2) exactly
        for x in [0.5, 1.0, 2.0, 5.991464547107979, 10.0] {
            let p = stats::chi_square_ccdf(x, 2.0).unwrap();
            assert_lt!((p - (-x / 2.0f64).exp()).abs(), 1.0e-9);
        }
    }

    #[test]
    fn chi_square_ccdf_quantiles() {
        // 5% critical value of chi-square(1)
        let p = stats::chi_square_ccdf(3.841458820694124, 1.0).unwrap();
        assert_lt!((p - 0.05).abs(), 1.0e-6);
        // 5% critical value of chi-square(10)
        let p = stats::chi_square_ccdf(18.307038053275146, 10.0).unwrap();
        assert_lt!((p - 0.05).abs(), 1.0e-6);
    }

    #[test]
    fn chi_square_ccdf_bounds() {
        assert_eq!(stats::chi_square_ccdf(-1.0, 3.0).unwrap(), 1.0);
        assert_eq!(stats::chi_square_ccdf(0.0, 3.0).unwrap(), 1.0);
        assert_eq!(stats::chi_square_ccdf(2000.0, 3.0).unwrap(), 0.0);

        let p_small = stats::chi_square_ccdf(0.01, 5.0).unwrap();
        assert_gt!(p_small, 0.99);
        assert!(stats::chi_square_ccdf(1.0, 0.0).is_err());
    }
}
