#[cfg(test)]
mod test_acf {
    use more_asserts::assert_lt;

    #[test]
    fn acf_lag0_is_one() {
        let x = [22.71659, 23.24932, 24.86742, 25.19197, 22.92390, 24.80207];
        let rho = arima_garch::acf::acf(&x, 3).unwrap();
        assert_eq!(rho[0], 1.0);
        assert_eq!(rho.len(), 4);
    }

    #[test]
    fn acf_hand_computed() {
        // mean 2.5, deviations [-1.5, -0.5, 0.5, 1.5], variance sum 5.0
        let x = [1.0, 2.0, 3.0, 4.0];
        let rho = arima_garch::acf::acf(&x, 3).unwrap();
        let expected = [1.0, 0.25, -0.3, -0.45];
        for i in 0..expected.len() {
            assert_lt!((rho[i] - expected[i]).abs(), 1.0e-12);
        }
    }

    #[test]
    fn acf_constant_series_is_zero() {
        let x = [3.0; 20];
        let rho = arima_garch::acf::acf(&x, 5).unwrap();
        assert_eq!(rho[0], 1.0);
        for value in &rho[1..] {
            assert_eq!(*value, 0.0);
        }
    }

    #[test]
    fn acf_rejects_bad_input() {
        assert!(arima_garch::acf::acf(&[], 1).is_err());
        assert!(arima_garch::acf::acf(&[1.0, 2.0], 2).is_err());
    }

    #[test]
    fn pacf_lag1_equals_acf_lag1() {
        let x = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0, 4.0, 7.0];
        let rho = arima_garch::acf::acf(&x, 1).unwrap();
        let pacf = arima_garch::acf::pacf(&x, 1).unwrap();
        assert_eq!(pacf.len(), 1);
        assert_lt!((pacf[0] - rho[1]).abs(), 1.0e-12);
    }

    #[test]
    fn pacf_lag2_durbin_levinson() {
        // pacf(2) = (rho_2 - rho_1^2) / (1 - rho_1^2)
        let x = [1.0, 2.0, 3.0, 4.0];
        let pacf = arima_garch::acf::pacf(&x, 2).unwrap();
        let expected = (-0.3 - 0.25 * 0.25) / (1.0 - 0.25 * 0.25);
        assert_lt!((pacf[1] - expected).abs(), 1.0e-12);
    }

    #[test]
    fn pacf_recovers_ar1_coefficient() {
        use arima_garch::params::ArimaGarchParameters;
        use arima_garch::sim;
        use arima_garch::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};

        // AR(1) with phi = 0.9 and near-constant conditional variance
        let spec = ArimaGarchSpec::new(ArimaSpec::new(1, 0, 0), GarchSpec::new(1, 1).unwrap());
        let mut params = ArimaGarchParameters::zeros(&spec);
        params.arima.ar_coef[0] = 0.9;
        params.garch.omega = 1.0;
        params.garch.alpha_coef[0] = 0.0;
        params.garch.beta_coef[0] = 0.0;

        let path = sim::simulate(&spec, &params, 2000, 100, sim::InnovationDistribution::Normal)
            .unwrap();
        let pacf = arima_garch::acf::pacf(&path.returns, 1).unwrap();
        assert_lt!((pacf[0] - 0.9).abs(), 0.05);
    }
}
