#[cfg(test)]
mod test_forecast {
    use more_asserts::assert_lt;

    use arima_garch::forecast;
    use arima_garch::model::ArimaGarchModel;
    use arima_garch::params::ArimaGarchParameters;
    use arima_garch::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};

    fn garch11_model(omega: f64, alpha: f64, beta: f64) -> ArimaGarchModel {
        let spec = ArimaGarchSpec::new(ArimaSpec::new(0, 0, 0), GarchSpec::new(1, 1).unwrap());
        let mut params = ArimaGarchParameters::zeros(&spec);
        params.garch.omega = omega;
        params.garch.alpha_coef[0] = alpha;
        params.garch.beta_coef[0] = beta;
        ArimaGarchModel::new(spec, params).unwrap()
    }

    #[test]
    fn horizon_must_be_positive() {
        let model = garch11_model(0.01, 0.1, 0.85);
        assert!(forecast::forecast(&model, 0).is_err());
    }

    #[test]
    fn output_lengths_match_horizon() {
        let mut model = garch11_model(0.01, 0.1, 0.85);
        for y in [0.3, -0.2, 0.5, 0.1, -0.4] {
            model.update(y);
        }
        let result = forecast::forecast(&model, 10).unwrap();
        assert_eq!(result.mean_forecasts.len(), 10);
        assert_eq!(result.variance_forecasts.len(), 10);
        for h in &result.variance_forecasts {
            assert!(*h > 0.0);
        }
    }

    #[test]
    fn variance_forecasts_converge_to_unconditional_variance() {
        let mut model = garch11_model(0.01, 0.1, 0.85);
        // push the state away from the unconditional variance
        for y in [2.0, -3.0, 2.5, -1.5, 3.0] {
            model.update(y);
        }

        let result = forecast::forecast(&model, 100).unwrap();
        let sigma2 = 0.01 / (1.0 - 0.1 - 0.85);
        let last = result.variance_forecasts[99];
        assert_lt!(((last - sigma2) / sigma2).abs(), 1.0e-3);
    }

    #[test]
    fn degenerate_garch_forecasts_constant_omega() {
        let mut model = garch11_model(0.02, 0.0, 0.0);
        for y in [1.0, -1.0, 2.0] {
            model.update(y);
        }
        let result = forecast::forecast(&model, 5).unwrap();
        for h in &result.variance_forecasts {
            assert_lt!((h - 0.02).abs(), 1.0e-12);
        }
    }

    #[test]
    fn ar1_mean_forecasts_decay_to_long_run_mean() {
        let spec = ArimaGarchSpec::new(ArimaSpec::new(1, 0, 0), GarchSpec::new(1, 1).unwrap());
        let mut params = ArimaGarchParameters::zeros(&spec);
        params.arima.intercept = 0.1;
        params.arima.ar_coef[0] = 0.5;
        params.garch.omega = 0.01;
        params.garch.alpha_coef[0] = 0.05;
        params.garch.beta_coef[0] = 0.9;
        let mut model = ArimaGarchModel::new(spec, params).unwrap();
        model.update(4.0);

        let result = forecast::forecast(&model, 50).unwrap();
        // one step ahead: c + phi * y_n
        assert_lt!((result.mean_forecasts[0] - (0.1 + 0.5 * 4.0)).abs(), 1.0e-12);
        // long-run mean c / (1 - phi) = 0.2
        assert_lt!((result.mean_forecasts[49] - 0.2).abs(), 1.0e-9);
    }

    #[test]
    fn zero_order_mean_forecast_is_intercept() {
        let spec = ArimaGarchSpec::new(ArimaSpec::new(0, 0, 0), GarchSpec::new(1, 1).unwrap());
        let mut params = ArimaGarchParameters::zeros(&spec);
        params.arima.intercept = 0.0;
        params.garch.omega = 0.01;
        params.garch.alpha_coef[0] = 0.1;
        params.garch.beta_coef[0] = 0.85;
        let mut model = ArimaGarchModel::new(spec, params).unwrap();
        model.update(1.0);

        let result = forecast::forecast(&model, 3).unwrap();
        for mean in &result.mean_forecasts {
            assert_eq!(*mean, 0.0);
        }
    }
}
