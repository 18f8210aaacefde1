#[cfg(test)]
mod test_csv_input {
    use more_asserts::assert_lt;

    use arima_garch::io::{self, CsvOptions};

    #[test]
    fn single_column_with_header() {
        let csv = "value\n1.5\n2.5\n-0.5\n";
        let data = io::read_series(csv.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(data, vec![1.5, 2.5, -0.5]);
    }

    #[test]
    fn single_column_without_header() {
        let csv = "1.5\n2.5\n-0.5\n";
        let options = CsvOptions {
            has_header: false,
            ..CsvOptions::default()
        };
        let data = io::read_series(csv.as_bytes(), &options).unwrap();
        assert_eq!(data, vec![1.5, 2.5, -0.5]);
    }

    #[test]
    fn dated_two_column_auto_detects_numeric_column() {
        let csv = "date,close\n2024-01-01,101.25\n2024-01-02,102.5\n2024-01-03,99.75\n";
        let data = io::read_series(csv.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(data, vec![101.25, 102.5, 99.75]);
    }

    #[test]
    fn explicit_value_column() {
        let csv = "a;b\n1.0;10.0\n2.0;20.0\n";
        let options = CsvOptions {
            delimiter: b';',
            value_column: Some(1),
            ..CsvOptions::default()
        };
        let data = io::read_series(csv.as_bytes(), &options).unwrap();
        assert_eq!(data, vec![10.0, 20.0]);
    }

    #[test]
    fn non_numeric_cell_is_fatal() {
        let csv = "value\n1.0\nnot-a-number\n3.0\n";
        assert!(io::read_series(csv.as_bytes(), &CsvOptions::default()).is_err());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(io::read_series("".as_bytes(), &CsvOptions::default()).is_err());
        assert!(io::read_series("value\n".as_bytes(), &CsvOptions::default()).is_err());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let csv = "value\n1.0\n\n2.0\n";
        let data = io::read_series(csv.as_bytes(), &CsvOptions::default()).unwrap();
        assert_lt!((data[0] - 1.0).abs(), 1.0e-12);
        assert_eq!(data.len(), 2);
    }
}

#[cfg(test)]
mod test_csv_output {
    use arima_garch::forecast::ForecastResult;
    use arima_garch::io;
    use arima_garch::sim::SimulationResult;

    #[test]
    fn forecast_csv_layout() {
        let forecasts = ForecastResult {
            mean_forecasts: vec![0.5, 0.25],
            variance_forecasts: vec![0.04, 0.09],
        };
        let mut buffer = Vec::new();
        io::write_forecast_csv(&mut buffer, &forecasts).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("step,mean,variance,std_dev"));
        assert_eq!(lines.next(), Some("1,0.5,0.04,0.2"));
        assert_eq!(lines.next(), Some("2,0.25,0.09,0.3"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn multi_path_csv_layout() {
        let paths = vec![
            SimulationResult {
                returns: vec![0.1, 0.2],
                volatilities: vec![1.0, 2.0],
            },
            SimulationResult {
                returns: vec![-0.1],
                volatilities: vec![0.5],
            },
        ];
        let mut buffer = Vec::new();
        io::write_simulation_paths_csv(&mut buffer, &paths).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("path,observation,return,volatility"));
        assert_eq!(lines.next(), Some("1,1,0.1,1"));
        assert_eq!(lines.next(), Some("1,2,0.2,2"));
        assert_eq!(lines.next(), Some("2,1,-0.1,0.5"));
        assert_eq!(lines.next(), None);
    }
}

#[cfg(test)]
mod test_model_json {
    use more_asserts::assert_lt;

    use arima_garch::io;
    use arima_garch::model::ArimaGarchModel;
    use arima_garch::params::ArimaGarchParameters;
    use arima_garch::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};

    fn example_model() -> ArimaGarchModel {
        let spec = ArimaGarchSpec::new(ArimaSpec::new(1, 0, 1), GarchSpec::new(1, 1).unwrap());
        let mut params = ArimaGarchParameters::zeros(&spec);
        params.arima.intercept = 0.0123456789;
        params.arima.ar_coef[0] = 0.6543210987;
        params.arima.ma_coef[0] = -0.25;
        params.garch.omega = 0.01;
        params.garch.alpha_coef[0] = 0.1;
        params.garch.beta_coef[0] = 0.85;

        let mut model = ArimaGarchModel::new(spec, params).unwrap();
        for y in [0.5, -0.25, 0.75, 0.1, -0.4, 0.2] {
            model.update(y);
        }
        model
    }

    #[test]
    fn round_trip_preserves_spec_and_parameters() {
        let model = example_model();
        let json = io::model_to_json(&model).unwrap();
        let reloaded = io::model_from_json(&json).unwrap();

        assert_eq!(reloaded.spec(), model.spec());
        let original = model.params();
        let restored = reloaded.params();
        assert_lt!(
            (original.arima.intercept - restored.arima.intercept).abs(),
            1.0e-9
        );
        for (a, b) in original
            .arima
            .ar_coef
            .iter()
            .chain(original.arima.ma_coef.iter())
            .zip(restored.arima.ar_coef.iter().chain(restored.arima.ma_coef.iter()))
        {
            assert_lt!((a - b).abs(), 1.0e-9);
        }
        assert_lt!((original.garch.omega - restored.garch.omega).abs(), 1.0e-9);
    }

    #[test]
    fn round_trip_preserves_filter_state() {
        let model = example_model();
        let json = io::model_to_json(&model).unwrap();
        let reloaded = io::model_from_json(&json).unwrap();

        assert_eq!(
            reloaded.mean_state().observation_window(),
            model.mean_state().observation_window()
        );
        assert_eq!(
            reloaded.var_state().variance_window(),
            model.var_state().variance_window()
        );
        assert_eq!(
            reloaded.var_state().initial_variance(),
            model.var_state().initial_variance()
        );
    }

    #[test]
    fn document_layout_matches_format() {
        let model = example_model();
        let json = io::model_to_json(&model).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["model_type"], "ArimaGarch");
        assert_eq!(value["spec"]["arima"]["p"], 1);
        assert_eq!(value["spec"]["garch"]["q"], 1);
        assert!(value["parameters"]["arima"]["ar_coef"].is_array());
        assert!(value["parameters"]["garch"]["alpha_coef"].is_array());
        assert!(value["state"]["garch"]["initial_variance"].is_number());
    }

    #[test]
    fn mismatched_state_windows_are_rejected() {
        let model = example_model();
        let json = io::model_to_json(&model).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        // GARCH(1,1) expects a single-entry variance window
        value["state"]["garch"]["variance_history"] = serde_json::json!([1.0, 2.0]);
        assert!(io::model_from_json(&value.to_string()).is_err());
    }

    #[test]
    fn parameter_shape_mismatch_is_rejected() {
        let model = example_model();
        let json = io::model_to_json(&model).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["parameters"]["arima"]["ar_coef"] = serde_json::json!([0.1, 0.2]);
        assert!(io::model_from_json(&value.to_string()).is_err());
    }
}
