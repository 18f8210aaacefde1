#[cfg(test)]
mod test_constraints {
    use more_asserts::{assert_gt, assert_lt};

    use arima_garch::constraints;

    #[test]
    fn transform_always_lands_in_the_feasible_set() {
        let candidates = [
            vec![0.0, 0.0, 0.0],
            vec![-5.0, 3.0, -3.0],
            vec![2.0, 10.0, 10.0],
            vec![-20.0, -20.0, 20.0],
        ];
        for theta in &candidates {
            let params = constraints::to_constrained(theta, 1, 1).unwrap();
            assert_gt!(params[0], 0.0);
            assert!(constraints::validate(&params, 1, 1));
            assert_lt!(
                params[1..].iter().sum::<f64>(),
                constraints::MAX_PERSISTENCE
            );
        }
    }

    #[test]
    fn round_trip_recovers_parameters() {
        let params = vec![0.01, 0.1, 0.85];
        let theta = constraints::to_unconstrained(&params, 1, 1).unwrap();
        let recovered = constraints::to_constrained(&theta, 1, 1).unwrap();
        for (a, b) in params.iter().zip(recovered.iter()) {
            assert_lt!((a - b).abs(), 1.0e-6);
        }
    }

    #[test]
    fn validate_rejects_infeasible_vectors() {
        // non-positive omega
        assert!(!constraints::validate(&[0.0, 0.1, 0.5], 1, 1));
        // negative coefficient
        assert!(!constraints::validate(&[0.1, -0.1, 0.5], 1, 1));
        // persistence at one
        assert!(!constraints::validate(&[0.1, 0.5, 0.5], 1, 1));
        // wrong shape
        assert!(!constraints::validate(&[0.1, 0.5], 1, 1));
        assert!(constraints::validate(&[0.1, 0.3, 0.5], 1, 1));
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        assert!(constraints::to_constrained(&[0.0, 0.0], 1, 1).is_err());
        assert!(constraints::to_unconstrained(&[0.1, 0.1], 1, 1).is_err());
    }
}
