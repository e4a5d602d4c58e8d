//! Tests for entropy contributions, level-count estimation and medians

#[cfg(test)]
mod tests {
    use motionpattern::math::probability::{
        EULER_GAMMA, entropy_contribution, estimate_probability, median,
    };

    // Tests entropy contribution in bits
    // Verified by switching to the natural logarithm
    #[test]
    fn test_entropy_contribution_values() {
        assert!((entropy_contribution(0.5) - 0.5).abs() < 1e-12);
        assert!((entropy_contribution(0.25) - 0.5).abs() < 1e-12);
        assert!(entropy_contribution(1.0).abs() < f64::EPSILON);
    }

    // Tests zero probabilities contribute nothing instead of NaN
    // Verified by removing the positivity guard
    #[test]
    fn test_entropy_contribution_zero() {
        assert!(entropy_contribution(0.0).abs() < f64::EPSILON);
        assert!(entropy_contribution(-0.1).abs() < f64::EPSILON);
    }

    // Tests estimator formula against a hand computed value
    // Verified by dropping the Euler-Mascheroni term
    #[test]
    fn test_estimate_probability() {
        let estimate = estimate_probability(2000.0, 2.0, 0.999, 10.0, 100.0);
        let expected = 10.0 * (1.0f64 - EULER_GAMMA).exp() / 100.0;
        assert!(
            (estimate - expected).abs() < 1e-12,
            "Expected {expected}, got {estimate}"
        );
    }

    // Tests estimator with p = 1 ignores the level ratio
    // Verified by using p instead of 1 - p
    #[test]
    fn test_estimate_probability_degenerate_p() {
        let a = estimate_probability(5.0, 1.0, 1.0, 4.0, 8.0);
        let b = estimate_probability(500.0, 1.0, 1.0, 4.0, 8.0);
        assert!((a - b).abs() < 1e-15);
        assert!((a - 0.5 * (-EULER_GAMMA).exp()).abs() < 1e-12);
    }

    // Tests medians of odd and even sized inputs
    // Verified by returning the upper middle value for even sizes
    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[7]), Some(7.0));
        assert_eq!(median(&[9, 1, 5]), Some(5.0));
        assert_eq!(median(&[0, 255]), Some(127.5));
        assert_eq!(median(&[10, 10, 20, 30]), Some(15.0));
    }
}
