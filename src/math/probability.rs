//! Probability and entropy helpers for pattern statistics

/// Euler–Mascheroni constant used by the level-count estimator
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Information contribution `-p·log2(p)` of a single pattern
///
/// Zero and non-positive probabilities contribute nothing.
pub fn entropy_contribution(p: f64) -> f64 {
    if p > 0.0 { -p * p.log2() } else { 0.0 }
}

/// Estimate a pattern probability from the level statistics of a top-k sketch
///
/// `pool_size · exp(sum_level / count_level · (1 - p) - γ) / total_iterations`
pub fn estimate_probability(
    sum_level: f64,
    count_level: f64,
    p: f64,
    pool_size: f64,
    total_iterations: f64,
) -> f64 {
    pool_size * (sum_level / count_level).mul_add(1.0 - p, -EULER_GAMMA).exp() / total_iterations
}

/// Median of a set of intensities
///
/// Even-sized inputs average the two central values. Returns `None` when empty.
pub fn median(values: &[u8]) -> Option<f64> {
    let mut histogram = [0usize; 256];
    for &value in values {
        if let Some(bucket) = histogram.get_mut(value as usize) {
            *bucket += 1;
        }
    }

    let n = values.len();
    if n == 0 {
        return None;
    }

    let nth = |rank: usize| -> f64 {
        let mut seen = 0;
        for (value, &count) in histogram.iter().enumerate() {
            seen += count;
            if seen > rank {
                return value as f64;
            }
        }
        255.0
    };

    if n % 2 == 1 {
        Some(nth(n / 2))
    } else {
        Some((nth(n / 2 - 1) + nth(n / 2)) / 2.0)
    }
}
