//! Tests for pattern constants and configuration defaults

#[cfg(test)]
mod tests {
    use motionpattern::io::configuration::{
        BACKGROUND_VALUE, CAP_ROUNDING_ULPS, DEFAULT_ADAPTIVE_BLOCK, DEFAULT_CLIP_EXTRA,
        DEFAULT_CLIP_PADDING, DEFAULT_ESTIMATOR_P, DEFAULT_SEED, DEFAULT_SKETCH_LENGTH,
        DEFAULT_SPACE_FILTER, DEFAULT_TIME_FILTER, FOREGROUND_VALUE, MAX_CODE_BITS,
        MAX_INDIVIDUAL_PROGRESS_BARS, NEUTRAL_GRAY, PREFILTER_TABLE_SIZE, PROGRESS_BAR_WIDTH,
        SKETCH_SUFFIX, TABLE_COMMENT, TABLE_SEPARATOR,
    };

    // Tests the default window fits a pattern code
    // Verified by raising the default time filter to 8
    #[test]
    fn test_default_window_fits_code() {
        assert_eq!(DEFAULT_TIME_FILTER, 3);
        assert_eq!(DEFAULT_SPACE_FILTER, 3);
        assert!(DEFAULT_TIME_FILTER * DEFAULT_SPACE_FILTER * DEFAULT_SPACE_FILTER <= MAX_CODE_BITS);
    }

    // Tests pixel values are distinct
    // Verified by setting neutral gray to the foreground value
    #[test]
    fn test_pixel_values() {
        assert_eq!(FOREGROUND_VALUE, 255);
        assert_eq!(BACKGROUND_VALUE, 0);
        assert_eq!(NEUTRAL_GRAY, 128);
    }

    // Tests pre-filter and tolerance values
    // Verified by changing constant values
    #[test]
    fn test_matching_constants() {
        assert_eq!(PREFILTER_TABLE_SIZE, 500_000);
        assert!(CAP_ROUNDING_ULPS >= 1.0 && CAP_ROUNDING_ULPS <= 16.0);
        assert!((DEFAULT_ESTIMATOR_P - 0.999).abs() < f64::EPSILON);
    }

    // Tests table delimiters
    // Verified by switching the separator to a comma
    #[test]
    fn test_table_format() {
        assert_eq!(TABLE_SEPARATOR, ';');
        assert_eq!(TABLE_COMMENT, '#');
    }

    // Tests clip defaults
    // Verified by changing constant values
    #[test]
    fn test_clip_defaults() {
        assert_eq!(DEFAULT_SKETCH_LENGTH, 3);
        assert_eq!(DEFAULT_CLIP_EXTRA, 2);
        assert_eq!(DEFAULT_CLIP_PADDING, 15);
        assert_eq!(DEFAULT_SEED, 42);
    }

    // Tests adaptive block size is odd
    // Verified by changing to even number
    #[test]
    fn test_adaptive_block_is_odd() {
        assert_eq!(DEFAULT_ADAPTIVE_BLOCK % 2, 1);
        assert!(DEFAULT_ADAPTIVE_BLOCK > 1);
    }

    // Tests progress bar settings
    // Verified by increasing bar limit
    #[test]
    fn test_progress_settings() {
        assert_eq!(MAX_INDIVIDUAL_PROGRESS_BARS, 5);
        assert_eq!(PROGRESS_BAR_WIDTH, 50);
    }

    // Tests filesystem safety of suffix
    // Verified by adding special character
    #[test]
    fn test_sketch_suffix_no_special_chars() {
        assert!(SKETCH_SUFFIX.starts_with('_'));
        for ch in SKETCH_SUFFIX.chars() {
            assert!(
                ch.is_alphanumeric() || ch == '_' || ch == '-',
                "Sketch suffix contains invalid character: {ch}"
            );
        }
    }
}
