//! Tests for measured pattern statistics

#[cfg(test)]
mod tests {
    use motionpattern::PatternError;
    use motionpattern::analysis::counting::{PatternCounter, VideoCount};
    use motionpattern::math::codec::WindowShape;
    use ndarray::{Array2, array};

    // Tests every pixel of a single frame is a 1x1x1 window
    // Verified by using a spatial stride equal to the window side
    #[test]
    fn test_counts_single_pixels() {
        let shape = WindowShape::new(1, 1).unwrap();
        let mut counter = PatternCounter::new(shape);
        counter.observe_frame(array![[255, 0], [0, 0]]).unwrap();

        assert_eq!(counter.total(), 4);
        assert_eq!(counter.counts().get(&1), Some(&1));
        assert_eq!(counter.counts().get(&0), Some(&3));

        let catalog = counter.into_catalog().unwrap();
        let codes: Vec<u64> = catalog.rows().map(|row| row.pattern_value).collect();
        assert_eq!(codes, vec![0, 1]);
        assert!((catalog.row(0).unwrap().probability - 0.75).abs() < 1e-12);
        assert!(catalog.is_normalized());
    }

    // Tests overlapping windows slide by one frame and one pixel
    // Verified by partitioning frames into disjoint groups
    #[test]
    fn test_sliding_windows() {
        let shape = WindowShape::new(2, 2).unwrap();
        let mut counter = PatternCounter::new(shape);
        for _ in 0..4 {
            counter.observe_frame(Array2::zeros((3, 3))).unwrap();
        }

        // 3 temporal positions x 2x2 spatial positions
        assert_eq!(counter.total(), 12);
        assert_eq!(counter.counts().get(&0), Some(&12));
    }

    // Tests windows never straddle two videos
    // Verified by keeping the frame buffer between videos
    #[test]
    fn test_windows_do_not_cross_videos() {
        let shape = WindowShape::new(2, 1).unwrap();
        let mut counter = PatternCounter::new(shape);

        let tally = counter
            .observe_video(vec![Array2::zeros((1, 1))], 0, None)
            .unwrap();
        assert_eq!(
            tally,
            VideoCount {
                frames_skipped: 0,
                frames_processed: 1
            }
        );
        counter
            .observe_video(vec![Array2::from_elem((1, 1), 255)], 0, None)
            .unwrap();

        assert_eq!(counter.videos_observed(), 2);
        assert_eq!(counter.total(), 0);
        assert!(matches!(
            counter.into_catalog(),
            Err(PatternError::InvalidSourceData { .. })
        ));
    }

    // Tests leading frames are skipped and the rest bounded
    // Verified by applying the bound before skipping
    #[test]
    fn test_skip_and_max_frames() {
        let shape = WindowShape::new(1, 1).unwrap();
        let mut counter = PatternCounter::new(shape);
        let frames = vec![
            Array2::from_elem((1, 1), 255),
            Array2::from_elem((1, 1), 255),
            Array2::zeros((1, 1)),
            Array2::zeros((1, 1)),
            Array2::from_elem((1, 1), 255),
        ];

        let tally = counter.observe_video(frames, 2, Some(2)).unwrap();
        assert_eq!(tally.frames_skipped, 2);
        assert_eq!(tally.frames_processed, 2);
        assert_eq!(counter.counts().get(&0), Some(&2));
        assert!(counter.counts().get(&1).is_none());
    }

    // Tests frames smaller than the window produce no windows
    // Verified by clamping windows to the frame edge
    #[test]
    fn test_frames_smaller_than_window() {
        let shape = WindowShape::new(1, 3).unwrap();
        let mut counter = PatternCounter::new(shape);
        counter.observe_frame(Array2::zeros((2, 2))).unwrap();
        assert_eq!(counter.total(), 0);
    }
}
