//! Tests for clip window placement, id pairing and clip cutting

#[cfg(test)]
mod tests {
    use motionpattern::PatternError;
    use motionpattern::io::clips::{
        ClipConfig, ClipWindow, clip_ids, pair_clip_ids, split_clip,
    };
    use ndarray::Array2;
    use std::fs;
    use tempfile::TempDir;

    fn numbered_frames(count: usize) -> Vec<Array2<u8>> {
        (0..count)
            .map(|index| Array2::from_elem((2, 2), index as u8))
            .collect()
    }

    fn firsts(frames: &[Array2<u8>]) -> Vec<u8> {
        frames
            .iter()
            .filter_map(|frame| frame.get((0, 0)).copied())
            .collect()
    }

    // Tests the drawn window always leaves room for the context frames
    // Verified by drawing the start from zero
    #[test]
    fn test_choose_stays_in_bounds() {
        let config = ClipConfig::default();
        let mut rng = config.rng();
        for _ in 0..200 {
            let window = ClipWindow::choose(10, &config, &mut rng).unwrap();
            assert!(window.sketch_start >= 2);
            assert!(window.digitalized_range().end <= 10);
            assert_eq!(window.sketch_range().len(), 3);
            assert_eq!(window.digitalized_range().len(), 7);
        }
    }

    // Tests a video of exactly the required length has a single placement
    // Verified by using an exclusive upper bound
    #[test]
    fn test_choose_exact_fit() {
        let config = ClipConfig::default();
        assert_eq!(config.required_frames(), 7);

        let window = ClipWindow::choose(7, &config, &mut config.rng()).unwrap();
        assert_eq!(window.sketch_start, 2);
        assert_eq!(window.digitalized_range(), 0..7);
    }

    // Tests the same seed gives the same window
    // Verified by seeding from entropy
    #[test]
    fn test_choose_is_reproducible() {
        let config = ClipConfig {
            seed: 7,
            ..ClipConfig::default()
        };
        let a = ClipWindow::choose(100, &config, &mut config.rng()).unwrap();
        let b = ClipWindow::choose(100, &config, &mut config.rng()).unwrap();
        assert_eq!(a, b);
    }

    // Tests short videos and empty windows are rejected
    // Verified by saturating the upper bound at zero
    #[test]
    fn test_choose_errors() {
        let config = ClipConfig::default();
        assert!(matches!(
            ClipWindow::choose(6, &config, &mut config.rng()),
            Err(PatternError::InvalidSourceData { .. })
        ));

        let empty = ClipConfig {
            sketch_length: 0,
            ..ClipConfig::default()
        };
        assert!(matches!(
            ClipWindow::choose(20, &empty, &mut empty.rng()),
            Err(PatternError::Configuration { .. })
        ));
    }

    // Tests the clip pair cuts the right frames and pads both sides
    // Verified by cutting the sketch clip with the digitalized range
    #[test]
    fn test_split_clip() {
        let binarized = numbered_frames(12);
        let sketch: Vec<Array2<u8>> = numbered_frames(12)
            .into_iter()
            .map(|frame| frame.mapv(|value| value + 100))
            .collect();
        let window = ClipWindow {
            sketch_start: 5,
            sketch_length: 3,
            extra: 2,
        };

        let pair = split_clip(&binarized, &sketch, &window, 1).unwrap();
        assert_eq!(firsts(&pair.digitalized), vec![128, 3, 4, 5, 6, 7, 8, 9, 128]);
        assert_eq!(firsts(&pair.sketch), vec![128, 105, 106, 107, 128]);
    }

    // Tests hand-built windows with more context than leading frames clamp at zero
    // Verified by subtracting the context frames without saturation
    #[test]
    fn test_window_ranges_clamp_at_first_frame() {
        let window = ClipWindow {
            sketch_start: 1,
            sketch_length: 2,
            extra: 3,
        };
        assert_eq!(window.sketch_range(), 1..3);
        assert_eq!(window.digitalized_range(), 0..6);

        let pair = split_clip(&numbered_frames(8), &numbered_frames(8), &window, 0).unwrap();
        assert_eq!(firsts(&pair.digitalized), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(firsts(&pair.sketch), vec![1, 2]);
    }

    // Tests windows past the shorter video are rejected
    // Verified by only checking the binarized length
    #[test]
    fn test_split_clip_out_of_range() {
        let window = ClipWindow {
            sketch_start: 5,
            sketch_length: 3,
            extra: 2,
        };
        assert!(matches!(
            split_clip(&numbered_frames(12), &numbered_frames(9), &window, 0),
            Err(PatternError::InvalidSourceData { .. })
        ));
    }

    // Tests id pairing reports the side each id is missing from
    // Verified by swapping the two lists in the error
    #[test]
    fn test_pair_clip_ids() {
        let ids = |names: &[&str]| names.iter().map(ToString::to_string).collect::<Vec<_>>();

        let paired = pair_clip_ids(ids(&["b", "a"]), ids(&["a", "b"])).unwrap();
        assert_eq!(paired, ids(&["a", "b"]));

        let result = pair_clip_ids(ids(&["a", "b"]), ids(&["b", "c"]));
        assert!(matches!(
            result,
            Err(PatternError::Alignment { ref missing_left, ref missing_right })
                if *missing_left == ids(&["c"]) && *missing_right == ids(&["a"])
        ));
    }

    // Tests ids are file stems with the prefix removed
    // Verified by keeping the file extension in the id
    #[test]
    fn test_clip_ids() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bin_02")).unwrap();
        fs::write(dir.path().join("bin_01.mp4"), b"").unwrap();
        fs::write(dir.path().join("bin_.mp4"), b"").unwrap();
        fs::write(dir.path().join("other_03.mp4"), b"").unwrap();

        assert_eq!(clip_ids(dir.path(), "bin_").unwrap(), vec!["01", "02"]);
        assert!(matches!(
            clip_ids(&dir.path().join("missing"), "bin_"),
            Err(PatternError::FileSystem { .. })
        ));
    }
}
