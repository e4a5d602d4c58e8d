//! Tests for temporal frame buffering and bit volume stacking

#[cfg(test)]
mod tests {
    use motionpattern::PatternError;
    use motionpattern::spatial::FrameBuffer;
    use ndarray::{Array2, array};

    // Tests the buffer keeps only the newest frames
    // Verified by evicting the newest frame instead of the oldest
    #[test]
    fn test_push_evicts_oldest() {
        let mut buffer = FrameBuffer::new(2);
        for value in [1u8, 2, 3] {
            buffer.push(Array2::from_elem((2, 2), value)).unwrap();
        }

        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 2);
        let firsts: Vec<u8> = buffer
            .frames()
            .filter_map(|f| f.get([0, 0]).copied())
            .collect();
        assert_eq!(firsts, vec![2, 3]);
    }

    // Tests frame size changes are rejected
    // Verified by only recording the size of the first frame without checking
    #[test]
    fn test_push_rejects_size_mismatch() {
        let mut buffer = FrameBuffer::new(3);
        buffer.push(Array2::zeros((2, 2))).unwrap();

        let result = buffer.push(Array2::zeros((3, 2)));
        assert!(matches!(result, Err(PatternError::InvalidSourceData { .. })));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.frame_dim(), Some((2, 2)));
    }

    // Tests only foreground pixels become set bits
    // Verified by treating any non-zero pixel as foreground
    #[test]
    fn test_stacked_bits() {
        let mut buffer = FrameBuffer::new(2);
        buffer.push(array![[255, 0], [128, 255]]).unwrap();
        buffer.push(array![[0, 255], [255, 1]]).unwrap();

        let volume = buffer.stacked_bits().unwrap();
        assert_eq!(volume.dim(), (2, 2, 2));
        assert_eq!(volume.get([0, 0, 0]), Some(&1));
        assert_eq!(volume.get([0, 1, 0]), Some(&0));
        assert_eq!(volume.get([0, 1, 1]), Some(&1));
        assert_eq!(volume.get([1, 0, 1]), Some(&1));
        assert_eq!(volume.get([1, 1, 1]), Some(&0));
    }

    // Tests draining empties the buffer in arrival order
    // Verified by draining in reverse
    #[test]
    fn test_drain() {
        let mut buffer = FrameBuffer::new(3);
        assert!(buffer.stacked_bits().is_none());

        buffer.push(Array2::from_elem((1, 1), 10)).unwrap();
        buffer.push(Array2::from_elem((1, 1), 20)).unwrap();
        assert!(!buffer.is_full());

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(
            drained.first().and_then(|f| f.get([0, 0]).copied()),
            Some(10)
        );
        assert!(buffer.is_empty());
    }
}
