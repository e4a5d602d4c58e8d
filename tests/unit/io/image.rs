//! Tests for PNG rendering of pattern windows

#[cfg(test)]
mod tests {
    use motionpattern::PatternError;
    use motionpattern::io::image::{render_pattern, save_pattern_png};
    use motionpattern::math::codec::WindowShape;
    use tempfile::TempDir;

    fn luma(img: &image::GrayImage, x: u32, y: u32) -> u8 {
        let image::Luma([value]) = *img.get_pixel(x, y);
        value
    }

    // Tests frames are laid out left to right with separating borders
    // Verified by stacking frames vertically
    #[test]
    fn test_render_layout() {
        let shape = WindowShape::new(2, 1).unwrap();
        let img = render_pattern(0b10, shape, 4).unwrap();

        assert_eq!(img.dimensions(), (11, 6));
        assert_eq!(luma(&img, 0, 0), 128);
        assert_eq!(luma(&img, 1, 1), 255);
        assert_eq!(luma(&img, 4, 4), 255);
        assert_eq!(luma(&img, 5, 2), 128);
        assert_eq!(luma(&img, 6, 1), 0);
        assert_eq!(luma(&img, 9, 4), 0);
        assert_eq!(luma(&img, 10, 5), 128);
    }

    // Tests cells follow raster order within a frame
    // Verified by transposing rows and columns when drawing
    #[test]
    fn test_render_cell_positions() {
        let shape = WindowShape::new(1, 2).unwrap();
        // Only the top-right cell is set
        let img = render_pattern(0b0100, shape, 1).unwrap();

        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(luma(&img, 1, 1), 0);
        assert_eq!(luma(&img, 2, 1), 255);
        assert_eq!(luma(&img, 1, 2), 0);
        assert_eq!(luma(&img, 2, 2), 0);
    }

    // Tests invalid arguments
    // Verified by clamping the scale to one
    #[test]
    fn test_render_errors() {
        let shape = WindowShape::new(1, 2).unwrap();
        assert!(matches!(
            render_pattern(1, shape, 0),
            Err(PatternError::Configuration { .. })
        ));
        assert!(matches!(
            render_pattern(16, shape, 4),
            Err(PatternError::Configuration { .. })
        ));
    }

    // Tests PNG export creates missing directories
    // Verified by disabling file save operation
    #[test]
    fn test_save_pattern_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patterns/511.png");

        save_pattern_png(511, WindowShape::new(1, 3).unwrap(), 8, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.dimensions(), (28, 28));
        assert_eq!(luma(&loaded, 2, 2), 255);
        assert_eq!(luma(&loaded, 0, 0), 128);
    }
}
