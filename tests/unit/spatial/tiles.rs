//! Tests for raster and sliding tile layouts

#[cfg(test)]
mod tests {
    use motionpattern::spatial::TileGrid;

    // Tests raster partition drops incomplete border tiles
    // Verified by rounding tile counts up
    #[test]
    fn test_tile_origins_raster_order() {
        let grid = TileGrid::new(7, 6, 3);

        assert_eq!(grid.tile_rows(), 2);
        assert_eq!(grid.tile_cols(), 2);
        assert_eq!(grid.tile_count(), 4);

        let origins: Vec<[usize; 2]> = grid.tile_origins().collect();
        assert_eq!(origins, vec![[0, 0], [0, 3], [3, 0], [3, 3]]);
    }

    // Tests sliding positions cover every overlapping placement
    // Verified by using the tile side as stride
    #[test]
    fn test_sliding_origins() {
        let grid = TileGrid::new(4, 5, 3);

        assert_eq!(grid.sliding_count(), 6);
        let origins: Vec<[usize; 2]> = grid.sliding_origins().collect();
        assert_eq!(origins.len(), 6);
        assert_eq!(origins.first(), Some(&[0, 0]));
        assert_eq!(origins.get(2), Some(&[0, 2]));
        assert_eq!(origins.last(), Some(&[1, 2]));
    }

    // Tests frames smaller than a tile yield nothing
    // Verified by removing the size guard in sliding_count
    #[test]
    fn test_frame_smaller_than_tile() {
        let grid = TileGrid::new(2, 2, 3);

        assert_eq!(grid.tile_count(), 0);
        assert_eq!(grid.sliding_count(), 0);
        assert_eq!(grid.tile_origins().count(), 0);
        assert_eq!(grid.sliding_origins().count(), 0);
    }

    // Tests zero tile side is inert
    // Verified by dividing by the tile side unconditionally
    #[test]
    fn test_zero_space() {
        let grid = TileGrid::new(4, 4, 0);

        assert_eq!(grid.tile_count(), 0);
        assert_eq!(grid.sliding_count(), 0);
        assert_eq!(grid.frame_dim(), (4, 4));
        assert_eq!(grid.space(), 0);
    }
}
