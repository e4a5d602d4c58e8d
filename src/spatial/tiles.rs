//! Tile partitioning of video frames
//!
//! Frames are split into `S×S` tiles either as a non-overlapping raster
//! partition (sketch matching) or as every overlapping position (pattern
//! counting). Tiles that would cross the frame border are never produced.

/// Tile layout for frames of a fixed size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
    height: usize,
    width: usize,
    space: usize,
}

impl TileGrid {
    /// Create a tile layout for `height×width` frames and `space×space` tiles
    pub const fn new(height: usize, width: usize, space: usize) -> Self {
        Self {
            height,
            width,
            space,
        }
    }

    /// Frame dimensions `(height, width)`
    pub const fn frame_dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Tile side
    pub const fn space(&self) -> usize {
        self.space
    }

    /// Number of complete tile rows in the raster partition
    pub const fn tile_rows(&self) -> usize {
        if self.space == 0 {
            0
        } else {
            self.height / self.space
        }
    }

    /// Number of complete tile columns in the raster partition
    pub const fn tile_cols(&self) -> usize {
        if self.space == 0 {
            0
        } else {
            self.width / self.space
        }
    }

    /// Tiles evaluated per frame window in the raster partition
    pub const fn tile_count(&self) -> usize {
        self.tile_rows() * self.tile_cols()
    }

    /// Number of overlapping tile positions per frame
    pub const fn sliding_count(&self) -> usize {
        if self.space == 0 || self.space > self.height || self.space > self.width {
            0
        } else {
            (self.height - self.space + 1) * (self.width - self.space + 1)
        }
    }

    /// Top-left corners of the non-overlapping tiles in raster order
    pub fn tile_origins(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        let space = self.space;
        let cols = self.tile_cols();
        (0..self.tile_rows())
            .flat_map(move |row| (0..cols).map(move |col| [row * space, col * space]))
    }

    /// Top-left corners of every overlapping tile position in raster order
    pub fn sliding_origins(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        let (rows, cols) = if self.sliding_count() == 0 {
            (0, 0)
        } else {
            (
                self.height - self.space + 1,
                self.width - self.space + 1,
            )
        };
        (0..rows).flat_map(move |row| (0..cols).map(move |col| [row, col]))
    }
}
