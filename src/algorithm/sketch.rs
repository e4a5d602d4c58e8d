//! Sketch video synthesis from an allowed pattern set
//!
//! Frames are grouped into non-overlapping windows of `T` frames and each
//! window is cut into non-overlapping `S×S` tiles in raster order. A tile
//! whose code is allowed keeps its original pixels in all `T` output frames,
//! every other pixel is set to the neutral value. Tiles crossing the frame
//! border and frames of an incomplete trailing window are never evaluated and
//! come out neutral.

use crate::algorithm::prefilter::PrefilterIndex;
use crate::analysis::catalog::PatternCatalog;
use crate::io::configuration::{NEUTRAL_GRAY, PREFILTER_TABLE_SIZE};
use crate::io::error::Result;
use crate::math::codec::{PatternCode, WindowShape, encode};
use crate::spatial::{FrameBuffer, TileGrid};
use ndarray::{Array2, s};
use std::collections::HashSet;
use std::fmt;

/// Parameters of a sketch run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SketchConfig {
    /// Window geometry used for matching
    pub shape: WindowShape,
    /// Upper bound on input frames consumed
    pub max_frames: Option<usize>,
    /// Fill value for rejected tiles
    pub neutral_value: u8,
    /// Slot count of the hash pre-filter
    pub prefilter_size: usize,
}

impl SketchConfig {
    /// Default neutral gray and pre-filter size, no frame limit
    pub const fn new(shape: WindowShape) -> Self {
        Self {
            shape,
            max_frames: None,
            neutral_value: NEUTRAL_GRAY,
            prefilter_size: PREFILTER_TABLE_SIZE,
        }
    }

    /// Stop after consuming `max_frames` input frames
    #[must_use]
    pub const fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Fill rejected tiles with `value`
    #[must_use]
    pub const fn with_neutral_value(mut self, value: u8) -> Self {
        self.neutral_value = value;
        self
    }

    /// Use a pre-filter table of `size` slots
    #[must_use]
    pub const fn with_prefilter_size(mut self, size: usize) -> Self {
        self.prefilter_size = size;
        self
    }
}

/// Tallies for one temporal window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowRecord {
    /// Index of the window's first input frame
    pub frame_index: usize,
    /// Tiles evaluated in the window
    pub evaluated: usize,
    /// Tiles that passed the pre-filter
    pub candidates_hash: usize,
    /// Tiles whose code is allowed
    pub accepted: usize,
}

/// Aggregate tallies of a sketch run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SketchStats {
    /// `accepted / evaluated`, or 0 when nothing was evaluated
    pub ratio: f64,
    /// Input frames consumed
    pub frame_count: usize,
    /// Tiles evaluated
    pub evaluated: usize,
    /// Tiles kept
    pub accepted: usize,
    /// One record per complete window, in order
    pub per_window: Vec<WindowRecord>,
}

impl SketchStats {
    fn record(&mut self, window: WindowRecord) {
        self.evaluated += window.evaluated;
        self.accepted += window.accepted;
        self.per_window.push(window);
    }

    fn finish(&mut self) {
        self.ratio = if self.evaluated == 0 {
            0.0
        } else {
            self.accepted as f64 / self.evaluated as f64
        };
    }

    /// Tiles that passed the pre-filter across all windows
    pub fn candidates_hash(&self) -> usize {
        self.per_window.iter().map(|w| w.candidates_hash).sum()
    }
}

impl fmt::Display for SketchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames: {}, windows: {}, tiles evaluated: {}, tiles accepted: {}, ratio: {:.6}",
            self.frame_count,
            self.per_window.len(),
            self.evaluated,
            self.accepted,
            self.ratio
        )
    }
}

/// Keeps the tiles of a binarized video whose pattern is allowed
///
/// Allowing every code reproduces the input pixel for pixel only when the
/// frame height and width are multiples of `S` and the frame count is a
/// multiple of `T`. Otherwise the uncovered border and trailing frames still
/// come out neutral.
#[derive(Clone, Debug)]
pub struct SketchMatcher {
    config: SketchConfig,
    allowed: HashSet<PatternCode>,
    prefilter: PrefilterIndex,
}

impl SketchMatcher {
    /// Create a matcher for an explicit allowed set
    ///
    /// An empty set is valid and rejects every tile.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for a zero pre-filter size.
    pub fn new<I>(config: SketchConfig, allowed: I) -> Result<Self>
    where
        I: IntoIterator<Item = PatternCode>,
    {
        let allowed: HashSet<PatternCode> = allowed.into_iter().collect();
        let prefilter = PrefilterIndex::from_codes(allowed.iter().copied(), config.prefilter_size)?;

        tracing::debug!(
            allowed = allowed.len(),
            prefilter = %prefilter,
            "sketch matcher ready"
        );

        Ok(Self {
            config,
            allowed,
            prefilter,
        })
    }

    /// Create a matcher allowing the selected rows of a catalog
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the catalog was built for another window
    /// geometry or the pre-filter size is zero.
    pub fn from_catalog(config: SketchConfig, catalog: &PatternCatalog) -> Result<Self> {
        catalog.ensure_shape(config.shape)?;
        Self::new(config, catalog.selected_codes())
    }

    /// Run parameters
    pub const fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Allowed pattern codes
    pub const fn allowed(&self) -> &HashSet<PatternCode> {
        &self.allowed
    }

    /// Stream frames through the matcher, handing each output frame to `sink`
    ///
    /// Output frames come out in input order, one per consumed input frame.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` if frame sizes differ, and propagates any
    /// error returned by `sink`.
    pub fn process_stream<I, F>(&self, frames: I, mut sink: F) -> Result<SketchStats>
    where
        I: IntoIterator<Item = Array2<u8>>,
        F: FnMut(Array2<u8>) -> Result<()>,
    {
        let depth = self.config.shape.time();
        let limit = self.config.max_frames.unwrap_or(usize::MAX);
        let mut buffer = FrameBuffer::new(depth);
        let mut stats = SketchStats::default();

        for frame in frames.into_iter().take(limit) {
            buffer.push(frame)?;
            stats.frame_count += 1;

            if buffer.is_full() {
                let frame_index = stats.frame_count - depth;
                let (outputs, window) = self.match_window(&mut buffer, frame_index)?;
                stats.record(window);
                for output in outputs {
                    sink(output)?;
                }
            }
        }

        let trailing = buffer.drain();
        if !trailing.is_empty() {
            tracing::debug!(
                frames = trailing.len(),
                "incomplete trailing window written as neutral"
            );
        }
        for frame in trailing {
            sink(Array2::from_elem(frame.dim(), self.config.neutral_value))?;
        }

        stats.finish();
        tracing::debug!(%stats, "sketch complete");
        Ok(stats)
    }

    /// Process a whole sequence in memory
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` if frame sizes differ.
    pub fn process<I>(&self, frames: I) -> Result<(Vec<Array2<u8>>, SketchStats)>
    where
        I: IntoIterator<Item = Array2<u8>>,
    {
        let mut outputs = Vec::new();
        let stats = self.process_stream(frames, |frame| {
            outputs.push(frame);
            Ok(())
        })?;
        Ok((outputs, stats))
    }

    fn match_window(
        &self,
        buffer: &mut FrameBuffer,
        frame_index: usize,
    ) -> Result<(Vec<Array2<u8>>, WindowRecord)> {
        let mut record = WindowRecord {
            frame_index,
            ..WindowRecord::default()
        };
        let volume = buffer.stacked_bits();
        let frames = buffer.drain();
        let Some(volume) = volume else {
            return Ok((frames, record));
        };

        let (_, height, width) = volume.dim();
        let space = self.config.shape.space();
        let grid = TileGrid::new(height, width, space);
        let mut outputs: Vec<Array2<u8>> = frames
            .iter()
            .map(|_| Array2::from_elem((height, width), self.config.neutral_value))
            .collect();

        for [row, col] in grid.tile_origins() {
            record.evaluated += 1;

            let window = volume.slice(s![.., row..row + space, col..col + space]);
            let code = encode(&window)?;
            if !self.prefilter.may_contain(code) {
                continue;
            }
            record.candidates_hash += 1;

            if self.allowed.contains(&code) {
                record.accepted += 1;
                for (output, source) in outputs.iter_mut().zip(&frames) {
                    output
                        .slice_mut(s![row..row + space, col..col + space])
                        .assign(&source.slice(s![row..row + space, col..col + space]));
                }
            }
        }

        tracing::trace!(
            frame_index,
            evaluated = record.evaluated,
            candidates = record.candidates_hash,
            accepted = record.accepted,
            "window matched"
        );

        Ok((outputs, record))
    }
}
