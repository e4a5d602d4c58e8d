//! Measured pattern statistics from binarized videos
//!
//! Every overlapping `T×S×S` window (spatial and temporal stride 1) is encoded
//! and tallied. Windows never span two videos.

use crate::analysis::catalog::PatternCatalog;
use crate::io::error::{Result, invalid_source};
use crate::math::codec::{PatternCode, WindowShape, encode};
use crate::spatial::{FrameBuffer, TileGrid};
use ndarray::{Array2, s};
use std::collections::HashMap;

/// Frames consumed from one video
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoCount {
    /// Leading frames discarded before counting
    pub frames_skipped: usize,
    /// Frames fed to the counter
    pub frames_processed: usize,
}

/// Accumulates pattern occurrences across one or more videos
#[derive(Debug, Clone)]
pub struct PatternCounter {
    shape: WindowShape,
    buffer: FrameBuffer,
    counts: HashMap<PatternCode, u64>,
    windows_observed: u64,
    videos_observed: usize,
}

impl PatternCounter {
    /// Create an empty counter for the given window geometry
    pub fn new(shape: WindowShape) -> Self {
        Self {
            shape,
            buffer: FrameBuffer::new(shape.time()),
            counts: HashMap::new(),
            windows_observed: 0,
            videos_observed: 0,
        }
    }

    /// Window geometry being counted
    pub const fn shape(&self) -> WindowShape {
        self.shape
    }

    /// Feed the next binarized frame of the current video
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` if the frame size changes within a video.
    pub fn observe_frame(&mut self, frame: Array2<u8>) -> Result<()> {
        self.buffer.push(frame)?;
        if !self.buffer.is_full() {
            return Ok(());
        }

        let Some(volume) = self.buffer.stacked_bits() else {
            return Ok(());
        };
        let (_, height, width) = volume.dim();
        let space = self.shape.space();
        let grid = TileGrid::new(height, width, space);

        for [row, col] in grid.sliding_origins() {
            let window = volume.slice(s![.., row..row + space, col..col + space]);
            let code = encode(&window)?;
            *self.counts.entry(code).or_insert(0) += 1;
            self.windows_observed += 1;
        }

        Ok(())
    }

    /// Count a whole video, skipping leading frames and bounding the rest
    ///
    /// # Errors
    ///
    /// Propagates frame size mismatches from [`Self::observe_frame`].
    pub fn observe_video<I>(
        &mut self,
        frames: I,
        skip_frames: usize,
        max_frames: Option<usize>,
    ) -> Result<VideoCount>
    where
        I: IntoIterator<Item = Array2<u8>>,
    {
        let mut tally = VideoCount::default();
        let mut frames = frames.into_iter();

        for _ in 0..skip_frames {
            if frames.next().is_none() {
                break;
            }
            tally.frames_skipped += 1;
        }

        let limit = max_frames.unwrap_or(usize::MAX);
        for frame in frames.take(limit) {
            self.observe_frame(frame)?;
            tally.frames_processed += 1;
        }

        self.finish_video();
        Ok(tally)
    }

    /// Close the current video so the next frame starts a fresh window
    pub fn finish_video(&mut self) {
        self.buffer = FrameBuffer::new(self.shape.time());
        self.videos_observed += 1;
    }

    /// Occurrences per pattern code
    pub const fn counts(&self) -> &HashMap<PatternCode, u64> {
        &self.counts
    }

    /// Total windows tallied
    pub const fn total(&self) -> u64 {
        self.windows_observed
    }

    /// Videos closed so far
    pub const fn videos_observed(&self) -> usize {
        self.videos_observed
    }

    /// Normalize the tallies into a measured catalog ordered by code
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` if no window was counted.
    pub fn into_catalog(self) -> Result<PatternCatalog> {
        if self.windows_observed == 0 {
            return Err(invalid_source(&"no pattern was counted"));
        }

        let total = self.windows_observed as f64;
        let mut entries: Vec<(PatternCode, f64)> = self
            .counts
            .into_iter()
            .map(|(code, count)| (code, count as f64 / total))
            .collect();
        entries.sort_unstable_by_key(|&(code, _)| code);

        PatternCatalog::from_probabilities(self.shape, entries)
    }
}
