//! Temporal buffering of frames into spatiotemporal bit volumes

use crate::io::configuration::FOREGROUND_VALUE;
use crate::io::error::{Result, invalid_source};
use ndarray::{Array2, Array3, Axis};
use std::collections::VecDeque;

/// Bounded queue of equally sized frames, oldest first
///
/// Holds at most `depth` frames. Pushing into a full buffer evicts the oldest
/// frame, which gives a stride-1 sliding window; draining after each full
/// window gives a stride-`depth` partition.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    depth: usize,
    frames: VecDeque<Array2<u8>>,
    frame_dim: Option<(usize, usize)>,
}

impl FrameBuffer {
    /// Create an empty buffer holding up to `depth` frames
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            frames: VecDeque::with_capacity(depth),
            frame_dim: None,
        }
    }

    /// Append a frame, evicting the oldest one when full
    ///
    /// The first frame fixes the frame size for the lifetime of the buffer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` if the frame size differs from earlier frames.
    pub fn push(&mut self, frame: Array2<u8>) -> Result<()> {
        let dim = frame.dim();
        match self.frame_dim {
            Some(expected) if expected != dim => {
                return Err(invalid_source(&format!(
                    "frame of size {}x{} does not match earlier frames of size {}x{}",
                    dim.0, dim.1, expected.0, expected.1
                )));
            }
            Some(_) => {}
            None => self.frame_dim = Some(dim),
        }

        if self.depth == 0 {
            return Ok(());
        }
        if self.frames.len() == self.depth {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        Ok(())
    }

    /// Whether `depth` frames are buffered
    pub fn is_full(&self) -> bool {
        self.depth > 0 && self.frames.len() == self.depth
    }

    /// Number of buffered frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is buffered
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Size `(height, width)` fixed by the first pushed frame
    pub const fn frame_dim(&self) -> Option<(usize, usize)> {
        self.frame_dim
    }

    /// Buffered frames, oldest first
    pub fn frames(&self) -> impl Iterator<Item = &Array2<u8>> {
        self.frames.iter()
    }

    /// Remove and return all buffered frames, oldest first
    pub fn drain(&mut self) -> Vec<Array2<u8>> {
        self.frames.drain(..).collect()
    }

    /// Stack the buffered frames into a `len×H×W` volume of 0/1 bits
    ///
    /// Only pixels equal to the foreground value become set bits.
    pub fn stacked_bits(&self) -> Option<Array3<u8>> {
        let (height, width) = self.frame_dim?;
        let mut volume = Array3::zeros((self.frames.len(), height, width));
        for (mut plane, frame) in volume.axis_iter_mut(Axis(0)).zip(self.frames.iter()) {
            plane.zip_mut_with(frame, |bit, &pixel| {
                *bit = u8::from(pixel == FOREGROUND_VALUE);
            });
        }
        Some(volume)
    }
}
