//! Short paired clips cut from binarized videos and their sketches
//!
//! For each video a sketch window of `sketch_length` frames is drawn at
//! random, and a wider digitalized window extends it by `extra` frames on each
//! side. The digitalized clip is cut from the binarized video, the sketch clip
//! from the sketch video, and both are padded with neutral frames.

use crate::io::configuration::{
    DEFAULT_CLIP_EXTRA, DEFAULT_CLIP_PADDING, DEFAULT_SEED, DEFAULT_SKETCH_LENGTH, NEUTRAL_GRAY,
};
use crate::io::error::{PatternError, Result, configuration_error, file_system_error, invalid_source};
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;
use std::ops::Range;
use std::path::Path;

/// Parameters of clip extraction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipConfig {
    /// Frames in the sketch clip
    pub sketch_length: usize,
    /// Frames added on each side of the digitalized clip
    pub extra: usize,
    /// Neutral frames written before and after each clip
    pub padding: usize,
    /// Seed for the window choice
    pub seed: u64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            sketch_length: DEFAULT_SKETCH_LENGTH,
            extra: DEFAULT_CLIP_EXTRA,
            padding: DEFAULT_CLIP_PADDING,
            seed: DEFAULT_SEED,
        }
    }
}

impl ClipConfig {
    /// Shortest video a window can be drawn from
    pub const fn required_frames(&self) -> usize {
        self.sketch_length + 2 * self.extra
    }

    /// Check the window length
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for a zero sketch length.
    pub fn validate(&self) -> Result<()> {
        if self.sketch_length == 0 {
            return Err(configuration_error(
                "sketch_length",
                &self.sketch_length,
                &"must be at least 1",
            ));
        }
        Ok(())
    }

    /// Random source seeded from this configuration
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

/// Frame ranges of one clip pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipWindow {
    /// First frame of the sketch clip
    pub sketch_start: usize,
    /// Frames in the sketch clip
    pub sketch_length: usize,
    /// Frames added on each side of the digitalized clip
    pub extra: usize,
}

impl ClipWindow {
    /// Draw a window uniformly among those that fit `frame_count` frames
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an invalid configuration and
    /// `InvalidSourceData` if the video is shorter than
    /// [`ClipConfig::required_frames`].
    pub fn choose<R: Rng + ?Sized>(
        frame_count: usize,
        config: &ClipConfig,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;

        let needed = config.required_frames();
        if frame_count < needed {
            return Err(invalid_source(&format!(
                "video has {frame_count} frames, a clip needs {needed}"
            )));
        }

        let low = config.extra;
        let high = frame_count - config.extra - config.sketch_length;
        let sketch_start = rng.random_range(low..=high);

        Ok(Self {
            sketch_start,
            sketch_length: config.sketch_length,
            extra: config.extra,
        })
    }

    /// Frames of the sketch clip
    pub const fn sketch_range(&self) -> Range<usize> {
        self.sketch_start..self.sketch_start.saturating_add(self.sketch_length)
    }

    /// Frames of the digitalized clip
    ///
    /// Clamped at the first frame when `extra` exceeds `sketch_start`.
    pub const fn digitalized_range(&self) -> Range<usize> {
        let end = self.sketch_range().end.saturating_add(self.extra);
        self.sketch_start.saturating_sub(self.extra)..end
    }
}

/// A digitalized clip and its sketch clip, padding included
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipPair {
    /// Frames cut from the binarized video
    pub digitalized: Vec<Array2<u8>>,
    /// Frames cut from the sketch video
    pub sketch: Vec<Array2<u8>>,
}

/// Ids present on both sides, sorted
///
/// # Errors
///
/// Returns `Alignment` listing the ids missing on each side when the two sets
/// differ.
pub fn pair_clip_ids<I, J>(binarized_ids: I, sketch_ids: J) -> Result<Vec<String>>
where
    I: IntoIterator<Item = String>,
    J: IntoIterator<Item = String>,
{
    let binarized: BTreeSet<String> = binarized_ids.into_iter().collect();
    let sketch: BTreeSet<String> = sketch_ids.into_iter().collect();

    // Binarized videos are the left side
    let missing_left: Vec<String> = sketch.difference(&binarized).cloned().collect();
    let missing_right: Vec<String> = binarized.difference(&sketch).cloned().collect();

    if !missing_left.is_empty() || !missing_right.is_empty() {
        return Err(PatternError::Alignment {
            missing_left,
            missing_right,
        });
    }

    Ok(binarized.into_iter().collect())
}

/// Ids of the entries of `dir` named `<prefix><id>`, sorted
///
/// # Errors
///
/// Returns `FileSystem` if the directory cannot be listed.
pub fn clip_ids(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(file_system_error(dir, "read directory"))?;

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(file_system_error(dir, "read directory entry"))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let stem = Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(name);
        if let Some(id) = stem.strip_prefix(prefix).filter(|id| !id.is_empty()) {
            ids.push(id.to_string());
        }
    }
    ids.sort();
    Ok(ids)
}

/// Cut a clip pair out of a binarized video and its sketch
///
/// # Errors
///
/// Returns `InvalidSourceData` if the window does not fit the shorter video.
pub fn split_clip(
    binarized: &[Array2<u8>],
    sketch: &[Array2<u8>],
    window: &ClipWindow,
    padding: usize,
) -> Result<ClipPair> {
    let available = binarized.len().min(sketch.len());
    let digitalized_range = window.digitalized_range();
    if digitalized_range.end > available {
        return Err(invalid_source(&format!(
            "clip ends at frame {} but only {available} frames are paired",
            digitalized_range.end
        )));
    }

    let (Some(digitalized_frames), Some(sketch_frames), Some(first)) = (
        binarized.get(digitalized_range),
        sketch.get(window.sketch_range()),
        binarized.first(),
    ) else {
        return Err(invalid_source(&"clip window is outside the video"));
    };

    let neutral = Array2::from_elem(first.dim(), NEUTRAL_GRAY);
    let pad = |frames: &[Array2<u8>]| -> Vec<Array2<u8>> {
        let mut padded = Vec::with_capacity(frames.len() + 2 * padding);
        padded.extend(std::iter::repeat_n(&neutral, padding).cloned());
        padded.extend(frames.iter().cloned());
        padded.extend(std::iter::repeat_n(&neutral, padding).cloned());
        padded
    };

    Ok(ClipPair {
        digitalized: pad(digitalized_frames),
        sketch: pad(sketch_frames),
    })
}
