//! Grayscale to binary frame conversion

use crate::io::configuration::{BACKGROUND_VALUE, FOREGROUND_VALUE};
use crate::io::error::{Result, configuration_error};
use crate::math::probability::median;
use ndarray::Array2;

/// Thresholding rule applied to each frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Threshold {
    /// Global threshold at the median intensity of the frame
    Median,
    /// Local threshold at the mean of a `block×block` neighbourhood minus `c`
    Adaptive {
        /// Odd neighbourhood side, greater than one
        block: usize,
        /// Constant subtracted from the local mean
        c: i32,
    },
}

impl Threshold {
    /// Check the rule's parameters
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an even or unit adaptive block size.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Median => Ok(()),
            Self::Adaptive { block, .. } if block > 1 && block % 2 == 1 => Ok(()),
            Self::Adaptive { block, .. } => Err(configuration_error(
                "block",
                &block,
                &"adaptive block size must be odd and greater than 1",
            )),
        }
    }
}

/// Convert a grayscale frame to 0/255 pixels
///
/// Pixels strictly above the threshold become foreground.
///
/// # Errors
///
/// Returns `Configuration` if the threshold parameters are invalid.
pub fn binarize(frame: &Array2<u8>, threshold: Threshold) -> Result<Array2<u8>> {
    threshold.validate()?;

    match threshold {
        Threshold::Median => {
            let pixels: Vec<u8> = frame.iter().copied().collect();
            let Some(level) = median(&pixels) else {
                return Ok(frame.clone());
            };
            Ok(frame.mapv(|pixel| classify(f64::from(pixel), level)))
        }
        Threshold::Adaptive { block, c } => Ok(adaptive_mean(frame, block, c)),
    }
}

fn classify(value: f64, level: f64) -> u8 {
    if value > level {
        FOREGROUND_VALUE
    } else {
        BACKGROUND_VALUE
    }
}

// Borders replicate the nearest edge pixel
fn adaptive_mean(frame: &Array2<u8>, block: usize, c: i32) -> Array2<u8> {
    let (height, width) = frame.dim();
    if height == 0 || width == 0 {
        return frame.clone();
    }

    let radius = block / 2;
    let padded_h = height + 2 * radius;
    let padded_w = width + 2 * radius;

    // Summed-area table over the replicated frame, with a leading zero row/column
    let mut integral = Array2::<u64>::zeros((padded_h + 1, padded_w + 1));
    for i in 0..padded_h {
        let src_row = i.saturating_sub(radius).min(height - 1);
        let mut row_sum = 0u64;
        for j in 0..padded_w {
            let src_col = j.saturating_sub(radius).min(width - 1);
            row_sum += u64::from(frame.get((src_row, src_col)).copied().unwrap_or(0));
            let above = integral.get((i, j + 1)).copied().unwrap_or(0);
            if let Some(cell) = integral.get_mut((i + 1, j + 1)) {
                *cell = above + row_sum;
            }
        }
    }

    let area = (block * block) as f64;
    let at = |r: usize, col: usize| integral.get((r, col)).copied().unwrap_or(0);

    Array2::from_shape_fn((height, width), |(row, col)| {
        let (top, left) = (row, col);
        let (bottom, right) = (row + block, col + block);
        let sum = at(bottom, right) + at(top, left) - at(top, right) - at(bottom, left);
        let level = sum as f64 / area - f64::from(c);
        classify(
            f64::from(frame.get((row, col)).copied().unwrap_or(0)),
            level,
        )
    })
}
