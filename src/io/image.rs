//! PNG rendering of pattern windows

use crate::io::configuration::{BACKGROUND_VALUE, FOREGROUND_VALUE, NEUTRAL_GRAY};
use crate::io::error::{PatternError, Result, configuration_error, file_system_error};
use crate::math::codec::{PatternCode, WindowShape, decode_with_shape};
use image::{GrayImage, Luma};
use ndarray::Axis;
use std::path::Path;

// Border width in pixels for a given cell scale
const fn border_width(scale: u32) -> u32 {
    if scale >= 4 { scale / 4 } else { 1 }
}

/// Draw the frames of a pattern side by side
///
/// Each cell becomes a `scale×scale` block, white for 1 and black for 0.
/// Frames are laid out left to right, earliest first, separated and
/// surrounded by a neutral gray border.
///
/// # Errors
///
/// Returns `Configuration` for a zero scale or a code that does not fit the
/// shape.
pub fn render_pattern(code: PatternCode, shape: WindowShape, scale: u32) -> Result<GrayImage> {
    if scale == 0 {
        return Err(configuration_error("scale", &scale, &"must be at least 1"));
    }

    let window = decode_with_shape(code, shape)?;
    let border = border_width(scale);
    let side = shape.space() as u32 * scale;
    let frames = shape.time() as u32;

    let width = frames * side + (frames + 1) * border;
    let height = side + 2 * border;
    let mut img = GrayImage::from_pixel(width, height, Luma([NEUTRAL_GRAY]));

    for (t, frame) in window.axis_iter(Axis(0)).enumerate() {
        let left = border + t as u32 * (side + border);
        for ((row, col), &bit) in frame.indexed_iter() {
            let value = if bit == 1 {
                FOREGROUND_VALUE
            } else {
                BACKGROUND_VALUE
            };
            let x0 = left + col as u32 * scale;
            let y0 = border + row as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(x0 + dx, y0 + dy, Luma([value]));
                }
            }
        }
    }

    Ok(img)
}

/// Render a pattern and save it as PNG
///
/// # Errors
///
/// Returns an error if:
/// - The scale is zero or the code does not fit the shape
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn save_pattern_png(
    code: PatternCode,
    shape: WindowShape,
    scale: u32,
    output_path: &Path,
) -> Result<()> {
    let img = render_pattern(code, shape, scale)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(file_system_error(parent, "create directory"))?;
    }

    img.save(output_path)
        .map_err(|source| PatternError::ImageExport {
            path: output_path.to_path_buf(),
            source,
        })?;

    Ok(())
}
