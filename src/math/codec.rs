//! Bijective encoding between binary spatiotemporal windows and integer codes
//!
//! A window of shape `T×S×S` is read in (frame, row, column) order with the
//! earliest frame first. The cell at linear position `k` carries weight
//! `2^(n - 1 - k)` where `n = T·S²`, so the top-left cell of the earliest frame
//! is the most significant bit. The codec holds no state: every call receives
//! the window geometry explicitly.

use crate::io::configuration::MAX_CODE_BITS;
use crate::io::error::{PatternError, Result, configuration_error};
use ndarray::{Array3, ArrayView3};

/// Integer encoding of a window's bit content
pub type PatternCode = u64;

/// Geometry of a spatiotemporal window (`time` frames of `space×space` cells)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowShape {
    time: usize,
    space: usize,
}

impl WindowShape {
    /// Validate and build a window shape
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if either dimension is zero and `WindowTooLarge`
    /// if `time * space²` exceeds 64 bits.
    pub fn new(time: usize, space: usize) -> Result<Self> {
        if time == 0 {
            return Err(configuration_error(
                "time_filter",
                &time,
                &"must be at least 1",
            ));
        }
        if space == 0 {
            return Err(configuration_error(
                "space_filter",
                &space,
                &"must be at least 1",
            ));
        }

        let bits = space
            .checked_mul(space)
            .and_then(|area| area.checked_mul(time))
            .unwrap_or(usize::MAX);
        if bits > MAX_CODE_BITS {
            return Err(PatternError::WindowTooLarge { time, space, bits });
        }

        Ok(Self { time, space })
    }

    /// Temporal depth `T`
    pub const fn time(&self) -> usize {
        self.time
    }

    /// Spatial side `S`
    pub const fn space(&self) -> usize {
        self.space
    }

    /// Cells in one frame of the window
    pub const fn area(&self) -> usize {
        self.space * self.space
    }

    /// Total bits in the code (`T·S²`)
    pub const fn bits(&self) -> usize {
        self.time * self.space * self.space
    }

    /// Largest representable code for this geometry
    pub const fn max_code(&self) -> PatternCode {
        if self.bits() >= MAX_CODE_BITS {
            PatternCode::MAX
        } else {
            (1 << self.bits()) - 1
        }
    }

    /// Array dimensions `(T, S, S)` of a window
    pub const fn dim(&self) -> (usize, usize, usize) {
        (self.time, self.space, self.space)
    }
}

/// Encode a binary window into its pattern code
///
/// Any non-zero cell counts as a set bit.
///
/// # Errors
///
/// Returns `WindowTooLarge` if the window holds more than 64 cells and
/// `Configuration` if it is not of shape `T×S×S`.
pub fn encode(window: &ArrayView3<'_, u8>) -> Result<PatternCode> {
    let (time, rows, cols) = window.dim();
    if rows != cols {
        return Err(configuration_error(
            "window",
            &format!("{time}x{rows}x{cols}"),
            &"spatial extent must be square",
        ));
    }
    WindowShape::new(time, rows)?;

    Ok(window
        .iter()
        .fold(0, |code, &cell| (code << 1) | PatternCode::from(cell != 0)))
}

/// Decode a pattern code into a `T×S×S` window of 0/1 cells
///
/// # Errors
///
/// Returns the shape validation errors of [`WindowShape::new`], and
/// `Configuration` if the code does not fit in `T·S²` bits.
pub fn decode(code: PatternCode, time: usize, space: usize) -> Result<Array3<u8>> {
    let shape = WindowShape::new(time, space)?;
    decode_with_shape(code, shape)
}

/// Decode a pattern code with an already validated shape
///
/// # Errors
///
/// Returns `Configuration` if the code does not fit in the shape's bits.
pub fn decode_with_shape(code: PatternCode, shape: WindowShape) -> Result<Array3<u8>> {
    if code > shape.max_code() {
        return Err(configuration_error(
            "pattern_code",
            &code,
            &format!("exceeds {} bits of a {:?} window", shape.bits(), shape.dim()),
        ));
    }

    let bits = shape.bits();
    let cells: Vec<u8> = (0..bits)
        .map(|k| ((code >> (bits - 1 - k)) & 1) as u8)
        .collect();

    Array3::from_shape_vec(shape.dim(), cells).map_err(|e| PatternError::InvalidSourceData {
        reason: format!("decoded window has inconsistent shape: {e}"),
    })
}
