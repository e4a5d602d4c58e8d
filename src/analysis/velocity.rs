//! Temporal dynamicity of spatiotemporal patterns

use crate::analysis::catalog::PatternCatalog;
use crate::io::error::{Result, configuration_error};
use crate::math::codec::{PatternCode, WindowShape, decode_with_shape};
use ndarray::{Axis, s};
use std::borrow::Cow;

fn require_temporal(shape: WindowShape) -> Result<()> {
    if shape.time() > 1 {
        Ok(())
    } else {
        Err(configuration_error(
            "time_filter",
            &shape.time(),
            &"velocity is only defined for windows spanning more than one frame",
        ))
    }
}

/// Number of cells that change between consecutive frames of a pattern
///
/// # Errors
///
/// Returns `Configuration` for single-frame windows or codes that do not fit
/// the shape.
pub fn velocity(code: PatternCode, shape: WindowShape) -> Result<u32> {
    require_temporal(shape)?;
    let window = decode_with_shape(code, shape)?;

    let earlier = window.slice(s![..-1, .., ..]);
    let later = window.slice(s![1.., .., ..]);
    let changes = earlier
        .iter()
        .zip(later.iter())
        .filter(|(a, b)| a != b)
        .count();

    Ok(changes as u32)
}

/// Whether every frame of a pattern is identical to the first one
///
/// # Errors
///
/// Returns `Configuration` for single-frame windows or codes that do not fit
/// the shape.
pub fn is_static(code: PatternCode, shape: WindowShape) -> Result<bool> {
    require_temporal(shape)?;
    let window = decode_with_shape(code, shape)?;

    let first = window.index_axis(Axis(0), 0);
    Ok(window.axis_iter(Axis(0)).all(|frame| frame == first))
}

/// Fill the velocity of every row
///
/// With `inplace` the catalog is updated and borrowed back, otherwise an
/// independent copy is updated and returned. Selection is left untouched.
///
/// # Errors
///
/// Returns `Configuration` if the catalog's windows span a single frame.
pub fn add_velocity(
    catalog: &mut PatternCatalog,
    inplace: bool,
) -> Result<Cow<'_, PatternCatalog>> {
    let shape = catalog.shape();
    require_temporal(shape)?;

    let (target, ()) = catalog.modify(inplace, |target| {
        for index in 0..target.len() {
            if let Some(code) = target.records().get(index).map(|r| r.pattern_value) {
                let value = velocity(code, shape)?;
                target.set_velocity(index, value);
            }
        }
        Ok(())
    })?;

    Ok(target)
}
