//! Piecewise-linear interpolation over tabulated correlations.

use crate::errors::{CalcError, CalcResult};

/// Linearly interpolate `y` at `x` over the table (`xs`, `ys`).
///
/// `xs` must be sorted ascending. Values outside the table are clamped to
/// the first/last `y`.
///
/// # Errors
///
/// * `InvalidInput` if the tables differ in length or are empty
///
/// # Example
///
/// ```rust
/// use soil_core::interpolation::interp1d;
///
/// let y = interp1d(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0], 1.5).unwrap();
/// assert_eq!(y, 15.0);
/// ```
pub fn interp1d(xs: &[f64], ys: &[f64], x: f64) -> CalcResult<f64> {
    if xs.len() != ys.len() {
        return Err(CalcError::invalid_input(
            "interp1d.ys",
            format!("{} values", ys.len()),
            format!("expected {} values to match xs", xs.len()),
        ));
    }

    let (Some(&x_first), Some(&x_last)) = (xs.first(), xs.last()) else {
        return Err(CalcError::invalid_input(
            "interp1d.xs",
            "[]",
            "interpolation table is empty",
        ));
    };

    if x <= x_first {
        return Ok(ys[0]);
    }
    if x >= x_last {
        return Ok(ys[ys.len() - 1]);
    }

    let segment = xs
        .windows(2)
        .position(|w| w[0] <= x && x <= w[1])
        .ok_or_else(|| {
            CalcError::invalid_input("interp1d.xs", format!("{:?}", xs), "table is not sorted ascending")
        })?;

    let (x0, x1) = (xs[segment], xs[segment + 1]);
    let (y0, y1) = (ys[segment], ys[segment + 1]);
    if x1 == x0 {
        return Ok(y0);
    }
    Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}
