//! 2-D Gaussian kernel density estimation on a fixed-resolution grid.

use itertools::Itertools;

/// Inclusive value range for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Evaluated density surface. `z[i * y.len() + j]` is the density at
/// `(x[i], y[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// Fits a Gaussian KDE to the sample pairs and evaluates it on a
/// `size` x `size` grid spanning the given ranges (observed min/max when
/// not fixed by configuration).
///
/// Bandwidth follows Scott's rule per axis: sample standard deviation
/// times n^(-1/6). Returns None when no meaningful estimate exists —
/// fewer than two finite sample pairs, or zero variance on either axis.
pub fn density_grid(
    xs: &[f64],
    ys: &[f64],
    size: usize,
    x_range: Option<AxisRange>,
    y_range: Option<AxisRange>,
) -> Option<DensityGrid> {
    debug_assert_eq!(xs.len(), ys.len());

    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let n = pairs.len();
    if n < 2 || size < 2 {
        return None;
    }

    let sample_xs: Vec<f64> = pairs.iter().map(|&(x, _)| x).collect();
    let sample_ys: Vec<f64> = pairs.iter().map(|&(_, y)| y).collect();

    let factor = (n as f64).powf(-1.0 / 6.0);
    let hx = std_dev(&sample_xs)? * factor;
    let hy = std_dev(&sample_ys)? * factor;
    if hx <= 0.0 || hy <= 0.0 {
        return None;
    }

    let x_axis = x_range.or_else(|| observed_range(&sample_xs))?;
    let y_axis = y_range.or_else(|| observed_range(&sample_ys))?;
    let grid_x = linspace(x_axis, size);
    let grid_y = linspace(y_axis, size);

    let norm = 1.0 / (n as f64 * 2.0 * std::f64::consts::PI * hx * hy);
    let mut z = Vec::with_capacity(size * size);
    for &gx in &grid_x {
        for &gy in &grid_y {
            let sum: f64 = pairs
                .iter()
                .map(|&(px, py)| {
                    let dx = (gx - px) / hx;
                    let dy = (gy - py) / hy;
                    (-0.5 * (dx * dx + dy * dy)).exp()
                })
                .sum();
            z.push(norm * sum);
        }
    }

    Some(DensityGrid {
        x: grid_x,
        y: grid_y,
        z,
    })
}

/// Evenly spaced iso-values between the surface's minimum and maximum
/// density, with the lowest dropped so the outermost contour does not
/// trace the grid's bounding box.
pub fn contour_levels(z: &[f64], count: usize) -> Vec<f64> {
    let Some((&min, &max)) = z.iter().minmax().into_option() else {
        return Vec::new();
    };
    if count < 2 {
        return Vec::new();
    }
    let step = (max - min) / (count - 1) as f64;
    (1..count).map(|i| min + step * i as f64).collect()
}

fn linspace(range: AxisRange, size: usize) -> Vec<f64> {
    let step = (range.max - range.min) / (size - 1) as f64;
    (0..size).map(|i| range.min + step * i as f64).collect()
}

fn observed_range(values: &[f64]) -> Option<AxisRange> {
    let (&min, &max) = values.iter().minmax().into_option()?;
    (max > min).then_some(AxisRange { min, max })
}

/// Sample standard deviation (n - 1 denominator); None for non-finite input.
fn std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    var.is_finite().then(|| var.sqrt())
}
