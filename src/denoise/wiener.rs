//! Local adaptive (Wiener-style) filtering.

use ndarray::Array2;

/// Applies a local adaptive filter with the given square window.
///
/// For each pixel, the local mean and variance are estimated over the
/// window (zero-padded at the edges, always normalized by the full window
/// area). The noise power is the mean of all local variances. Each output
/// pixel is then
///
/// ```text
/// local_mean + max(0, 1 - noise / local_var) * (input - local_mean)
/// ```
///
/// so flat regions collapse to their local mean while strong local signal
/// passes through. The computation is sequential floating-point with no
/// randomness: identical input yields identical output.
pub(crate) fn adaptive_filter(input: &Array2<f64>, window: usize) -> Array2<f64> {
    let (height, width) = input.dim();
    let half = (window / 2) as isize;
    let area = (window * window) as f64;

    let mut local_mean = Array2::<f64>::zeros((height, width));
    let mut local_var = Array2::<f64>::zeros((height, width));

    for i in 0..height {
        for j in 0..width {
            let mut sum = 0.0;
            let mut sum_sq = 0.0;

            for wi in -half..=half {
                for wj in -half..=half {
                    let ii = i as isize + wi;
                    let jj = j as isize + wj;
                    if ii >= 0 && ii < height as isize && jj >= 0 && jj < width as isize {
                        let v = input[[ii as usize, jj as usize]];
                        sum += v;
                        sum_sq += v * v;
                    }
                }
            }

            let mean = sum / area;
            local_mean[[i, j]] = mean;
            local_var[[i, j]] = (sum_sq / area - mean * mean).max(0.0);
        }
    }

    // Noise power estimate: the average local variance across the frame.
    let noise = local_var.mean().unwrap_or(0.0);

    let mut output = Array2::<f64>::zeros((height, width));
    for i in 0..height {
        for j in 0..width {
            let mean = local_mean[[i, j]];
            let var = local_var[[i, j]];
            output[[i, j]] = if var <= noise {
                mean
            } else {
                mean + (1.0 - noise / var) * (input[[i, j]] - mean)
            };
        }
    }

    output
}
