//! Midtone suppression strategies.
//!
//! After averaging and adaptive filtering, a mid-brightness band remains
//! that is dominated by scattered/ambient light rather than true sources.
//! Two interchangeable strategies flatten it: a hard clip of the band, or a
//! smooth band-reject transfer curve without the clip's edges.

use ndarray::Array2;

/// Baseline intensity the suppression band is centered on.
pub const MIDTONE_BASELINE: f64 = 60.0;

/// Lower bound of the clip band, as a multiple of the baseline.
const CLIP_LOW: f64 = 0.9;
/// Upper bound of the clip band, as a multiple of the baseline.
const CLIP_HIGH: f64 = 1.7;
/// Attenuation applied inside the clip band.
const CLIP_FACTOR: f64 = 0.5;

/// Halves every value inside the inclusive band
/// [0.9 × baseline, 1.7 × baseline].
pub(crate) fn clip_band(frame: &mut Array2<f64>) {
    let low = CLIP_LOW * MIDTONE_BASELINE;
    let high = CLIP_HIGH * MIDTONE_BASELINE;

    frame.mapv_inplace(|v| {
        if (low..=high).contains(&v) {
            v * CLIP_FACTOR
        } else {
            v
        }
    });
}

/// Applies a smooth band-reject transfer curve centered on the baseline.
///
/// Each value is scaled by
///
/// ```text
/// sqrt((a² - v²)² / ((2·bw)²·v² + (a² - v²)²)) · r + (1 - r)
/// ```
///
/// with `a` the baseline, `bw` the bandwidth, and `r` the reject ratio.
/// The gain dips to `1 - r` at the baseline and approaches 1 far from it,
/// a notch without the clip strategy's hard edges.
pub(crate) fn band_reject(frame: &mut Array2<f64>, bandwidth: f64, reject: f64) {
    let a2 = MIDTONE_BASELINE * MIDTONE_BASELINE;
    let bw2 = (2.0 * bandwidth) * (2.0 * bandwidth);

    frame.mapv_inplace(|v| {
        let d = a2 - v * v;
        let notch = (d * d / (bw2 * v * v + d * d)).sqrt();
        v * (notch * reject + (1.0 - reject))
    });
}
