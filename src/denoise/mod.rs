//! Multi-frame compositing and denoising
//!
//! Turns a date range of brightness tiles into one denoised light-pollution
//! frame: temporal averaging, rounding and rescaling to the full intensity
//! range, a local adaptive filter pass, midtone suppression, and a second
//! adaptive pass. The whole pipeline is deterministic: identical frames and
//! configuration produce bit-identical output.

mod suppress;
mod wiener;

pub use suppress::MIDTONE_BASELINE;

use crate::coord::TileAddress;
use crate::tile::TileImage;
use ndarray::Array2;
use thiserror::Error;
use tracing::debug;

/// Default adaptive-filter window edge length.
pub const DEFAULT_WINDOW: usize = 5;

/// Default band-reject bandwidth.
pub const DEFAULT_BANDWIDTH: f64 = 40.0;

/// Default band-reject ratio.
pub const DEFAULT_REJECT: f64 = 0.4;

/// Errors from the compositing pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DenoiseError {
    /// No input frames were given
    #[error("cannot composite an empty frame sequence")]
    EmptyInput,

    /// Input frames disagree on pixel dimensions
    #[error("frame {index} has shape {got:?}, expected {expected:?}")]
    FrameShape {
        index: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// Adaptive-filter window must be odd and non-zero
    #[error("adaptive filter window must be odd and non-zero, got {0}")]
    BadWindow(usize),
}

/// Midtone suppression strategy selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidtoneStrategy {
    /// Halve values inside the fixed band around the baseline.
    Clip,
    /// Smooth band-reject transfer curve centered on the baseline.
    BandReject {
        /// Width of the rejected band
        bandwidth: f64,
        /// Fraction of the signal routed through the notch (0 = no-op)
        reject: f64,
    },
}

impl MidtoneStrategy {
    /// Band-reject with the default bandwidth and ratio.
    pub fn band_reject() -> Self {
        Self::BandReject {
            bandwidth: DEFAULT_BANDWIDTH,
            reject: DEFAULT_REJECT,
        }
    }
}

/// Configuration of the compositing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DenoiseConfig {
    /// Adaptive-filter window edge length (odd, default 5)
    pub window: usize,
    /// Midtone suppression strategy
    pub strategy: MidtoneStrategy,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            strategy: MidtoneStrategy::Clip,
        }
    }
}

impl DenoiseConfig {
    /// Set the adaptive-filter window.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the midtone suppression strategy.
    pub fn with_strategy(mut self, strategy: MidtoneStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// A denoised light-pollution frame.
///
/// Same pixel grid as its input tiles, floating-point intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFrame {
    /// Position in the tile pyramid
    pub address: TileAddress,
    /// Denoised intensity values
    pub pixels: Array2<f64>,
}

impl CompositeFrame {
    /// Frame height and width in pixels.
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }
}

/// Composites a date range of tiles into one denoised frame.
///
/// Steps, in order: per-pixel mean over all frames (floating-point
/// accumulation), round and rescale so the maximum maps to 255 (an
/// all-zero frame is left unchanged rather than divided by zero), a first
/// adaptive filter pass, midtone suppression per the configured strategy,
/// and a second adaptive pass.
///
/// # Arguments
///
/// * `frames` - Same-shape tiles sharing one address, date-ascending
/// * `config` - Pipeline configuration
pub fn composite(
    frames: &[TileImage],
    config: &DenoiseConfig,
) -> Result<CompositeFrame, DenoiseError> {
    let first = frames.first().ok_or(DenoiseError::EmptyInput)?;
    if config.window == 0 || config.window % 2 == 0 {
        return Err(DenoiseError::BadWindow(config.window));
    }

    let shape = first.dim();
    for (index, frame) in frames.iter().enumerate() {
        if frame.dim() != shape {
            return Err(DenoiseError::FrameShape {
                index,
                expected: shape,
                got: frame.dim(),
            });
        }
    }

    debug!(
        tile = %first.address,
        frames = frames.len(),
        window = config.window,
        "Compositing frame sequence"
    );

    let mut acc = temporal_mean(frames, shape);
    round_and_rescale(&mut acc);

    let mut filtered = wiener::adaptive_filter(&acc, config.window);

    match config.strategy {
        MidtoneStrategy::Clip => suppress::clip_band(&mut filtered),
        MidtoneStrategy::BandReject { bandwidth, reject } => {
            suppress::band_reject(&mut filtered, bandwidth, reject)
        }
    }

    let pixels = wiener::adaptive_filter(&filtered, config.window);

    Ok(CompositeFrame {
        address: first.address,
        pixels,
    })
}

/// Per-pixel mean across all frames, accumulated in floating point.
fn temporal_mean(frames: &[TileImage], shape: (usize, usize)) -> Array2<f64> {
    let n = frames.len() as f64;
    let mut acc = Array2::<f64>::zeros(shape);

    for frame in frames {
        acc.zip_mut_with(&frame.pixels.mapv(|v| v as f64), |a, &v| *a += v / n);
    }

    acc
}

/// Rounds to the nearest integer, then rescales so the maximum maps to 255.
///
/// An all-zero frame is returned unchanged: the rescale must never divide
/// by zero.
fn round_and_rescale(frame: &mut Array2<f64>) {
    frame.mapv_inplace(f64::round);

    let max = frame.iter().cloned().fold(0.0_f64, f64::max);
    if max > 0.0 {
        let scale = 255.0 / max;
        frame.mapv_inplace(|v| v * scale);
    }
}
