//! Per-block statistics over a 3x3 pixel neighborhood.
//!
//! For one block this computes, per channel, the mean I/F and the clamped
//! log10 relative standard deviation of the 9 member intensities, plus the
//! angular spread (incidence, emission, phase) over the same 9 pixels.

use crate::cube::CubeAccess;
use crate::sampler::PixelCoord;
use crate::stats::{clamp_relative_std, mean, relative_std};
use crate::NUM_CHANNELS;

/// Mean and relative standard deviation of one angle over a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleStats {
    /// Relative standard deviation `std / mean`. Unlike the intensity
    /// statistic this is *not* clamped: downstream consumers filter blocks
    /// on the raw ratio.
    pub rel_std: f64,
    /// Mean angle (degrees).
    pub mean: f64,
}

/// Full statistics for one 3x3 block.
#[derive(Debug, Clone)]
pub struct BlockStats {
    /// Center pixel (1-based sample, line).
    pub center: PixelCoord,
    /// Planetocentric latitude of the center pixel (degrees).
    pub lat: f64,
    /// Planetocentric West longitude of the center pixel (degrees).
    pub lon: f64,
    /// Ground resolution of the center pixel (km/px).
    pub res: f64,
    /// log10 of the clamped per-channel relative standard deviation of I/F.
    pub log_rel_std: [f64; NUM_CHANNELS],
    /// Per-channel mean I/F over the 9 pixels.
    pub mean_if: [f64; NUM_CHANNELS],
    pub inc: AngleStats,
    pub eme: AngleStats,
    pub phase: AngleStats,
}

/// The 9 member pixels of the block centered on `c`, row by row.
pub fn block_pixels(c: PixelCoord) -> [PixelCoord; 9] {
    let mut pixels = [c; 9];
    let mut k = 0;
    for dl in -1i32..=1 {
        for ds in -1i32..=1 {
            pixels[k] = PixelCoord {
                sample: (c.sample as i32 + ds) as u32,
                line: (c.line as i32 + dl) as u32,
            };
            k += 1;
        }
    }
    pixels
}

/// Compute all statistics for the block centered on `center`.
///
/// The caller guarantees `center` lies in the cube interior so that all 9
/// member pixels exist (the sampler never produces anything else).
pub fn analyze_block(cube: &dyn CubeAccess, center: PixelCoord) -> BlockStats {
    let pixels = block_pixels(center);
    let spectra: Vec<&[f64]> = pixels
        .iter()
        .map(|p| cube.spectrum(p.sample, p.line))
        .collect();

    let mut log_rel_std = [0.0; NUM_CHANNELS];
    let mut mean_if = [0.0; NUM_CHANNELS];
    let mut channel_if = [0.0; 9];
    for chan in 0..NUM_CHANNELS {
        for (k, spectrum) in spectra.iter().enumerate() {
            channel_if[k] = spectrum[chan];
        }
        log_rel_std[chan] = clamp_relative_std(relative_std(&channel_if)).log10();
        mean_if[chan] = mean(&channel_if);
    }

    let geometry: Vec<_> = pixels
        .iter()
        .map(|p| cube.geometry(p.sample, p.line))
        .collect();
    let center_geom = cube.geometry(center.sample, center.line);

    BlockStats {
        center,
        lat: center_geom.lat,
        lon: center_geom.lon,
        res: center_geom.res,
        log_rel_std,
        mean_if,
        inc: angle_stats(geometry.iter().map(|g| g.inc)),
        eme: angle_stats(geometry.iter().map(|g| g.eme)),
        phase: angle_stats(geometry.iter().map(|g| g.phase)),
    }
}

fn angle_stats(values: impl Iterator<Item = f64>) -> AngleStats {
    let v: Vec<f64> = values.collect();
    AngleStats {
        rel_std: relative_std(&v),
        mean: mean(&v),
    }
}
