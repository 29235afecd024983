//! Random selection of 3x3 block centers inside a cube.
//!
//! Every statistic downstream is computed over a 3x3 pixel neighborhood,
//! so block centers must keep one pixel of margin to the cube edge. The
//! draw is uniform over that interior, *with replacement*: for the small
//! fractions used in practice collisions are rare, and independent draws
//! keep the sampler trivially O(n).

use rand::Rng;

use crate::error::Error;

/// A 1-based `(sample, line)` pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCoord {
    pub sample: u32,
    pub line: u32,
}

/// Number of pixels that can serve as a block center.
///
/// Removes the one-pixel border (the two full sample rows plus the two
/// line columns between them) from the total. Cubes too small to hold any
/// 3x3 neighborhood have no useful pixels at all.
pub fn useful_pixel_count(n_sample: u32, n_line: u32) -> u32 {
    if n_sample < 3 || n_line < 3 {
        return 0;
    }
    n_sample * n_line - (2 * n_sample + 2 * (n_line - 2))
}

/// Draw block centers uniformly at random from the cube interior.
///
/// `frac` is the fraction of useful pixels to draw; the number of draws is
/// `floor(frac * useful_pixel_count)`. Draws are independent, so the same
/// center can appear more than once. Fails with
/// [`Error::InvalidFraction`] when `frac` is outside (0, 1].
pub fn draw_block_centers<R: Rng + ?Sized>(
    n_sample: u32,
    n_line: u32,
    frac: f64,
    rng: &mut R,
) -> Result<Vec<PixelCoord>, Error> {
    if !(frac > 0.0 && frac <= 1.0) {
        return Err(Error::InvalidFraction(frac));
    }

    let n_util = useful_pixel_count(n_sample, n_line);
    let n_pix = (frac * n_util as f64).floor() as usize;

    let mut centers = Vec::with_capacity(n_pix);
    for _ in 0..n_pix {
        centers.push(PixelCoord {
            sample: rng.random_range(2..n_sample),
            line: rng.random_range(2..n_line),
        });
    }
    Ok(centers)
}
