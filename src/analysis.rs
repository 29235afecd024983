//! Per-cube analysis: sampling, block statistics, consensus law.
//!
//! `CubeAnalyzer` composes over [`CubeAccess`] instead of extending a cube
//! type, so the statistical logic stays independent of how cubes are
//! stored and loaded.

use rand::Rng;
use tracing::debug;

use crate::block::{analyze_block, BlockStats};
use crate::cube::CubeAccess;
use crate::error::Error;
use crate::sampler::{draw_block_centers, useful_pixel_count};
use crate::spline::{average_fits, SmoothingSpline};
use crate::NUM_CHANNELS;

/// Statistical analysis of one loaded cube.
pub struct CubeAnalyzer<'a> {
    cube: &'a dyn CubeAccess,
}

impl<'a> CubeAnalyzer<'a> {
    pub fn new(cube: &'a dyn CubeAccess) -> Self {
        Self { cube }
    }

    /// Number of pixels eligible as block centers (interior pixels).
    pub fn useful_pixels(&self) -> u32 {
        useful_pixel_count(self.cube.n_sample(), self.cube.n_line())
    }

    /// Draw block centers for the fraction `frac` and compute the full
    /// statistics of each block, in sampling order.
    pub fn sample_blocks<R: Rng + ?Sized>(
        &self,
        frac: f64,
        rng: &mut R,
    ) -> Result<Vec<BlockStats>, Error> {
        let centers =
            draw_block_centers(self.cube.n_sample(), self.cube.n_line(), frac, rng)?;
        debug!(
            "cube '{}': {} block centers drawn from {} useful pixels",
            self.cube.id(),
            centers.len(),
            self.useful_pixels()
        );
        Ok(centers
            .into_iter()
            .map(|c| analyze_block(self.cube, c))
            .collect())
    }

    /// Fit one smoothing spline per block and average them into the
    /// per-cube consensus uncertainty law, one value per channel.
    pub fn consensus_curve(&self, blocks: &[BlockStats]) -> Result<Vec<f64>, Error> {
        let grid = channel_grid();
        let fits = blocks
            .iter()
            .map(|b| SmoothingSpline::fit(&grid, &b.log_rel_std))
            .collect::<Result<Vec<_>, _>>()?;
        average_fits(&fits, &grid)
    }

    /// Mean I/F over every pixel of the cube.
    pub fn average_if(&self) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for line in 1..=self.cube.n_line() {
            for sample in 1..=self.cube.n_sample() {
                let spectrum = self.cube.spectrum(sample, line);
                total += spectrum.iter().sum::<f64>() / spectrum.len() as f64;
                count += 1;
            }
        }
        total / count as f64
    }
}

/// The channel-index grid the splines are fit on.
pub fn channel_grid() -> [f64; NUM_CHANNELS] {
    std::array::from_fn(|i| i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{PixelGeometry, Temperatures};
    use crate::stats::REL_STD_CLAMP;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct GradientCube;

    impl CubeAccess for GradientCube {
        fn id(&self) -> &str {
            "gradient"
        }
        fn n_sample(&self) -> u32 {
            10
        }
        fn n_line(&self) -> u32 {
            10
        }
        fn exposure(&self) -> f64 {
            80.0
        }
        fn temperatures(&self) -> Temperatures {
            Temperatures {
                detector: [60.0; 3],
                instrument: [130.0; 2],
                optics: [135.0; 3],
            }
        }
        fn spectrum(&self, _sample: u32, _line: u32) -> &[f64] {
            // Every pixel shares the same flat spectrum.
            static FLAT: [f64; NUM_CHANNELS] = [0.1; NUM_CHANNELS];
            &FLAT
        }
        fn geometry(&self, _sample: u32, _line: u32) -> PixelGeometry {
            PixelGeometry {
                lat: 0.0,
                lon: 0.0,
                res: 10.0,
                inc: 30.0,
                eme: 20.0,
                phase: 50.0,
            }
        }
    }

    #[test]
    fn full_fraction_samples_every_useful_pixel_count() {
        let cube = GradientCube;
        let analyzer = CubeAnalyzer::new(&cube);
        assert_eq!(analyzer.useful_pixels(), 64);

        let mut rng = StdRng::seed_from_u64(5);
        let blocks = analyzer.sample_blocks(1.0, &mut rng).unwrap();
        assert_eq!(blocks.len(), 64);
    }

    #[test]
    fn flat_cube_consensus_is_the_clamp_value() {
        // Zero spread everywhere → every channel clamps to 0.5, and the
        // consensus of constant laws is that constant.
        let cube = GradientCube;
        let analyzer = CubeAnalyzer::new(&cube);
        let mut rng = StdRng::seed_from_u64(11);
        let blocks = analyzer.sample_blocks(0.2, &mut rng).unwrap();
        let curve = analyzer.consensus_curve(&blocks).unwrap();
        assert_eq!(curve.len(), NUM_CHANNELS);
        for v in curve {
            assert!((v - REL_STD_CLAMP.log10()).abs() < 1e-9);
        }
    }

    #[test]
    fn no_blocks_means_no_consensus() {
        let cube = GradientCube;
        let analyzer = CubeAnalyzer::new(&cube);
        let err = analyzer.consensus_curve(&[]).unwrap_err();
        assert!(matches!(err, Error::InsufficientSamples { got: 0, .. }));
    }

    #[test]
    fn average_if_of_a_flat_cube() {
        let cube = GradientCube;
        let analyzer = CubeAnalyzer::new(&cube);
        assert!((analyzer.average_if() - 0.1).abs() < 1e-12);
    }
}
