//! # vimsu
//!
//! Photometric-uncertainty extraction from **Cassini/VIMS hyperspectral
//! cubes** of Titan.
//!
//! Given a list of infrared cubes, this crate samples random 3x3 pixel
//! blocks in each cube, measures how much the 9 member spectra disagree at
//! every one of the 256 VIMS channels, and reduces those measurements to
//! an uncertainty-vs-channel law per cube: the noise model a downstream
//! radiative-transfer code needs to weigh its residuals.
//!
//! ## Pipeline
//!
//! 1. **Sampling** — draw `floor(frac · n_util)` block centers uniformly
//!    (with replacement) from the cube interior, where `n_util` excludes
//!    the one-pixel border that cannot host a full 3x3 neighborhood.
//! 2. **Estimation** — per block and channel, compute the mean I/F and the
//!    relative standard deviation (population std / mean) of the 9
//!    intensities. Aberrant ratios (outside (0, 1), including the
//!    zero-mean division) are clamped to 0.5; the log10 of the clamped
//!    ratio is kept.
//! 3. **Angular spread** — per block, mean and relative standard deviation
//!    of the incidence, emission and phase angles over the 9 pixels
//!    (unclamped; used downstream to filter limb/edge blocks).
//! 4. **Smoothing** — fit a degree-5 least-squares B-spline per block
//!    across the 256 channels, then average all block fits channel by
//!    channel into the cube's consensus curve.
//! 5. **Aggregation** — one row per cube (dimensions, exposure, solar
//!    longitude, instrument temperatures) and one row per block (center
//!    geometry, both length-256 laws, angular statistics), accumulated
//!    across the whole batch and written as CSV.
//!
//! Cube storage is abstracted behind the [`CubeAccess`] / [`CubeSource`]
//! traits: the pipeline never parses cube files itself and synthetic
//! in-memory cubes drive the test suite.
//!
//! ## Example
//!
//! ```no_run
//! use vimsu::{process_batch, read_cube_list, BatchConfig, CubeSource, SolarLongitude};
//!
//! fn run(source: &dyn CubeSource, ephemeris: &dyn SolarLongitude) -> anyhow::Result<()> {
//!     let ids = read_cube_list("cube_list.csv")?;
//!     let config = BatchConfig { frac: 0.05, seed: Some(42) };
//!
//!     let result = process_batch(source, ephemeris, &ids, &config);
//!     for failure in &result.failures {
//!         eprintln!("skipped {}: {}", failure.cube_id, failure.error);
//!     }
//!
//!     result.cubes.write_csv("cubes.csv")?;
//!     result.blocks.write_csv("blocks.csv")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Credits
//!
//! The method is a Rust implementation of the VIMS photometric-uncertainty
//! analysis developed by D. Cordier (CNRS) for Titan surface photometry.

pub mod analysis;
pub mod batch;
pub mod block;
pub mod cube;
pub mod error;
pub mod sampler;
pub mod spline;
pub mod stats;

pub use analysis::{channel_grid, CubeAnalyzer};
pub use batch::export::{
    parse_cube_list, read_cube_list, smoothed_fit_filename, write_smoothed_fit,
    write_smoothed_fit_file,
};
pub use batch::table::{
    band_column_keys, clean_finite_pairs, BlockRow, BlockTable, CubeRow, CubeTable,
};
pub use batch::{process_batch, process_cube, BatchConfig, BatchResult, CubeFailure, CubeReport};
pub use block::{analyze_block, block_pixels, AngleStats, BlockStats};
pub use cube::{
    cube_filename, cube_id_from_filename, CubeAccess, CubeSource, PixelGeometry, SolarLongitude,
    Temperatures,
};
pub use error::Error;
pub use sampler::{draw_block_centers, useful_pixel_count, PixelCoord};
pub use spline::{average_fits, SmoothingSpline, SPLINE_DEGREE};

/// Number of VIMS infrared spectral channels.
pub const NUM_CHANNELS: usize = 256;
