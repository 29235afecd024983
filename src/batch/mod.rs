//! Batch orchestration: process a list of cubes into the two tables.
//!
//! Cubes are processed one at a time in input order. Each cube's rows are
//! assembled in a local [`CubeReport`] and merged into the shared tables
//! only after the whole cube succeeded, so a failing cube never leaves
//! partial rows behind: it is recorded in the failure list and the batch
//! moves on. Only file I/O errors (when the caller writes the tables out)
//! are fatal.

pub mod export;
pub mod table;

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::analysis::CubeAnalyzer;
use crate::cube::{CubeAccess, CubeSource, SolarLongitude};
use crate::error::Error;

use self::table::{BlockRow, BlockTable, CubeRow, CubeTable};

/// Parameters of a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Fraction of useful pixels drawn as block centers per cube.
    pub frac: f64,
    /// RNG seed for the pixel draws. `None` seeds from OS entropy; fix it
    /// for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            frac: 0.05,
            seed: None,
        }
    }
}

/// A cube that failed structurally, with the reason. The rest of the
/// batch is unaffected.
#[derive(Debug)]
pub struct CubeFailure {
    pub cube_id: String,
    pub error: Error,
}

/// The assembled tables plus the per-cube failures of one batch run.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub cubes: CubeTable,
    pub blocks: BlockTable,
    pub failures: Vec<CubeFailure>,
}

/// Rows produced by one successfully processed cube.
#[derive(Debug)]
pub struct CubeReport {
    pub cube: CubeRow,
    pub blocks: Vec<BlockRow>,
}

/// Process one loaded cube: draw blocks, compute their statistics and
/// build the cube's rows. Returns the complete row set or fails without
/// partial state.
pub fn process_cube(
    cube: &dyn CubeAccess,
    ls: f64,
    config: &BatchConfig,
    rng: &mut StdRng,
) -> Result<CubeReport, Error> {
    let analyzer = CubeAnalyzer::new(cube);
    let blocks = analyzer.sample_blocks(config.frac, rng)?;
    let n_blocks = blocks.len() as u32;
    debug!(
        "cube '{}': average I/F {:.6} over {} px",
        cube.id(),
        analyzer.average_if(),
        cube.n_pix()
    );

    let temps = cube.temperatures();
    let cube_row = CubeRow {
        name: cube.id().to_string(),
        n_sample: cube.n_sample(),
        n_line: cube.n_line(),
        n_pix: cube.n_pix(),
        expo_time: cube.exposure(),
        ls,
        detector_temp: temps.detector,
        instrument_temp: temps.instrument,
        optics_temp: temps.optics,
    };

    let block_rows = blocks
        .iter()
        .enumerate()
        .map(|(i, b)| BlockRow::from_stats(cube.id(), n_blocks, i as u32, b))
        .collect();

    Ok(CubeReport {
        cube: cube_row,
        blocks: block_rows,
    })
}

/// Process every cube in `ids`, in order, into one [`BatchResult`].
pub fn process_batch(
    source: &dyn CubeSource,
    ephemeris: &dyn SolarLongitude,
    ids: &[String],
    config: &BatchConfig,
) -> BatchResult {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut result = BatchResult::default();
    let mut total_px = 0u64;
    let batch_start = Instant::now();
    info!("processing {} cubes (frac = {})", ids.len(), config.frac);

    for (i, id) in ids.iter().enumerate() {
        let cube_start = Instant::now();
        let outcome = source.load(id).and_then(|cube| {
            let ls = ephemeris.ls(cube.as_ref());
            process_cube(cube.as_ref(), ls, config, &mut rng)
        });

        match outcome {
            Ok(report) => {
                total_px += u64::from(report.cube.n_pix);
                info!(
                    "cube {}/{} '{}': {} px, {} blocks, processed in {:.4} s",
                    i + 1,
                    ids.len(),
                    id,
                    report.cube.n_pix,
                    report.blocks.len(),
                    cube_start.elapsed().as_secs_f64()
                );
                result.cubes.push(report.cube);
                for row in report.blocks {
                    result.blocks.push(row);
                }
            }
            Err(error) => {
                warn!("cube {}/{} '{}' skipped: {}", i + 1, ids.len(), id, error);
                result.failures.push(CubeFailure {
                    cube_id: id.clone(),
                    error,
                });
            }
        }
    }

    info!(
        "batch done: {} cubes ok, {} failed, {} px total, {:.4} s",
        result.cubes.len(),
        result.failures.len(),
        total_px,
        batch_start.elapsed().as_secs_f64()
    );
    result
}
