//! The two output tables and their CSV schemas.
//!
//! Column names and ordering are fixed: the files are read back by
//! downstream analysis notebooks that select columns by name (`DIsF_42`,
//! `Dphase`, ...). Channel numbers in column names are 1-based.

use std::path::Path;

use anyhow::Context;

use crate::block::BlockStats;
use crate::NUM_CHANNELS;

/// One row of the cube-level table.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeRow {
    /// Cube identifier.
    pub name: String,
    pub n_sample: u32,
    pub n_line: u32,
    /// Total pixel count `n_sample * n_line`.
    pub n_pix: u32,
    /// Exposure time (s).
    pub expo_time: f64,
    /// Solar longitude (degrees).
    pub ls: f64,
    /// Detector temperatures dT1..dT3 (K).
    pub detector_temp: [f64; 3],
    /// Instrument temperatures iT1, iT2 (K).
    pub instrument_temp: [f64; 2],
    /// Optics temperatures oT1..oT3 (K).
    pub optics_temp: [f64; 3],
}

/// One row of the block-level table.
#[derive(Debug, Clone)]
pub struct BlockRow {
    /// Identifier of the cube the block was drawn from.
    pub name: String,
    /// Total number of blocks drawn from that cube (Npav).
    pub n_blocks: u32,
    /// Index of this block within the cube, in sampling order (iPav).
    pub index: u32,
    /// Center pixel sample coordinate (1-based).
    pub sample: u32,
    /// Center pixel line coordinate (1-based).
    pub line: u32,
    /// Latitude / longitude / resolution of the center pixel.
    pub lat: f64,
    pub lon: f64,
    pub res: f64,
    /// log10 relative std-dev of I/F per channel (DIsF_1..DIsF_256).
    pub log_rel_std: [f64; NUM_CHANNELS],
    /// Mean I/F per channel (IFav_1..IFav_256).
    pub mean_if: [f64; NUM_CHANNELS],
    /// Angular dispersions and means (Dinc, incAv, Deme, emeAv, Dphase, phaseAv).
    pub d_inc: f64,
    pub inc_mean: f64,
    pub d_eme: f64,
    pub eme_mean: f64,
    pub d_phase: f64,
    pub phase_mean: f64,
}

impl BlockRow {
    /// Build a row from one block's statistics.
    pub fn from_stats(cube_name: &str, n_blocks: u32, index: u32, stats: &BlockStats) -> Self {
        Self {
            name: cube_name.to_string(),
            n_blocks,
            index,
            sample: stats.center.sample,
            line: stats.center.line,
            lat: stats.lat,
            lon: stats.lon,
            res: stats.res,
            log_rel_std: stats.log_rel_std,
            mean_if: stats.mean_if,
            d_inc: stats.inc.rel_std,
            inc_mean: stats.inc.mean,
            d_eme: stats.eme.rel_std,
            eme_mean: stats.eme.mean,
            d_phase: stats.phase.rel_std,
            phase_mean: stats.phase.mean,
        }
    }
}

/// Cube-level table, one row per successfully processed cube.
#[derive(Debug, Default)]
pub struct CubeTable {
    rows: Vec<CubeRow>,
}

impl CubeTable {
    pub fn push(&mut self, row: CubeRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[CubeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, in file order.
    pub fn columns() -> Vec<String> {
        [
            "Cube name",
            "Nsample",
            "Nline",
            "Npix",
            "Expo Time",
            "Ls",
            "dT1",
            "dT2",
            "dT3",
            "iT1",
            "iT2",
            "oT1",
            "oT2",
            "oT3",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Write the table as CSV, header included even when empty.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let mut w = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.as_ref().display()))?;
        w.write_record(Self::columns())?;
        for row in &self.rows {
            w.write_record(row.record())?;
        }
        w.flush()?;
        Ok(())
    }
}

impl CubeRow {
    fn record(&self) -> Vec<String> {
        let mut rec = vec![
            self.name.clone(),
            self.n_sample.to_string(),
            self.n_line.to_string(),
            self.n_pix.to_string(),
            self.expo_time.to_string(),
            self.ls.to_string(),
        ];
        rec.extend(self.detector_temp.iter().map(|t| t.to_string()));
        rec.extend(self.instrument_temp.iter().map(|t| t.to_string()));
        rec.extend(self.optics_temp.iter().map(|t| t.to_string()));
        rec
    }
}

/// Block-level table, `n_blocks` rows per successfully processed cube.
#[derive(Debug, Default)]
pub struct BlockTable {
    rows: Vec<BlockRow>,
}

impl BlockTable {
    pub fn push(&mut self, row: BlockRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[BlockRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, in file order.
    pub fn columns() -> Vec<String> {
        let mut cols: Vec<String> = ["Cube name", "Npav", "iPav", "s", "l", "lat", "lon", "res"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (d_isf, if_av) = band_column_keys(1, NUM_CHANNELS);
        cols.extend(d_isf);
        cols.extend(if_av);
        cols.extend(
            ["Dinc", "incAv", "Deme", "emeAv", "Dphase", "phaseAv"]
                .iter()
                .map(|s| s.to_string()),
        );
        cols
    }

    /// Write the table as CSV, header included even when empty.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let mut w = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.as_ref().display()))?;
        w.write_record(Self::columns())?;
        for row in &self.rows {
            w.write_record(row.record())?;
        }
        w.flush()?;
        Ok(())
    }

    /// Rows whose three angular dispersions all stay below `max_rel_std`.
    ///
    /// Blocks straddling a limb or a sharp terrain edge show large angular
    /// spread; photometric work filters them out this way.
    pub fn filter_by_angular_dispersion(&self, max_rel_std: f64) -> Vec<&BlockRow> {
        self.rows
            .iter()
            .filter(|r| {
                r.d_inc < max_rel_std && r.d_eme < max_rel_std && r.d_phase < max_rel_std
            })
            .collect()
    }

    /// Concatenated `(mean I/F, log10 relative std-dev)` samples over the
    /// 1-based channel band `c0..=c1`, across the given rows.
    pub fn band_values(rows: &[&BlockRow], c0: usize, c1: usize) -> (Vec<f64>, Vec<f64>) {
        assert!(c0 >= 1 && c1 <= NUM_CHANNELS && c0 <= c1, "bad channel band");
        let mut mean_if = Vec::new();
        let mut rel_std = Vec::new();
        for chan in c0..=c1 {
            for row in rows {
                mean_if.push(row.mean_if[chan - 1]);
                rel_std.push(row.log_rel_std[chan - 1]);
            }
        }
        (mean_if, rel_std)
    }
}

impl BlockRow {
    fn record(&self) -> Vec<String> {
        let mut rec = vec![
            self.name.clone(),
            self.n_blocks.to_string(),
            self.index.to_string(),
            self.sample.to_string(),
            self.line.to_string(),
            self.lat.to_string(),
            self.lon.to_string(),
            self.res.to_string(),
        ];
        rec.extend(self.log_rel_std.iter().map(|v| v.to_string()));
        rec.extend(self.mean_if.iter().map(|v| v.to_string()));
        for v in [
            self.d_inc,
            self.inc_mean,
            self.d_eme,
            self.eme_mean,
            self.d_phase,
            self.phase_mean,
        ] {
            rec.push(v.to_string());
        }
        rec
    }
}

/// `DIsF_i` / `IFav_i` column keys for the 1-based channel band `c0..=c1`.
pub fn band_column_keys(c0: usize, c1: usize) -> (Vec<String>, Vec<String>) {
    let d_isf = (c0..=c1).map(|i| format!("DIsF_{i}")).collect();
    let if_av = (c0..=c1).map(|i| format!("IFav_{i}")).collect();
    (d_isf, if_av)
}

/// Drop `(mean I/F, uncertainty)` pairs where either member is non-finite
/// or the mean I/F is not positive. Both outputs keep the same length.
pub fn clean_finite_pairs(mean_if: &[f64], rel_std: &[f64]) -> (Vec<f64>, Vec<f64>) {
    assert_eq!(mean_if.len(), rel_std.len());
    mean_if
        .iter()
        .zip(rel_std)
        .filter(|(&m, &d)| m.is_finite() && d.is_finite() && m > 0.0)
        .map(|(&m, &d)| (m, d))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_row(name: &str, index: u32, d_inc: f64) -> BlockRow {
        BlockRow {
            name: name.to_string(),
            n_blocks: 4,
            index,
            sample: 3,
            line: 3,
            lat: 10.0,
            lon: 200.0,
            res: 15.0,
            log_rel_std: [-1.5; NUM_CHANNELS],
            mean_if: [0.08; NUM_CHANNELS],
            d_inc,
            inc_mean: 30.0,
            d_eme: 0.01,
            eme_mean: 20.0,
            d_phase: 0.02,
            phase_mean: 50.0,
        }
    }

    #[test]
    fn cube_schema_has_fourteen_columns() {
        let cols = CubeTable::columns();
        assert_eq!(cols.len(), 14);
        assert_eq!(cols[0], "Cube name");
        assert_eq!(cols[4], "Expo Time");
        assert_eq!(cols[13], "oT3");
    }

    #[test]
    fn block_schema_has_all_channel_columns() {
        let cols = BlockTable::columns();
        // 8 leading + 2*256 channels + 6 angular.
        assert_eq!(cols.len(), 8 + 2 * NUM_CHANNELS + 6);
        assert_eq!(cols[8], "DIsF_1");
        assert_eq!(cols[8 + NUM_CHANNELS - 1], "DIsF_256");
        assert_eq!(cols[8 + NUM_CHANNELS], "IFav_1");
        assert_eq!(cols[cols.len() - 6], "Dinc");
        assert_eq!(cols[cols.len() - 1], "phaseAv");
    }

    #[test]
    fn band_keys_are_one_based() {
        let (d, a) = band_column_keys(97, 99);
        assert_eq!(d, vec!["DIsF_97", "DIsF_98", "DIsF_99"]);
        assert_eq!(a, vec!["IFav_97", "IFav_98", "IFav_99"]);
    }

    #[test]
    fn angular_filter_keeps_quiet_blocks() {
        let mut table = BlockTable::default();
        table.push(block_row("a", 0, 0.005));
        table.push(block_row("a", 1, 0.5));
        table.push(block_row("a", 2, 0.04));

        let kept = table.filter_by_angular_dispersion(0.05);
        let indices: Vec<u32> = kept.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn band_values_concatenate_across_rows() {
        let r0 = block_row("a", 0, 0.0);
        let mut r1 = block_row("a", 1, 0.0);
        r1.mean_if = [0.16; NUM_CHANNELS];
        let rows = [&r0, &r1];

        let (mean_if, rel_std) = BlockTable::band_values(&rows, 10, 11);
        assert_eq!(mean_if, vec![0.08, 0.16, 0.08, 0.16]);
        assert_eq!(rel_std, vec![-1.5; 4]);
    }

    #[test]
    fn cleaning_drops_partner_values_too() {
        let mean_if = [0.1, f64::NAN, 0.2, -0.3, 0.4, 0.0];
        let rel_std = [-1.0, -1.1, f64::INFINITY, -1.3, -1.4, -1.5];
        let (m, d) = clean_finite_pairs(&mean_if, &rel_std);
        assert_eq!(m, vec![0.1, 0.4]);
        assert_eq!(d, vec![-1.0, -1.4]);
    }

    #[test]
    fn record_width_matches_schema() {
        let row = block_row("a", 0, 0.0);
        assert_eq!(row.record().len(), BlockTable::columns().len());

        let cube = CubeRow {
            name: "a".into(),
            n_sample: 10,
            n_line: 10,
            n_pix: 100,
            expo_time: 80.0,
            ls: 270.0,
            detector_temp: [60.0; 3],
            instrument_temp: [130.0; 2],
            optics_temp: [135.0; 3],
        };
        assert_eq!(cube.record().len(), CubeTable::columns().len());
    }
}
