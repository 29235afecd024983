//! Text inputs and outputs exchanged with external tools.
//!
//! The cube list comes in as a small delimited text file whose first entry
//! is a header. The smoothed uncertainty law goes out in a fixed-width
//! format read by a radiative-transfer code, so the field layout below is
//! byte-exact: `%4d %16.8E ` per line, after a timestamp comment.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;

/// Read a cube-identifier list file. Entries are separated by commas
/// and/or line breaks; the first entry is a header and is dropped.
pub fn read_cube_list<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("reading cube list {}", path.as_ref().display()))?;
    Ok(parse_cube_list(&data))
}

/// Split a cube-list document into identifiers, dropping the header entry.
pub fn parse_cube_list(data: &str) -> Vec<String> {
    data.split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .skip(1)
        .map(str::to_string)
        .collect()
}

/// Output filename for a cube's smoothed uncertainty law.
pub fn smoothed_fit_filename(cube_id: &str) -> String {
    format!("VIMScubeUncert_{cube_id}.out")
}

/// Write the smoothed law: a `# timestamp` comment, then one line per
/// channel with the 1-based channel number and the consensus log10
/// relative uncertainty.
pub fn write_smoothed_fit<W: Write>(
    mut w: W,
    curve: &[f64],
    timestamp: &str,
) -> std::io::Result<()> {
    writeln!(w, "# {timestamp}")?;
    for (i, value) in curve.iter().enumerate() {
        writeln!(w, "{:4} {:>16} ", i + 1, scientific(*value))?;
    }
    Ok(())
}

/// Write `VIMScubeUncert_<id>.out` into `dir`, stamped with the current
/// local time. Returns the path of the written file.
pub fn write_smoothed_fit_file<P: AsRef<Path>>(
    dir: P,
    cube_id: &str,
    curve: &[f64],
) -> anyhow::Result<PathBuf> {
    let path = dir.as_ref().join(smoothed_fit_filename(cube_id));
    let file =
        File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
    write_smoothed_fit(BufWriter::new(file), curve, &timestamp)?;
    Ok(path)
}

/// C-style `%.8E` rendering: 8 fractional digits and a sign-carrying,
/// zero-padded two-digit exponent (`-3.01030000E-01`). Rust's own `{:E}`
/// leaves the exponent unpadded and unsigned.
fn scientific(v: f64) -> String {
    let s = format!("{v:.8E}");
    match s.split_once('E') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        // NaN / inf carry no exponent field.
        None => s,
    }
}
