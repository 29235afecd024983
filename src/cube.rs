//! Cube access traits and per-cube metadata.
//!
//! The statistical pipeline never reads cube files itself: everything it
//! needs from a cube goes through [`CubeAccess`], so ISIS-file-backed
//! cubes, cached archive downloads and in-memory synthetic cubes are
//! interchangeable. Loading (and fetch-on-demand of missing cubes) lives
//! behind [`CubeSource`], and the seasonal solar-longitude computation
//! behind [`SolarLongitude`].

use crate::error::Error;

/// Viewing and illumination geometry of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGeometry {
    /// Planetocentric North latitude (degrees).
    pub lat: f64,
    /// Planetocentric West longitude (degrees).
    pub lon: f64,
    /// Ground resolution of the pixel (km/px).
    pub res: f64,
    /// Incidence angle (degrees).
    pub inc: f64,
    /// Emission angle (degrees).
    pub eme: f64,
    /// Phase angle (degrees).
    pub phase: f64,
}

/// Instrument temperature readings attached to a cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    /// Detector temperatures (K).
    pub detector: [f64; 3],
    /// Instrument housing temperatures (K).
    pub instrument: [f64; 2],
    /// Optics temperatures (K).
    pub optics: [f64; 3],
}

/// Read access to one loaded hyperspectral cube.
///
/// Pixel coordinates are 1-based `(sample, line)` pairs, following the ISIS
/// cube convention: valid samples are `1..=n_sample`, lines `1..=n_line`.
pub trait CubeAccess {
    /// Cube identifier, e.g. `1732876622_1`.
    fn id(&self) -> &str;

    /// Number of pixels along the sample axis.
    fn n_sample(&self) -> u32;

    /// Number of pixels along the line axis.
    fn n_line(&self) -> u32;

    /// Exposure time (s).
    fn exposure(&self) -> f64;

    /// Instrument temperatures.
    fn temperatures(&self) -> Temperatures;

    /// The 256-channel I/F spectrum of one pixel.
    fn spectrum(&self, sample: u32, line: u32) -> &[f64];

    /// Viewing geometry of one pixel.
    fn geometry(&self, sample: u32, line: u32) -> PixelGeometry;

    /// Total number of pixels in the cube.
    fn n_pix(&self) -> u32 {
        self.n_sample() * self.n_line()
    }
}

/// Cube loading service.
///
/// `load` may fetch the cube from a remote archive as a side effect when it
/// is absent locally; a cube that cannot be produced at all fails with
/// [`Error::CubeNotFound`].
pub trait CubeSource {
    fn load(&self, cube_id: &str) -> Result<Box<dyn CubeAccess>, Error>;
}

/// Solar-longitude ephemeris service.
pub trait SolarLongitude {
    /// Seasonal solar longitude Ls (degrees) at the cube acquisition epoch.
    fn ls(&self, cube: &dyn CubeAccess) -> f64;
}

/// Stored filename of an infrared cube, e.g. `C1732876622_1_ir.cub`.
pub fn cube_filename(cube_id: &str) -> String {
    format!("C{cube_id}_ir.cub")
}

/// The cube identifier back out of an `_ir.cub` filename, if it is one.
pub fn cube_id_from_filename(name: &str) -> Option<&str> {
    name.strip_prefix('C')?.strip_suffix("_ir.cub")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_round_trip() {
        let name = cube_filename("1732876622_1");
        assert_eq!(name, "C1732876622_1_ir.cub");
        assert_eq!(cube_id_from_filename(&name), Some("1732876622_1"));
    }

    #[test]
    fn filename_rejects_foreign_names() {
        assert_eq!(cube_id_from_filename("1732876622_1_ir.cub"), None);
        assert_eq!(cube_id_from_filename("C1732876622_1_vis.cub"), None);
        assert_eq!(cube_id_from_filename("readme.txt"), None);
    }
}
