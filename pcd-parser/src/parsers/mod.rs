use std::error::Error;

use pcd_core::pointcloud::point::{Point, PointCloud};

pub mod csv;
pub mod las;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, Box<dyn Error>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
    Csv,
    Txt,
}

pub fn get_extension(extension: &str) -> Option<Extension> {
    match extension.to_lowercase().as_str() {
        "las" => Some(Extension::Las),
        "laz" => Some(Extension::Laz),
        "csv" => Some(Extension::Csv),
        "txt" => Some(Extension::Txt),
        _ => None,
    }
}

pub(crate) type FileResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// How LAS coordinates are handed to the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateMode {
    /// Real-world coordinates (`record * scale + offset`).
    #[default]
    Scaled,
    /// Integer record units, the scale the default detector thresholds are calibrated in.
    Raw,
}

/// A point as read from a file, before intensity normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RawPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: f64,
}

/// Concatenates per-file results in input order and divides intensity by the maximum.
///
/// A zero maximum leaves every intensity at 0.
pub(crate) fn build_point_cloud(files: Vec<Vec<RawPoint>>) -> Result<PointCloud, Box<dyn Error>> {
    let raw: Vec<RawPoint> = files.into_iter().flatten().collect();

    let max_intensity = raw.iter().map(|p| p.intensity).fold(0.0_f64, f64::max);
    let points = raw
        .iter()
        .map(|p| {
            let intensity = if max_intensity > 0.0 {
                p.intensity / max_intensity
            } else {
                0.0
            };
            Point::new(p.x, p.y, p.z, intensity)
        })
        .collect::<Result<Vec<Point>, _>>()?;

    log::info!(
        "read {} points, intensity normalized by {}",
        points.len(),
        max_intensity
    );
    Ok(PointCloud::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(x: f64, intensity: f64) -> RawPoint {
        RawPoint {
            x,
            y: 0.0,
            z: 0.0,
            intensity,
        }
    }

    #[test]
    fn normalizes_by_maximum_across_files() {
        let cloud = build_point_cloud(vec![
            vec![raw(0.0, 100.0), raw(1.0, 50.0)],
            vec![raw(2.0, 200.0)],
        ])
        .unwrap();
        let intensities: Vec<f64> = cloud.points().iter().map(|p| p.intensity()).collect();
        assert_eq!(intensities, vec![0.5, 0.25, 1.0]);
        let xs: Vec<f64> = cloud.points().iter().map(|p| p.x()).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn zero_maximum_keeps_zero_intensity() {
        let cloud = build_point_cloud(vec![vec![raw(0.0, 0.0), raw(1.0, 0.0)]]).unwrap();
        assert!(cloud.points().iter().all(|p| p.intensity() == 0.0));
    }

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(get_extension("LAZ"), Some(Extension::Laz));
        assert_eq!(get_extension("txt"), Some(Extension::Txt));
        assert_eq!(get_extension("ply"), None);
    }

    #[test]
    fn non_finite_coordinates_fail() {
        assert!(build_point_cloud(vec![vec![raw(f64::NAN, 1.0)]]).is_err());
    }
}
