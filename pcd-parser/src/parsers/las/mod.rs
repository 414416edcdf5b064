use std::{
    error::Error,
    path::{Path, PathBuf},
};

use las::Reader;
use pcd_core::pointcloud::point::PointCloud;
use rayon::prelude::*;

use super::{build_point_cloud, CoordinateMode, FileResult, Parser, ParserProvider, RawPoint};

pub struct LasParserProvider {
    pub filenames: Vec<PathBuf>,
    pub coordinates: CoordinateMode,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filenames: self.filenames.clone(),
            coordinates: self.coordinates,
        })
    }
}

/// Reads LAS and LAZ files, one rayon task per file.
pub struct LasParser {
    pub filenames: Vec<PathBuf>,
    pub coordinates: CoordinateMode,
}

impl Parser for LasParser {
    fn parse(&self) -> Result<PointCloud, Box<dyn Error>> {
        let start = std::time::Instant::now();
        let files = self
            .filenames
            .par_iter()
            .map(|path| read_las_file(path, self.coordinates))
            .collect::<FileResult<Vec<_>>>()
            .map_err(|e| -> Box<dyn Error> { e })?;
        log::info!("Read LAS time: {:?}", start.elapsed());

        build_point_cloud(files)
    }
}

fn read_las_file(path: &Path, coordinates: CoordinateMode) -> FileResult<Vec<RawPoint>> {
    let mut reader = Reader::from_path(path)
        .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    let transforms = reader.header().transforms().clone();
    log::debug!(
        "{}: {} points",
        path.display(),
        reader.header().number_of_points()
    );

    let mut points = Vec::new();
    for las_point in reader.points() {
        let las_point = las_point?;
        let (x, y, z) = match coordinates {
            CoordinateMode::Scaled => (las_point.x, las_point.y, las_point.z),
            CoordinateMode::Raw => (
                to_record_units(las_point.x, &transforms.x),
                to_record_units(las_point.y, &transforms.y),
                to_record_units(las_point.z, &transforms.z),
            ),
        };
        points.push(RawPoint {
            x,
            y,
            z,
            intensity: f64::from(las_point.intensity),
        });
    }

    Ok(points)
}

fn to_record_units(value: f64, transform: &las::Transform) -> f64 {
    ((value - transform.offset) / transform.scale).round()
}
