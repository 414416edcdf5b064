use std::{error::Error, path::Path};

use pcd_core::pointcloud::point::{Label, PointCloud};
use serde::Serialize;

#[derive(Serialize)]
struct CsvRow {
    x: f64,
    y: f64,
    z: f64,
    intensity: f64,
    label: Label,
}

/// Writes `x,y,z,intensity,label` rows with a header line.
pub fn write_csv(path: &Path, point_cloud: &PointCloud) -> Result<(), Box<dyn Error>> {
    let mut writer = ::csv::Writer::from_path(path)?;
    for (point, label) in point_cloud.iter() {
        writer.serialize(CsvRow {
            x: point.x(),
            y: point.y(),
            z: point.z(),
            intensity: point.intensity(),
            label,
        })?;
    }
    writer.flush()?;

    log::info!("wrote {} points to {}", point_cloud.len(), path.display());
    Ok(())
}
