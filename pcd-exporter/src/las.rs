use std::{error::Error, path::Path};

use las::point::{Classification, Format};
use las::{Builder, Color, Transform, Vector, Writer};
use pcd_core::pointcloud::point::{Label, PointCloud};

/// LAS class written for points inside a flagged segment (first user-definable class).
pub const SPEED_BUMP_CLASS: u8 = 64;

/// Quantization of the written file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LasExportOptions {
    pub scale: [f64; 3],
    /// `None` uses the minimum corner of the cloud.
    pub offset: Option<[f64; 3]>,
}

impl Default for LasExportOptions {
    fn default() -> Self {
        Self {
            scale: [0.001; 3],
            offset: None,
        }
    }
}

impl LasExportOptions {
    /// Identity quantization for clouds already in LAS record units.
    pub fn record_units() -> Self {
        Self {
            scale: [1.0; 3],
            offset: Some([0.0; 3]),
        }
    }
}

/// Writes `point_cloud` as LAS 1.2, point format 2.
///
/// Intensity goes to both the intensity channel and a gray RGB color, so flagged
/// points (intensity 0) show up black in viewers that color by RGB.
pub fn write_las(
    path: &Path,
    point_cloud: &PointCloud,
    options: &LasExportOptions,
) -> Result<(), Box<dyn Error>> {
    let offset = options
        .offset
        .unwrap_or(point_cloud.metadata().bounding_volume.min);

    let mut builder = Builder::default();
    builder.point_format = Format::new(2)?;
    builder.transforms = Vector {
        x: Transform {
            scale: options.scale[0],
            offset: offset[0],
        },
        y: Transform {
            scale: options.scale[1],
            offset: offset[1],
        },
        z: Transform {
            scale: options.scale[2],
            offset: offset[2],
        },
    };
    let header = builder.into_header()?;

    let speed_bump = Classification::new(SPEED_BUMP_CLASS)?;
    let mut writer = Writer::from_path(path, header)?;
    for (point, label) in point_cloud.iter() {
        let gray = point.to_gray16();
        writer.write_point(las::Point {
            x: point.x(),
            y: point.y(),
            z: point.z(),
            intensity: gray,
            classification: match label {
                Label::SpeedBump => speed_bump,
                Label::Unclassified => Classification::Unclassified,
            },
            color: Some(Color::new(gray, gray, gray)),
            ..Default::default()
        })?;
    }
    writer.close()?;

    log::info!("wrote {} points to {}", point_cloud.len(), path.display());
    Ok(())
}
