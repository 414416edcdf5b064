use std::ops::Range;

use serde::Serialize;

use crate::error::GeometryError;
use crate::geometry::Vector3;

/// Intensity written to every point of a segment flagged as a speed bump.
pub const MARKER_INTENSITY: f64 = 0.0;

/// A single LiDAR return: coordinates plus intensity normalized to `[0, 1]`.
///
/// Two points are equal when their coordinates are exactly equal; intensity is not
/// part of the identity.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    x: f64,
    y: f64,
    z: f64,
    intensity: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64, intensity: f64) -> Result<Self, GeometryError> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(GeometryError::InvalidPoint(format!(
                "non-finite coordinates ({}, {}, {})",
                x, y, z
            )));
        }
        if !(0.0..=1.0).contains(&intensity) {
            return Err(GeometryError::InvalidPoint(format!(
                "intensity {} outside [0, 1]",
                intensity
            )));
        }
        Ok(Point { x, y, z, intensity })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn coords(&self) -> Vector3 {
        [self.x, self.y, self.z]
    }

    /// Copy of this point carrying the marker intensity.
    pub fn marked(&self) -> Self {
        Point {
            intensity: MARKER_INTENSITY,
            ..*self
        }
    }

    pub fn squared_distance(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)
    }

    // Gray 16-bit color used by LAS writers, intensity 0 is black.
    pub fn to_gray16(&self) -> u16 {
        (self.intensity * 65535.0).round().clamp(0.0, 65535.0) as u16
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Label {
    #[default]
    Unclassified,
    SpeedBump,
}

/// Ordered point set with one label per point.
///
/// Order matters for windowing only; everything else treats the cloud as a set.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Vec<Point>,
    labels: Vec<Label>,
    metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        let labels = vec![Label::Unclassified; points.len()];
        Self::build(points, labels)
    }

    pub fn from_parts(points: Vec<Point>, labels: Vec<Label>) -> Result<Self, GeometryError> {
        if points.len() != labels.len() {
            return Err(GeometryError::InvalidPoint(format!(
                "{} points but {} labels",
                points.len(),
                labels.len()
            )));
        }
        Ok(Self::build(points, labels))
    }

    pub fn from_labelled(labelled: Vec<(Point, Label)>) -> Self {
        let (points, labels) = labelled.into_iter().unzip();
        Self::build(points, labels)
    }

    fn build(points: Vec<Point>, labels: Vec<Label>) -> Self {
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };

        for point in &points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);
        }

        if points.is_empty() {
            log::warn!("point cloud is empty");
            bounding_volume = BoundingVolume::default();
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
        };

        PointCloud {
            points,
            labels,
            metadata,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Point, Label)> {
        self.points.iter().zip(self.labels.iter().copied())
    }

    pub fn into_parts(self) -> (Vec<Point>, Vec<Label>) {
        (self.points, self.labels)
    }

    /// Contiguous sub-cloud `range` of this cloud.
    pub fn slice(&self, range: Range<usize>) -> PointCloud {
        Self::build(
            self.points[range.clone()].to_vec(),
            self.labels[range].to_vec(),
        )
    }

    /// Sub-cloud made of `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> PointCloud {
        let points = indices.iter().map(|&i| self.points[i]).collect();
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        Self::build(points, labels)
    }

    /// Sets every point to the marker intensity and labels it as a speed bump.
    pub fn mark_all(self) -> PointCloud {
        let points = self.points.iter().map(Point::marked).collect();
        let labels = vec![Label::SpeedBump; self.points.len()];
        Self::build(points, labels)
    }

    pub fn flagged_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|label| **label == Label::SpeedBump)
            .count()
    }
}

// This represents the maximum and minimum coordinates of the cloud.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
}
