use std::cmp::Ordering;

use pcd_core::pointcloud::point::{Label, Point, PointCloud};

/// Merges processed segments into one cloud without duplicate coordinates.
///
/// Points are sorted by `x`, `y`, `z` descending, then intensity ascending, and the
/// first point per coordinate is kept. A point flagged in one window therefore
/// always wins over an unflagged copy of itself from an overlapping window.
pub fn merge_segments(segments: Vec<PointCloud>) -> PointCloud {
    let mut merged: Vec<(Point, Label)> = Vec::with_capacity(segments.iter().map(PointCloud::len).sum());
    for segment in segments {
        let (points, labels) = segment.into_parts();
        merged.extend(points.into_iter().zip(labels));
    }
    let total = merged.len();

    // stable: equal keys keep window order
    merged.sort_by(|(a, a_label), (b, b_label)| {
        descending(a.x(), b.x())
            .then_with(|| descending(a.y(), b.y()))
            .then_with(|| descending(a.z(), b.z()))
            .then_with(|| ascending(a.intensity(), b.intensity()))
            .then_with(|| flagged_first(*a_label, *b_label))
    });
    merged.dedup_by(|current, kept| current.0 == kept.0);

    log::debug!(
        "merged {} points into {} unique coordinates",
        total,
        merged.len()
    );

    PointCloud::from_labelled(merged)
}

fn ascending(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn descending(a: f64, b: f64) -> Ordering {
    ascending(b, a)
}

fn flagged_first(a: Label, b: Label) -> Ordering {
    match (a, b) {
        (Label::SpeedBump, Label::Unclassified) => Ordering::Less,
        (Label::Unclassified, Label::SpeedBump) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::MARKER_INTENSITY;

    use super::*;

    fn make_point(x: f64, y: f64, z: f64, intensity: f64) -> Point {
        Point::new(x, y, z, intensity).unwrap()
    }

    #[test]
    fn flagged_duplicate_survives() {
        let flagged = PointCloud::new(vec![
            make_point(1.0, 1.0, 1.0, 0.3),
            make_point(2.0, 2.0, 2.0, 0.8),
        ])
        .mark_all();
        let unflagged = PointCloud::new(vec![
            make_point(2.0, 2.0, 2.0, 0.8),
            make_point(3.0, 3.0, 3.0, 0.5),
        ]);

        for segments in [
            vec![flagged.clone(), unflagged.clone()],
            vec![unflagged, flagged],
        ] {
            let merged = merge_segments(segments);
            assert_eq!(merged.len(), 3);
            let shared: Vec<(&Point, Label)> = merged
                .iter()
                .filter(|(p, _)| **p == make_point(2.0, 2.0, 2.0, 0.0))
                .collect();
            assert_eq!(shared.len(), 1);
            assert_eq!(shared[0].0.intensity(), MARKER_INTENSITY);
            assert_eq!(shared[0].1, Label::SpeedBump);
        }
    }

    #[test]
    fn output_is_sorted_descending() {
        let merged = merge_segments(vec![PointCloud::new(vec![
            make_point(1.0, 5.0, 0.0, 0.5),
            make_point(3.0, 0.0, 0.0, 0.5),
            make_point(1.0, 7.0, 0.0, 0.5),
        ])]);
        let coords: Vec<[f64; 3]> = merged.points().iter().map(Point::coords).collect();
        assert_eq!(
            coords,
            vec![[3.0, 0.0, 0.0], [1.0, 7.0, 0.0], [1.0, 5.0, 0.0]]
        );
    }

    #[test]
    fn lowest_intensity_wins_between_unflagged_duplicates() {
        let merged = merge_segments(vec![
            PointCloud::new(vec![make_point(0.0, 0.0, 0.0, 0.9)]),
            PointCloud::new(vec![make_point(0.0, 0.0, 0.0, 0.2)]),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.points()[0].intensity(), 0.2);
    }

    #[test]
    fn flag_wins_over_natural_zero_intensity() {
        let natural_zero = PointCloud::new(vec![make_point(0.0, 0.0, 0.0, 0.0)]);
        let flagged = PointCloud::new(vec![make_point(0.0, 0.0, 0.0, 0.6)]).mark_all();
        let merged = merge_segments(vec![natural_zero, flagged]);
        assert_eq!(merged.labels(), &[Label::SpeedBump]);
    }

    #[test]
    fn labels_stay_with_their_points() {
        let merged = merge_segments(vec![
            PointCloud::new(vec![make_point(5.0, 0.0, 0.0, 0.4)]).mark_all(),
            PointCloud::new(vec![make_point(1.0, 0.0, 0.0, 0.4), make_point(9.0, 0.0, 0.0, 0.4)]),
        ]);
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged.labels(),
            &[Label::Unclassified, Label::SpeedBump, Label::Unclassified]
        );
        assert_eq!(merged.metadata().point_count, 3);
    }

    #[test]
    fn empty_input_gives_empty_cloud() {
        assert!(merge_segments(vec![]).is_empty());
    }
}
