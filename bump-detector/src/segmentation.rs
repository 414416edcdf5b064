//! Splitting an ordered point sequence into overlapping windows.
//!
//! A bump straddling the border of two windows is still seen whole by one of
//! them as long as the overlap is at least as long as the bump.

use std::ops::Range;

use serde::Serialize;

use crate::error::DetectorError;

/// Inclusive index range `[start, end]` of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end + 1
    }

    pub fn point_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Plans the windows for `point_count` points.
///
/// `segment_size = floor(N / S)`, `overlap_size = floor(segment_size * p)`. Each window
/// spans `segment_size + 1` indices and the next one starts `overlap_size` indices
/// before the current end, for `ceil((N - segment_size) / (segment_size * (1 - p)) + 1)`
/// iterations. Ends are clamped to `N - 1`, so once the tail is reached the remaining
/// iterations all yield the tail window `[N - 1 - overlap_size, N - 1]`. It is
/// evaluated once; the repeats are counted and logged.
pub fn plan_windows(
    point_count: usize,
    segment_count: usize,
    overlap_fraction: f64,
) -> Result<Vec<Window>, DetectorError> {
    if point_count == 0 {
        return Err(DetectorError::InvalidInput(
            "cannot segment an empty point cloud".to_string(),
        ));
    }
    if segment_count == 0 {
        return Err(DetectorError::Configuration(
            "segment count must be positive".to_string(),
        ));
    }
    if !(overlap_fraction.is_finite() && (0.0..1.0).contains(&overlap_fraction)) {
        return Err(DetectorError::Configuration(format!(
            "overlap fraction must be in [0, 1), got {}",
            overlap_fraction
        )));
    }

    let segment_size = point_count / segment_count;
    if segment_size == 0 {
        return Err(DetectorError::Configuration(format!(
            "segment count {} exceeds point count {}",
            segment_count, point_count
        )));
    }
    let overlap_size = (segment_size as f64 * overlap_fraction).floor() as usize;
    let planned = window_count(point_count, segment_size, overlap_fraction);
    let last_index = point_count - 1;

    log::debug!(
        "segment size {}, overlap {}, {} windows planned",
        segment_size,
        overlap_size,
        planned
    );

    let mut windows: Vec<Window> = Vec::with_capacity(planned);
    let mut repeats = 0;
    let mut start = 0;
    for _ in 0..planned {
        if start > last_index {
            log::warn!(
                "window start {} exceeds last point index {}, skipping",
                start,
                last_index
            );
            continue;
        }

        let end = (start + segment_size).min(last_index);
        let repeated = windows
            .last()
            .map_or(false, |w| w.start == start && w.end == end);
        if repeated {
            repeats += 1;
        } else {
            windows.push(Window {
                index: windows.len(),
                start,
                end,
            });
        }
        start = end - overlap_size;
    }

    if repeats > 0 {
        log::debug!(
            "{} of {} planned windows repeat the tail window, evaluating it once",
            repeats,
            planned
        );
    }
    debug_assert!(windows.last().map_or(false, |w| w.end == last_index));
    Ok(windows)
}

/// `ceil((N - segment_size) / (segment_size * (1 - p)) + 1)`
pub fn window_count(point_count: usize, segment_size: usize, overlap_fraction: f64) -> usize {
    ((point_count - segment_size) as f64 / (segment_size as f64 * (1.0 - overlap_fraction))
        + 1.0)
        .ceil() as usize
}
