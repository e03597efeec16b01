//! Interprets raw network output: SSD detection rows for the face detector
//! and argmax label selection for the classifiers.

use thiserror::Error;

use crate::detection::domain::detection_candidate::DetectionCandidate;
use crate::shared::bounding_box::BoundingBox;

/// Columns per detection row: `[image_id, label, confidence, x1, y1, x2, y2]`.
pub const DETECTION_COLUMNS: usize = 7;

const CONFIDENCE_COLUMN: usize = 2;
const BOX_COLUMN: usize = 3;

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("classifier output has {len} values but the label table has {labels}")]
    OutputTooShort { len: usize, labels: usize },
    #[error("classifier selected index {index} outside a {labels}-entry label table")]
    IndexOutOfRange { index: usize, labels: usize },
}

/// Row layout of a detection tensor as `(rows, columns)`.
///
/// Tensors of rank > 2 are flattened to the row count reported at axis 2
/// (`[1, 1, N, 7]` becomes `N x 7`). Returns `None` when the data cannot be
/// viewed as rows of at least [`DETECTION_COLUMNS`] values.
pub fn detection_rows(shape: &[usize], len: usize) -> Option<(usize, usize)> {
    let expected: usize = shape.iter().product();
    if expected != len {
        return None;
    }
    let (rows, cols) = match shape.len() {
        0 => return None,
        1 => (1, shape[0]),
        2 => (shape[0], shape[1]),
        _ => {
            let rows = shape[2];
            if rows == 0 || len % rows != 0 {
                return None;
            }
            (rows, len / rows)
        }
    };
    if rows == 0 || cols < DETECTION_COLUMNS {
        return None;
    }
    Some((rows, cols))
}

/// Decodes detector output into clipped candidates above `threshold`.
///
/// Keeps model row order. A row survives only when `confidence > threshold`
/// and its box, after clipping to the frame, is non-degenerate. An
/// unreadable layout yields no candidates rather than a partial read.
pub fn decode_detections(
    data: &[f32],
    shape: &[usize],
    frame_width: u32,
    frame_height: u32,
    threshold: f32,
) -> Vec<DetectionCandidate> {
    let Some((rows, cols)) = detection_rows(shape, data.len()) else {
        log::debug!("Unreadable detection tensor shape {shape:?} ({} values)", data.len());
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for row in data.chunks_exact(cols).take(rows) {
        let confidence = row[CONFIDENCE_COLUMN];
        if confidence.is_nan() || confidence <= threshold {
            continue;
        }
        let coords = [
            row[BOX_COLUMN],
            row[BOX_COLUMN + 1],
            row[BOX_COLUMN + 2],
            row[BOX_COLUMN + 3],
        ];
        let bbox = BoundingBox::from_normalized(coords, frame_width, frame_height)
            .clip(frame_width, frame_height);
        if bbox.is_degenerate() {
            log::trace!("Dropping degenerate box {bbox:?} (confidence {confidence:.3})");
            continue;
        }
        candidates.push(DetectionCandidate { confidence, bbox });
    }
    candidates
}

/// Index of the maximum value; the lowest index wins ties.
///
/// The output must cover every label, and the winner must address one.
pub fn select_label_index(output: &[f32], label_count: usize) -> Result<usize, DecodeError> {
    if output.is_empty() || output.len() < label_count {
        return Err(DecodeError::OutputTooShort {
            len: output.len(),
            labels: label_count,
        });
    }
    // NaN scores never win; an all-NaN output falls back to index 0.
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in output.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, max)| value > max) {
            best = Some((i, value));
        }
    }
    let best = best.map_or(0, |(i, _)| i);
    if best >= label_count {
        return Err(DecodeError::IndexOutOfRange {
            index: best,
            labels: label_count,
        });
    }
    Ok(best)
}
