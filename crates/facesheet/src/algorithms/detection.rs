use tracing::{debug, warn};
use crate::{
    traits::FaceValidator,
    types::{BoundingBox, FaceCandidateSet, RawDetection},
};

/// Accept a face when at least one eye box's top-left corner falls inside it
#[derive(Debug, Clone, Default)]
pub struct EyeContainmentValidator;

impl FaceValidator for EyeContainmentValidator {
    fn validate(&self, faces: &[BoundingBox], eyes: &[BoundingBox]) -> FaceCandidateSet {
        filter_faces(faces, eyes)
    }
}

/// Accept every face box as-is (sorted and deduplicated)
#[derive(Debug, Clone, Default)]
pub struct UnvalidatedFaces;

impl FaceValidator for UnvalidatedFaces {
    fn validate(&self, faces: &[BoundingBox], _eyes: &[BoundingBox]) -> FaceCandidateSet {
        FaceCandidateSet::from_accepted(faces.to_vec())
    }
}

/// Keep the face boxes corroborated by an eye anchor point.
///
/// Each face is pushed once per matching eye, then the list is sorted by
/// `(x, y, w, h)` and equal neighbours collapsed, so the output is in sorted
/// order rather than detector order.
pub fn filter_faces(faces: &[BoundingBox], eyes: &[BoundingBox]) -> FaceCandidateSet {
    let mut accepted = Vec::new();

    for face in faces {
        for eye in eyes {
            if face.contains_point(eye.x, eye.y) {
                accepted.push(*face);
            }
        }
    }

    let candidates = FaceCandidateSet::from_accepted(accepted);
    debug!(
        "{} faces, {} eyes -> {} validated faces",
        faces.len(),
        eyes.len(),
        candidates.len()
    );
    candidates
}

/// Drop malformed detector output, keeping the rest in order
pub fn sanitize_detections(document: &str, raw: Vec<RawDetection>) -> Vec<BoundingBox> {
    raw.into_iter()
        .filter_map(|detection| match BoundingBox::try_from(detection) {
            Ok(bbox) => Some(bbox),
            Err(err) => {
                warn!("Document '{}': dropping detection: {}", document, err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: u32, y: u32, w: u32, h: u32) -> BoundingBox {
        BoundingBox::new(x, y, w, h).unwrap()
    }

    #[test]
    fn test_face_kept_when_eye_inside() {
        let faces = [bbox(100, 100, 80, 80), bbox(300, 300, 60, 60)];
        let eyes = [bbox(120, 130, 15, 15)];
        let result = filter_faces(&faces, &eyes);
        assert_eq!(result.as_slice(), &[bbox(100, 100, 80, 80)]);
    }

    #[test]
    fn test_multiple_eyes_yield_single_face() {
        let faces = [bbox(0, 0, 100, 100)];
        let eyes = [bbox(20, 30, 10, 10), bbox(60, 30, 10, 10), bbox(40, 70, 12, 12)];
        assert_eq!(filter_faces(&faces, &eyes).len(), 1);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let faces = [bbox(10, 10, 50, 50)];
        assert_eq!(filter_faces(&faces, &[bbox(10, 10, 5, 5)]).len(), 1);
        assert_eq!(filter_faces(&faces, &[bbox(60, 60, 5, 5)]).len(), 1);
        assert!(filter_faces(&faces, &[bbox(61, 60, 5, 5)]).is_empty());
        assert!(filter_faces(&faces, &[bbox(9, 20, 5, 5)]).is_empty());
    }

    #[test]
    fn test_eye_anchor_only_counts() {
        // eye overlaps the face but its top-left corner is outside
        let faces = [bbox(50, 50, 40, 40)];
        let eyes = [bbox(40, 60, 30, 10)];
        assert!(filter_faces(&faces, &eyes).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let faces = [bbox(0, 0, 60, 60)];
        assert!(filter_faces(&faces, &[]).is_empty());
        assert!(filter_faces(&[], &faces).is_empty());
    }

    #[test]
    fn test_output_sorted_and_order_independent() {
        let faces = vec![bbox(200, 10, 60, 60), bbox(10, 200, 60, 60), bbox(10, 20, 60, 60)];
        let eyes = vec![bbox(220, 30, 10, 10), bbox(30, 220, 10, 10), bbox(30, 40, 10, 10)];

        let forward = filter_faces(&faces, &eyes);
        let mut rev_faces = faces.clone();
        rev_faces.reverse();
        let mut rev_eyes = eyes.clone();
        rev_eyes.reverse();
        let backward = filter_faces(&rev_faces, &rev_eyes);

        assert_eq!(forward, backward);
        assert_eq!(
            forward.as_slice(),
            &[bbox(10, 20, 60, 60), bbox(10, 200, 60, 60), bbox(200, 10, 60, 60)]
        );
        assert_eq!(forward, filter_faces(&faces, &eyes));
    }

    #[test]
    fn test_unvalidated_faces_ignore_eyes() {
        let faces = [bbox(5, 5, 60, 60), bbox(1, 1, 60, 60), bbox(5, 5, 60, 60)];
        let result = UnvalidatedFaces.validate(&faces, &[]);
        assert_eq!(result.as_slice(), &[bbox(1, 1, 60, 60), bbox(5, 5, 60, 60)]);
    }

    #[test]
    fn test_sanitize_drops_malformed_boxes() {
        let raw = vec![
            RawDetection::from([1, 2, 30, 30]),
            RawDetection::from([1, 2, 0, 30]),
            RawDetection::from([-4, 2, 30, 30]),
            RawDetection::from([7, 8, 9, 10]),
        ];
        let clean = sanitize_detections("page", raw);
        assert_eq!(clean, vec![bbox(1, 2, 30, 30), bbox(7, 8, 9, 10)]);
    }
}
