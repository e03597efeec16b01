pub mod detection_candidate;
pub mod face_detector;
