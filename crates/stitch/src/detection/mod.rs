//! Source detection: which known export format best explains a file.

mod detector;

pub use detector::{detect_source, is_confident_detection, DetectionResult, SourceDetector};
