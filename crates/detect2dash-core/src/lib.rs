// detect2dash-core - Retention and projection of detection batches
//
// Holds the pieces that carry behavior:
// - Payload parsing and validation for ingestion
// - Category and correctness classification of class names
// - Bounded, most-recent-first retention buffer
// - Flattening of retained batches into dashboard rows

pub mod buffer;
pub mod classify;
pub mod error;
pub mod model;
pub mod projection;

pub use buffer::{IngestReceipt, RetentionBuffer, DEFAULT_CAPACITY};
pub use classify::{classify, is_correct, Category};
pub use error::IngestError;
pub use model::{DetectedObject, DetectionBatch, IngestRequest, TIMESTAMP_FORMAT};
pub use projection::{list_detections, project, summarize, DetectionRow, DetectionSummary};
