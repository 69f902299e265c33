//! Flattening retained batches into dashboard rows.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Number;

use crate::buffer::RetentionBuffer;
use crate::classify::{classify, is_correct, Category};
use crate::model::DetectionBatch;

/// One detected object as shown by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRow {
    /// `"{batch index}-{class name}"`. Not unique when a batch repeats a class.
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "classe")]
    pub class_name: String,
    #[serde(rename = "categoria")]
    pub category: Category,
    #[serde(rename = "correto")]
    pub is_correct: bool,
    #[serde(rename = "tempoInferencia")]
    pub inference_time_ms: Number,
}

/// Aggregate figures over a set of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub total: usize,
    #[serde(rename = "corretos")]
    pub correct: usize,
    #[serde(rename = "defeituosos")]
    pub defective: usize,
    /// Mean inference time per row in milliseconds, 0 when empty.
    #[serde(rename = "tempoMedio")]
    pub mean_inference_time_ms: f64,
}

/// Rows for every retained object, most recent batch first.
pub fn list_detections(buffer: &RetentionBuffer) -> Vec<DetectionRow> {
    project(&buffer.snapshot())
}

/// Flatten `batches` (most recent first) into rows, preserving object order
/// within each batch.
pub fn project(batches: &[Arc<DetectionBatch>]) -> Vec<DetectionRow> {
    batches
        .iter()
        .enumerate()
        .flat_map(|(index, batch)| {
            let timestamp = iso_timestamp(&batch.timestamp);
            batch.objects.iter().map(move |object| DetectionRow {
                id: format!("{}-{}", index, object.class_name),
                timestamp: timestamp.clone(),
                class_name: object.class_name.clone(),
                category: classify(&object.class_name),
                is_correct: is_correct(&object.class_name),
                inference_time_ms: batch.inference_time_ms.clone(),
            })
        })
        .collect()
}

pub fn summarize(rows: &[DetectionRow]) -> DetectionSummary {
    let correct = rows.iter().filter(|row| row.is_correct).count();
    let mean_inference_time_ms = if rows.is_empty() {
        0.0
    } else {
        let sum: f64 = rows
            .iter()
            .filter_map(|row| row.inference_time_ms.as_f64())
            .sum();
        sum / rows.len() as f64
    };

    DetectionSummary {
        total: rows.len(),
        correct,
        defective: rows.len() - correct,
        mean_inference_time_ms,
    }
}

// "2024-01-01 10:00:00" -> "2024-01-01T10:00:00"
fn iso_timestamp(timestamp: &str) -> String {
    timestamp.replacen(' ', "T", 1)
}
