//! Score records and the report they are collected into.

use serde::Serialize;

/// Name of the L2 difference metric.
pub const L2_DIFFERENCE: &str = "L2difference";
/// Reserved slot for the solution-quality metric. Always absent for now.
pub const MFS_SOLUTION: &str = "MFSsolution";

/// A named metric value; `None` marks a metric that is not computed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: Option<f64>,
}

impl MetricRecord {
    pub fn computed(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value),
        }
    }

    pub fn absent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

/// Result of scoring one (submission, truth) pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub dataset: String,
    pub metrics: Vec<MetricRecord>,
}

impl ScoreRecord {
    /// Record carrying the L2 value and the reserved placeholder slot.
    pub fn with_l2(dataset: impl Into<String>, l2: f64) -> Self {
        Self {
            dataset: dataset.into(),
            metrics: vec![
                MetricRecord::computed(L2_DIFFERENCE, l2),
                MetricRecord::absent(MFS_SOLUTION),
            ],
        }
    }

    pub fn metric(&self, name: &str) -> Option<&MetricRecord> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

/// Ordered score records; serialises as a bare JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    records: Vec<ScoreRecord>,
}

impl Report {
    pub fn push(&mut self, record: ScoreRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
