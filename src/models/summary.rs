// Summary of one uploaded equipment CSV.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Equipment type label -> number of rows with that label.
/// BTreeMap keeps JSON and report output ordered by label.
pub type TypeDistribution = BTreeMap<String, u64>;

/// Aggregator output: everything in a record except what the store assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFields {
    pub file_name: String,
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

/// A stored summary. Never updated after insert; the store only adds and evicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: i64,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

impl SummaryRecord {
    pub fn from_fields(id: i64, uploaded_at: DateTime<Utc>, fields: SummaryFields) -> Self {
        Self {
            id,
            file_name: fields.file_name,
            uploaded_at,
            total_count: fields.total_count,
            avg_flowrate: fields.avg_flowrate,
            avg_pressure: fields.avg_pressure,
            avg_temperature: fields.avg_temperature,
            type_distribution: fields.type_distribution,
        }
    }
}
