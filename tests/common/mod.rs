// Shared test helpers
#![allow(dead_code)]

use equipment_server::history_store::HistoryStore;
use equipment_server::models::{SummaryFields, TypeDistribution};
use tempfile::TempDir;

pub const SAMPLE_CSV: &str = "\
Equipment Name,Type,Flowrate,Pressure,Temperature
Pump-1,Pump,10,1,100
Pump-2,Pump,20,2,200
Valve-1,Valve,30,3,300
";

pub fn summary_fields(file_name: &str) -> SummaryFields {
    let mut type_distribution = TypeDistribution::new();
    type_distribution.insert("Pump".into(), 2);
    type_distribution.insert("Valve".into(), 1);
    SummaryFields {
        file_name: file_name.into(),
        total_count: 3,
        avg_flowrate: 20.0,
        avg_pressure: 2.0,
        avg_temperature: 200.0,
        type_distribution,
    }
}

/// Fresh store in a temp dir. Keep the TempDir alive for the test's duration.
pub async fn temp_store() -> (TempDir, HistoryStore) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.db");
    let store = HistoryStore::connect(path.to_str().unwrap(), 4, 5)
        .await
        .unwrap();
    store.init().await.unwrap();
    (dir, store)
}
