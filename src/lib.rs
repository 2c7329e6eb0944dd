// Library crate: pipeline modules, shared by the server binary and tests

pub mod aggregator;
pub mod config;
pub mod error;
pub mod history_store;
pub mod ingest;
pub mod models;
pub mod report;
pub mod routes;
