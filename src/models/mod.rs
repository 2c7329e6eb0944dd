// Domain models

mod summary;

pub use summary::{SummaryFields, SummaryRecord, TypeDistribution};
