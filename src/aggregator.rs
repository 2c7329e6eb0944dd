// Table -> SummaryFields. Pure; the store assigns id and upload time afterwards.

use crate::error::{Error, Result};
use crate::ingest::Table;
use crate::models::{SummaryFields, TypeDistribution};

pub const FLOWRATE: &str = "Flowrate";
pub const PRESSURE: &str = "Pressure";
pub const TEMPERATURE: &str = "Temperature";
pub const TYPE: &str = "Type";

/// Summarise an equipment table.
///
/// Column presence is checked before row count, so a header-only file that also
/// lacks a column reports `MissingColumn`. Zero rows is `EmptyInput`: means over
/// nothing are undefined and are never stored as 0 or NaN.
pub fn aggregate(file_name: &str, table: &Table) -> Result<SummaryFields> {
    let flowrate_idx = required_column(table, FLOWRATE)?;
    let pressure_idx = required_column(table, PRESSURE)?;
    let temperature_idx = required_column(table, TEMPERATURE)?;
    let type_idx = required_column(table, TYPE)?;

    if table.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut flowrate = RunningMean::default();
    let mut pressure = RunningMean::default();
    let mut temperature = RunningMean::default();
    let mut type_distribution = TypeDistribution::new();

    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        flowrate.push(numeric_cell(row, flowrate_idx, FLOWRATE, row_no)?);
        pressure.push(numeric_cell(row, pressure_idx, PRESSURE, row_no)?);
        temperature.push(numeric_cell(row, temperature_idx, TEMPERATURE, row_no)?);

        let label = cell(row, type_idx);
        if label.is_empty() {
            return Err(Error::InvalidValue {
                column: TYPE.to_string(),
                row: row_no,
                value: String::new(),
            });
        }
        *type_distribution.entry(label.to_string()).or_insert(0) += 1;
    }

    Ok(SummaryFields {
        file_name: file_name.to_string(),
        total_count: table.len() as u64,
        avg_flowrate: finite_mean(FLOWRATE, flowrate)?,
        avg_pressure: finite_mean(PRESSURE, pressure)?,
        avg_temperature: finite_mean(TEMPERATURE, temperature)?,
        type_distribution,
    })
}

/// Incremental mean. `x/k - m/k` stays finite for finite inputs, where a plain sum
/// of values near f64::MAX would overflow.
#[derive(Debug, Default, Clone, Copy)]
struct RunningMean {
    mean: f64,
    count: u64,
}

impl RunningMean {
    fn push(&mut self, x: f64) {
        self.count += 1;
        let k = self.count as f64;
        self.mean += x / k - self.mean / k;
    }
}

fn finite_mean(column: &str, m: RunningMean) -> Result<f64> {
    if m.mean.is_finite() {
        Ok(m.mean)
    } else {
        Err(Error::UndefinedAverage(column.to_string()))
    }
}

fn required_column(table: &Table, name: &str) -> Result<usize> {
    table
        .column(name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn numeric_cell(row: &[String], idx: usize, column: &str, row_no: usize) -> Result<f64> {
    let raw = cell(row, idx);
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::InvalidValue {
            column: column.to_string(),
            row: row_no,
            value: raw.to_string(),
        }),
    }
}
