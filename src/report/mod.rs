// Summary -> report lines -> page. Rendering knows nothing about pages; `layout`
// binds lines to positions on any PageDrawer.

mod pdf;

pub use pdf::{PageDrawer, PdfDocument};

use crate::error::{Error, Result};
use crate::models::SummaryRecord;

/// Fixed lines before the per-type entries (including the blank separator).
pub const HEADER_LINES: usize = 8;

const TOP_Y: f32 = 800.0;
const BOTTOM_Y: f32 = 50.0;
const LINE_STEP: f32 = 20.0;
const HEADER_X: f32 = 50.0;
const ENTRY_X: f32 = 70.0;

/// Report lines for one summary: `HEADER_LINES` fixed lines, then one `"<type>: <count>"`
/// line per distribution entry in label order.
pub fn render(record: &SummaryRecord) -> Result<Vec<String>> {
    validate(record)?;

    let mut lines = Vec::with_capacity(HEADER_LINES + record.type_distribution.len());
    lines.push(format!("File Name: {}", record.file_name));
    lines.push(format!(
        "Uploaded At: {}",
        record.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!("Total Count: {}", record.total_count));
    lines.push(format!("Average Flowrate: {:.2}", record.avg_flowrate));
    lines.push(format!("Average Pressure: {:.2}", record.avg_pressure));
    lines.push(format!("Average Temperature: {:.2}", record.avg_temperature));
    lines.push(String::new());
    lines.push("Type Distribution:".to_string());
    for (equipment_type, count) in &record.type_distribution {
        lines.push(format!("{}: {}", equipment_type, count));
    }
    Ok(lines)
}

fn validate(record: &SummaryRecord) -> Result<()> {
    if record.total_count == 0 {
        return Err(Error::InvalidRecord(
            "total_count is 0, averages are undefined".into(),
        ));
    }
    for (name, value) in [
        ("avg_flowrate", record.avg_flowrate),
        ("avg_pressure", record.avg_pressure),
        ("avg_temperature", record.avg_temperature),
    ] {
        if !value.is_finite() {
            return Err(Error::InvalidRecord(format!("{name} is undefined ({value})")));
        }
    }
    let distributed: u64 = record.type_distribution.values().sum();
    if distributed != record.total_count {
        return Err(Error::InvalidRecord(format!(
            "type_distribution sums to {distributed}, total_count is {}",
            record.total_count
        )));
    }
    Ok(())
}

/// Draw `lines` top-down, 20pt apart. Header lines at x=50, entries indented to x=70.
/// Starts a new page when the next line would fall below the bottom margin.
pub fn layout<D: PageDrawer>(lines: &[String], drawer: &mut D) {
    let mut y = TOP_Y;
    for (i, line) in lines.iter().enumerate() {
        if y < BOTTOM_Y {
            drawer.new_page();
            y = TOP_Y;
        }
        let x = if i < HEADER_LINES { HEADER_X } else { ENTRY_X };
        drawer.draw_string(x, y, line);
        y -= LINE_STEP;
    }
}

/// Render `record` and lay it out as a PDF document.
pub fn render_pdf(record: &SummaryRecord) -> Result<Vec<u8>> {
    let lines = render(record)?;
    let mut doc = PdfDocument::new();
    layout(&lines, &mut doc);
    Ok(doc.finish())
}
