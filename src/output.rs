use crate::{JobRecord, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::{info, instrument};

/// Writes `records` to an `.xlsx` file at `path`, one row per record under a bold
/// header row. An existing file is overwritten; an empty collection still
/// produces the header row.
#[instrument(skip(records), fields(records = records.len()))]
pub fn write_xlsx(records: &[JobRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    for (col, name) in JobRecord::COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (row, record) in records.iter().enumerate() {
        for (col, value) in record.values().iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, *value)?;
        }
    }

    workbook.save(path)?;
    info!("Scraped jobs saved to {}", path.display());
    Ok(())
}
