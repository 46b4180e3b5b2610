use crate::core::models::force::ForceReport;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForceTableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),
}

const TITLE: &str = "# local force from directional trial-move acceptance";
const COLUMNS: &str = "# unit\tn_down\tn_up\tln(n_down/n_up)";

/// Tab-separated force table, one row per tracked unit.
///
/// Non-finite forces are written as `inf`, `-inf` or `NaN`.
pub struct ForceTable;

impl ForceTable {
    pub fn write_to(report: &ForceReport, writer: &mut impl Write) -> Result<(), ForceTableError> {
        writeln!(writer, "{}", TITLE)?;
        writeln!(writer, "{}", COLUMNS)?;

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(&mut *writer);
        for record in &report.records {
            csv_writer.write_record([
                record.unit_id.to_string(),
                record.down_count.to_string(),
                record.up_count.to_string(),
                record.force.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        report: &ForceReport,
        path: P,
    ) -> Result<(), ForceTableError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(report, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
