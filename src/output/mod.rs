//! Output of walk results
//!
//! - `csv`: unit records as CSV, one column per field name seen
//! - JSON: unit records or the discovery tree, through serde_json
//! - `display`: the discovery tree as indented plain text

mod csv;
mod display;

pub use self::csv::{header, write_csv};
pub use display::{render_available_flats, NO_FLATS};

use crate::crawler::ScrapeRequest;
use crate::models::UnitRecord;
use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// File format for scraped records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Default output file name for a request
///
/// `<sel>_<launch>_<flat> Room_<town>.<ext>`, with absent filters written as
/// `All` and any `/` replaced so the name stays a single path component.
pub fn default_file_name(request: &ScrapeRequest, format: OutputFormat) -> String {
    format!(
        "{}_{}_{} Room_{}.{}",
        request.selection_type,
        request.launch_date,
        request.flat_type_label(),
        request.town_label(),
        format.extension()
    )
    .replace('/', "-")
}

/// Serializes any value as pretty-printed JSON
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut w: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, value)?;
    writeln!(w)?;
    Ok(())
}

/// Writes records to `path` in the given format
///
/// # Arguments
///
/// * `records` - Records in walk order
/// * `format` - CSV or JSON
/// * `path` - Destination file, created or truncated
pub fn write_records(records: &[UnitRecord], format: OutputFormat, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Csv => write_csv(&mut writer, records)?,
        OutputFormat::Json => write_json(&mut writer, records)?,
    }

    writer.flush()?;
    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
