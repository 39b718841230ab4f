use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::recorder::IntervalSeries;

pub const EXPORT_FILE_NAME: &str = "keystroke_timings.csv";

/// One interval, addressed the way the CSV export lays it out
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalRow {
    /// 1-based
    pub passage: usize,
    /// 0-based
    pub index: usize,
    pub interval_ms: f64,
}

pub fn interval_rows(series: &[IntervalSeries]) -> Vec<IntervalRow> {
    series
        .iter()
        .enumerate()
        .flat_map(|(p, s)| {
            s.as_slice()
                .iter()
                .enumerate()
                .map(move |(index, &interval_ms)| IntervalRow {
                    passage: p + 1,
                    index,
                    interval_ms,
                })
        })
        .collect()
}

/// Write `passage,index,timing` rows with two decimals of precision
pub fn write_csv<W: Write>(writer: W, rows: &[IntervalRow]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["passage", "index", "timing"])?;

    for row in rows {
        wtr.write_record([
            row.passage.to_string(),
            row.index.to_string(),
            format!("{:.2}", row.interval_ms),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write every series to `keystroke_timings.csv` inside `dir`
pub fn export_to_dir<P: AsRef<Path>>(
    dir: P,
    series: &[IntervalSeries],
) -> Result<PathBuf, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(EXPORT_FILE_NAME);
    let rows = interval_rows(series);
    write_csv(File::create(&path)?, &rows)?;

    info!(path = %path.display(), rows = rows.len(), "exported keystroke timings");
    Ok(path)
}
