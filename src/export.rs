use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::info;

use crate::error::PipelineError;
use crate::parser::clean::StadiumRecord;

pub const HEADER: [&str; 8] = [
    "Rank",
    "Stadium",
    "Seating Capacity",
    "Region",
    "Country",
    "City",
    "Images",
    "Home Team",
];

pub fn ensure_dir(path: &Path) -> Result<(), PipelineError> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(());
    }
    info!("Creating directory {}", path.display());
    fs::create_dir_all(path).map_err(|source| PipelineError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the cleaned dataset. The header is written even for an empty set.
pub fn write_records(path: &Path, records: &[StadiumRecord]) -> Result<(), PipelineError> {
    write_atomic(path, |wtr| {
        wtr.write_record(HEADER)?;
        for r in records {
            wtr.serialize(r)?;
        }
        Ok(())
    })?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Write query result rows under the dataset header. Rows keep whatever width the query gave them.
pub fn write_query_results(path: &Path, rows: &[Vec<String>]) -> Result<(), PipelineError> {
    write_atomic(path, |wtr| {
        wtr.write_record(HEADER)?;
        for row in rows {
            wtr.write_record(row)?;
        }
        Ok(())
    })?;
    info!("Wrote {} query rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write to a sibling temp file, then rename over `path`. A failed write leaves no file behind.
fn write_atomic<F>(path: &Path, fill: F) -> Result<(), PipelineError>
where
    F: FnOnce(&mut csv::Writer<fs::File>) -> Result<(), csv::Error>,
{
    let tmp = tmp_path(path);
    write_then_rename(&tmp, path, fill).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        PipelineError::Persistence {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_then_rename<F>(tmp: &Path, path: &Path, fill: F) -> Result<(), csv::Error>
where
    F: FnOnce(&mut csv::Writer<fs::File>) -> Result<(), csv::Error>,
{
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(tmp)?;
    fill(&mut wtr)?;
    wtr.flush()?;
    drop(wtr);
    fs::rename(tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
