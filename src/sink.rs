use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::info;

use crate::db::{self, QueryResult, Stats};
use crate::error::PipelineError;
use crate::export;
use crate::parser::clean::StadiumRecord;
use crate::settings::Settings;

/// Flat-file and relational outputs for one run.
pub struct Sink {
    conn: Connection,
    output_csv: PathBuf,
    results_csv: PathBuf,
    batch_size: usize,
}

impl Sink {
    /// Prepare the data directory, open the database and make sure the table exists.
    pub fn open(settings: &Settings) -> Result<Self, PipelineError> {
        export::ensure_dir(&settings.data_dir)?;
        if let Some(parent) = settings.db_path.parent() {
            export::ensure_dir(parent)?;
        }
        let conn = db::connect(&settings.db_path)?;
        info!("Database: {}", settings.db_path.display());
        Self::with_connection(conn, settings)
    }

    pub fn with_connection(conn: Connection, settings: &Settings) -> Result<Self, PipelineError> {
        db::init_schema(&conn)?;
        Ok(Sink {
            conn,
            output_csv: settings.output_csv(),
            results_csv: settings.query_results_csv(),
            batch_size: settings.batch_size,
        })
    }

    pub fn persist(&self, records: &[StadiumRecord]) -> Result<PathBuf, PipelineError> {
        export::write_records(&self.output_csv, records)?;
        Ok(self.output_csv.clone())
    }

    pub fn load_into_table(&self, records: &[StadiumRecord]) -> Result<usize, PipelineError> {
        db::replace_stadiums(&self.conn, records, self.batch_size)
    }

    pub fn run_query(&self, sql: &str) -> Result<QueryResult, PipelineError> {
        db::run_query(&self.conn, sql)
    }

    pub fn export_results(&self, rows: &[Vec<String>]) -> Result<PathBuf, PipelineError> {
        export::write_query_results(&self.results_csv, rows)?;
        Ok(self.results_csv.clone())
    }

    pub fn stats(&self) -> Result<Stats, PipelineError> {
        db::get_stats(&self.conn)
    }
}

pub fn read_query(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::QueryFile {
        path: path.to_path_buf(),
        source,
    })
}
