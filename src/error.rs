use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stadium table (table.wikitable.sortable.sticky-header) not found in page")]
    TableNotFound,

    #[error("failed to fetch page: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to read page from {path:?}: {source}")]
    PageFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("failed to prepare directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to read query file {path:?}: {source}")]
    QueryFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a single table row could not be read. Contained by the extractor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing <{kind}> cell at position {index}")]
    MissingCell { kind: &'static str, index: usize },

    #[error("image cell has no <a> element")]
    MissingAnchor,
}
