use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::parser::{self, clean::StadiumRecord};
use crate::settings::Settings;
use crate::sink::Sink;
use crate::source::PageSource;

/// Outcome of one scrape-and-write pass.
pub struct Published {
    pub sink: Sink,
    pub records: usize,
    pub output_csv: PathBuf,
    /// Rows loaded into `stadiums`, when the table load ran.
    pub loaded: Option<usize>,
}

/// The configured article, or a local HTML file when one is given.
pub fn page_source(settings: &Settings, html: Option<PathBuf>) -> PageSource {
    match html {
        Some(path) => PageSource::File(path),
        None => PageSource::Http {
            url: settings.page_url.clone(),
            timeout: Duration::from_secs(settings.fetch_timeout_secs),
        },
    }
}

pub async fn extract_records(
    settings: &Settings,
    source: &PageSource,
) -> Result<Vec<StadiumRecord>> {
    let page = source
        .fetch()
        .await
        .with_context(|| format!("Failed to load page from {}", source.describe()))?;

    let base = Url::parse(&settings.base_url)
        .with_context(|| format!("Invalid base_url {:?}", settings.base_url))?;

    let records = parser::process_page(&page, &base, &settings.placeholder_image)?;
    Ok(records)
}

/// Parse the page, then write the CSV and optionally load the table.
/// The sink (directory, database) is only opened once parsing has succeeded.
pub async fn publish(settings: &Settings, source: &PageSource, load_table: bool) -> Result<Published> {
    let records = extract_records(settings, source).await?;
    let sink = Sink::open(settings)?;

    let output_csv = sink.persist(&records)?;
    let loaded = if load_table {
        Some(sink.load_into_table(&records)?)
    } else {
        None
    };

    Ok(Published {
        sink,
        records: records.len(),
        output_csv,
        loaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::error::PipelineError;

    fn settings(dir: &Path) -> Settings {
        Settings {
            data_dir: dir.join("include").join("data"),
            db_path: dir.join("db").join("stadiums.sqlite"),
            ..Settings::default()
        }
    }

    fn fixture(name: &str) -> PageSource {
        PageSource::File(PathBuf::from(format!("tests/fixtures/{}.html", name)))
    }

    #[tokio::test]
    async fn missing_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());

        let err = publish(&s, &fixture("no_table"), true).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::TableNotFound)
        ));
        assert!(!s.data_dir.exists());
        assert!(!s.db_path.exists());
        assert!(!s.output_csv().exists());
    }

    #[tokio::test]
    async fn broken_row_leaves_header_plus_two_lines() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());

        let out = publish(&s, &fixture("three_rows"), true).await.unwrap();
        assert_eq!(out.records, 2);
        assert_eq!(out.loaded, Some(2));
        assert_eq!(out.output_csv, s.output_csv());

        let text = std::fs::read_to_string(&out.output_csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,Rungrado 1st of May Stadium,"));
        assert!(lines[2].starts_with("3,Camp Nou,"));
        assert_eq!(out.sink.stats().unwrap().total, 2);
    }

    #[tokio::test]
    async fn extract_only_skips_table_load() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());

        let out = publish(&s, &fixture("stadiums"), false).await.unwrap();
        assert_eq!(out.records, 4);
        assert_eq!(out.loaded, None);
        assert_eq!(out.sink.stats().unwrap().total, 0);
    }

    #[test]
    fn html_flag_selects_local_file() {
        let s = Settings::default();
        assert!(matches!(
            page_source(&s, Some(PathBuf::from("page.html"))),
            PageSource::File(_)
        ));
        assert!(matches!(page_source(&s, None), PageSource::Http { .. }));
    }
}
