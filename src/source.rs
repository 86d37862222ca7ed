use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::error::PipelineError;

/// Where the raw page HTML comes from.
pub enum PageSource {
    Http { url: String, timeout: Duration },
    File(PathBuf),
}

impl PageSource {
    pub fn describe(&self) -> String {
        match self {
            PageSource::Http { url, .. } => url.clone(),
            PageSource::File(path) => path.display().to_string(),
        }
    }

    pub async fn fetch(&self) -> Result<String, PipelineError> {
        match self {
            PageSource::Http { url, timeout } => fetch_page(url, *timeout).await,
            PageSource::File(path) => {
                info!("Reading page from {}", path.display());
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| PipelineError::PageFile {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

/// GET the page and decode the body as text. Non-2xx responses are errors.
async fn fetch_page(url: &str, timeout: Duration) -> Result<String, PipelineError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    info!("Fetching page: {}", url);
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    info!("Fetched {} bytes", html.len());
    Ok(html)
}
