pub mod clean;
pub mod columns;
pub mod table;

use url::Url;

use crate::error::PipelineError;
use clean::StadiumRecord;
use columns::Columns;

/// Stands in for any value that could not be extracted.
pub const SENTINEL: &str = "n/a";

/// Three-stage pipeline: html → raw rows → rectangular columns → clean records.
pub fn process_page(
    html: &str,
    base: &Url,
    placeholder_image: &str,
) -> Result<Vec<StadiumRecord>, PipelineError> {
    let rows = table::extract_rows(html)?;
    let columns = Columns::reconcile(rows, base);
    Ok(clean::normalize(columns.into_rows(), placeholder_image))
}

// ── Tests ──
