use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::SENTINEL;
use crate::error::{PipelineError, RowError};

const TABLE_SELECTOR: &str = "table.wikitable.sortable.sticky-header";

/// One table row before cleaning. Either fully read, or every field is the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub rank: String,
    pub stadium: String,
    pub seating_capacity: String,
    pub region: String,
    pub country: String,
    pub city: String,
    pub image: String,
    pub home_team: String,
}

impl RawRow {
    pub fn failed() -> Self {
        let na = || SENTINEL.to_string();
        RawRow {
            rank: na(),
            stadium: na(),
            seating_capacity: na(),
            region: na(),
            country: na(),
            city: na(),
            image: na(),
            home_team: na(),
        }
    }

    #[cfg(test)]
    pub fn is_failed(&self) -> bool {
        *self == Self::failed()
    }
}

struct Selectors {
    table: Selector,
    tbody: Selector,
    tr: Selector,
    th: Selector,
    td: Selector,
    anchor: Selector,
}

impl Selectors {
    fn new() -> Self {
        // Constant selectors; parse only fails on invalid CSS.
        let parse = |css: &str| Selector::parse(css).expect("Invalid CSS selector");
        Selectors {
            table: parse(TABLE_SELECTOR),
            tbody: parse("tbody"),
            tr: parse("tr"),
            th: parse("th"),
            td: parse("td"),
            anchor: parse("a"),
        }
    }
}

/// Locate the stadium table and read every data row in document order.
///
/// The first row of the body is the header and is skipped. Data rows are
/// numbered from 2 in diagnostics. A row that cannot be read is logged and
/// kept as [`RawRow::failed`]; it never stops the rows after it.
pub fn extract_rows(html: &str) -> Result<Vec<RawRow>, PipelineError> {
    let document = Html::parse_document(html);
    let sel = Selectors::new();

    let table = document
        .select(&sel.table)
        .next()
        .ok_or(PipelineError::TableNotFound)?;

    let rows: Vec<ElementRef> = table
        .select(&sel.tbody)
        .next()
        .map(|body| body.select(&sel.tr).collect())
        .unwrap_or_default();

    let mut out = Vec::with_capacity(rows.len().saturating_sub(1));
    let mut failed = 0usize;

    for (index, row) in rows.iter().enumerate().skip(1).map(|(i, r)| (i + 1, r)) {
        match parse_row(row, &sel) {
            Ok(raw) => {
                debug!(
                    "Row {}: rank={} stadium={} capacity={} region={} country={} city={} image={} home_team={}",
                    index,
                    raw.rank,
                    raw.stadium,
                    raw.seating_capacity,
                    raw.region,
                    raw.country,
                    raw.city,
                    raw.image,
                    raw.home_team
                );
                out.push(raw);
            }
            Err(e) => {
                warn!("Error processing row {}: {}", index, e);
                failed += 1;
                out.push(RawRow::failed());
            }
        }
    }

    info!("Extracted {} rows ({} failed)", out.len(), failed);
    Ok(out)
}

fn parse_row(row: &ElementRef, sel: &Selectors) -> Result<RawRow, RowError> {
    let ths: Vec<ElementRef> = row.select(&sel.th).collect();
    let tds: Vec<ElementRef> = row.select(&sel.td).collect();

    let th = |index: usize| {
        ths.get(index)
            .copied()
            .ok_or(RowError::MissingCell { kind: "th", index })
    };
    let td = |index: usize| {
        tds.get(index)
            .copied()
            .ok_or(RowError::MissingCell { kind: "td", index })
    };

    let rank = cell_text(th(0)?);
    let stadium = cell_text(td(0)?);
    let seating_capacity = strip_footnote(&cell_text(td(1)?)).to_string();
    let region = cell_text(td(2)?);
    let country = cell_text(td(3)?);
    let city = cell_text(td(4)?);

    // An anchor without href only blanks the image; no anchor at all fails the row.
    let image = td(5)?
        .select(&sel.anchor)
        .next()
        .ok_or(RowError::MissingAnchor)?
        .value()
        .attr("href")
        .unwrap_or(SENTINEL)
        .to_string();

    let home_team = cell_text(td(6)?);

    Ok(RawRow {
        rank,
        stadium,
        seating_capacity,
        region,
        country,
        city,
        image,
        home_team,
    })
}

/// Text fragments of an element, each trimmed, joined without separator.
fn cell_text(el: ElementRef) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

/// Cut a value at its first `[` footnote marker.
fn strip_footnote(s: &str) -> &str {
    s.split('[').next().unwrap_or(s)
}
