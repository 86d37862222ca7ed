use serde::Serialize;
use tracing::{debug, info};

use super::table::RawRow;
use super::SENTINEL;

const STADIUM_GLYPH: char = '♦';

/// A validated stadium row, ready for the sinks. Serialized names are the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StadiumRecord {
    #[serde(rename = "Rank")]
    pub rank: String,
    #[serde(rename = "Stadium")]
    pub stadium: String,
    #[serde(rename = "Seating Capacity")]
    pub seating_capacity: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Images")]
    pub image_link: String,
    #[serde(rename = "Home Team")]
    pub home_team: String,
}

impl StadiumRecord {
    /// Field values in table column order.
    pub fn fields(&self) -> [&str; 8] {
        [
            self.rank.as_str(),
            self.stadium.as_str(),
            self.seating_capacity.as_str(),
            self.region.as_str(),
            self.country.as_str(),
            self.city.as_str(),
            self.image_link.as_str(),
            self.home_team.as_str(),
        ]
    }
}

/// Clean rows into records, preserving order. Incomplete rows are dropped.
pub fn normalize(rows: Vec<RawRow>, placeholder_image: &str) -> Vec<StadiumRecord> {
    let total = rows.len();
    let records: Vec<StadiumRecord> = rows
        .into_iter()
        .filter_map(|row| normalize_row(row, placeholder_image))
        .collect();
    info!(
        "Cleaned {} rows: {} kept, {} dropped",
        total,
        records.len(),
        total - records.len()
    );
    records
}

/// Strip the stadium glyph, reject the row if any non-image field contains
/// the sentinel, then fill a missing image with the placeholder.
fn normalize_row(row: RawRow, placeholder_image: &str) -> Option<StadiumRecord> {
    let stadium = row.stadium.replace(STADIUM_GLYPH, "");

    let required = [
        &row.rank,
        &stadium,
        &row.seating_capacity,
        &row.region,
        &row.country,
        &row.city,
        &row.home_team,
    ];
    if required.iter().any(|f| f.contains(SENTINEL)) {
        debug!("Dropping incomplete row (rank {})", row.rank);
        return None;
    }

    let image_link = if row.image == SENTINEL {
        placeholder_image.to_string()
    } else {
        row.image
    };

    Some(StadiumRecord {
        rank: row.rank,
        stadium,
        seating_capacity: row.seating_capacity,
        region: row.region,
        country: row.country,
        city: row.city,
        image_link,
        home_team: row.home_team,
    })
}
