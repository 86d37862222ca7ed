use itertools::izip;
use tracing::{info, warn};
use url::Url;

use super::table::RawRow;
use super::SENTINEL;

/// The dataset as one sequence per field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Columns {
    pub rank: Vec<String>,
    pub stadium: Vec<String>,
    pub seating_capacity: Vec<String>,
    pub region: Vec<String>,
    pub country: Vec<String>,
    pub city: Vec<String>,
    pub image: Vec<String>,
    pub home_team: Vec<String>,
}

impl Columns {
    /// Split rows into columns, make image links absolute, then pad to a rectangle.
    pub fn reconcile(rows: Vec<RawRow>, base: &Url) -> Self {
        let mut columns = Columns::default();
        for row in rows {
            columns.push_row(row);
        }
        columns.resolve_images(base);
        columns.pad();
        columns
    }

    pub fn push_row(&mut self, row: RawRow) {
        self.rank.push(row.rank);
        self.stadium.push(row.stadium);
        self.seating_capacity.push(row.seating_capacity);
        self.region.push(row.region);
        self.country.push(row.country);
        self.city.push(row.city);
        self.image.push(row.image);
        self.home_team.push(row.home_team);
    }

    pub fn lens(&self) -> [usize; 8] {
        [
            self.rank.len(),
            self.stadium.len(),
            self.seating_capacity.len(),
            self.region.len(),
            self.country.len(),
            self.city.len(),
            self.image.len(),
            self.home_team.len(),
        ]
    }

    pub fn max_len(&self) -> usize {
        self.lens().into_iter().max().unwrap_or(0)
    }

    pub fn is_rectangular(&self) -> bool {
        let lens = self.lens();
        lens.iter().all(|&l| l == lens[0])
    }

    pub fn resolve_images(&mut self, base: &Url) {
        for image in &mut self.image {
            *image = resolve_image(base, image);
        }
    }

    /// Append the sentinel to every column shorter than the longest one.
    pub fn pad(&mut self) {
        let max = self.max_len();
        if !self.is_rectangular() {
            info!("Padding ragged columns {:?} to {}", self.lens(), max);
        }
        for column in self.columns_mut() {
            column.resize(max, SENTINEL.to_string());
        }
    }

    fn columns_mut(&mut self) -> [&mut Vec<String>; 8] {
        [
            &mut self.rank,
            &mut self.stadium,
            &mut self.seating_capacity,
            &mut self.region,
            &mut self.country,
            &mut self.city,
            &mut self.image,
            &mut self.home_team,
        ]
    }

    /// Zip the columns back into rows. Call after [`Columns::pad`]; a
    /// ragged set is cut to its shortest column.
    pub fn into_rows(self) -> Vec<RawRow> {
        izip!(
            self.rank,
            self.stadium,
            self.seating_capacity,
            self.region,
            self.country,
            self.city,
            self.image,
            self.home_team
        )
        .map(
            |(rank, stadium, seating_capacity, region, country, city, image, home_team)| RawRow {
                rank,
                stadium,
                seating_capacity,
                region,
                country,
                city,
                image,
                home_team,
            },
        )
        .collect()
    }
}

/// Join an image reference against `base`. The sentinel passes through, and
/// anything that does not yield an absolute http(s) URL becomes the sentinel.
fn resolve_image(base: &Url, href: &str) -> String {
    if href == SENTINEL {
        return SENTINEL.to_string();
    }
    match base.join(href) {
        Ok(url) if url.has_host() => url.to_string(),
        Ok(url) => {
            warn!("Image link {} has no host, dropping it", url);
            SENTINEL.to_string()
        }
        Err(e) => {
            warn!("Could not resolve image link {:?}: {}", href, e);
            SENTINEL.to_string()
        }
    }
}
