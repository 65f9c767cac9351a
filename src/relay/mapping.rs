//! Lookup table loader
//!
//! Parses the delimited spreadsheet export that maps popup campaign names to
//! CRM listing ids. The sheet is exported by hand, so the delimiter is sniffed
//! from the header and columns are located by name.

use std::collections::HashMap;
use std::time::Duration;

use super::error::{RelayError, Result};
use super::normalize::{normalize, normalize_campaign_name};
use crate::logger;

/// Normalized campaign name -> client listing id
pub type Mapping = HashMap<String, String>;

const CAMPAIGN_COLUMN: &str = "poptin_name";
const LISTING_COLUMN: &str = "clientlistingid";
const ACTIVE_COLUMN: &str = "active";

/// Values of the `active` column that keep a row
const ACTIVE_VALUES: [&str; 3] = ["true", "1", "yes"];

/// A single data row, already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRow {
    pub campaign_name: String,
    pub client_listing_id: String,
    pub active: bool,
}

impl LookupRow {
    /// Rows missing either key field never make it into the mapping
    fn is_usable(&self) -> bool {
        self.active && !self.campaign_name.is_empty() && !self.client_listing_id.is_empty()
    }
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy, Default)]
struct Columns {
    campaign: Option<usize>,
    listing: Option<usize>,
    active: Option<usize>,
}

impl Columns {
    fn resolve(header: &[String]) -> Self {
        let find = |name: &str| header.iter().position(|h| h == name);
        Self {
            campaign: find(CAMPAIGN_COLUMN),
            listing: find(LISTING_COLUMN),
            active: find(ACTIVE_COLUMN),
        }
    }
}

/// Parsed lookup table, rows in source order
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    pub delimiter: char,
    pub rows: Vec<LookupRow>,
}

impl LookupTable {
    /// Parse the exported text
    ///
    /// A document with fewer than two non-empty lines yields an empty table.
    /// The delimiter is `;` when the header contains one, `,` otherwise, and
    /// applies to every row.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .collect();

        let Some((header, data)) = lines.split_first() else {
            return Self::default();
        };
        if data.is_empty() {
            return Self::default();
        }

        let delimiter = if header.contains(';') { ';' } else { ',' };
        let header: Vec<String> = header.split(delimiter).map(normalize).collect();
        let columns = Columns::resolve(&header);

        let rows = data
            .iter()
            .map(|line| {
                let cells: Vec<&str> = line.split(delimiter).collect();
                let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i).copied());

                // A present but empty `active` cell fails the allow-list
                let active = columns.active.map_or(true, |_| {
                    let value = normalize(cell(columns.active).unwrap_or_default());
                    ACTIVE_VALUES.contains(&value.as_str())
                });

                LookupRow {
                    campaign_name: normalize_campaign_name(cell(columns.campaign).unwrap_or_default()),
                    client_listing_id: cell(columns.listing).unwrap_or_default().trim().to_string(),
                    active,
                }
            })
            .collect();

        Self { delimiter, rows }
    }

    /// Collapse into a mapping, later rows overwriting earlier ones
    pub fn into_mapping(self) -> Mapping {
        let total = self.rows.len();
        let delimiter = self.delimiter;
        let mapping: Mapping = self
            .rows
            .into_iter()
            .filter(LookupRow::is_usable)
            .map(|row| (row.campaign_name, row.client_listing_id))
            .collect();
        logger::log_debug(&format!(
            "[Mapping] {total} rows parsed ('{delimiter}' separated), {} campaign names mapped",
            mapping.len()
        ));
        mapping
    }
}

/// Fetch the lookup table and build the mapping
pub async fn fetch_mapping(
    client: &reqwest::Client,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Mapping> {
    let mut request = client.get(url);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| RelayError::fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::fetch(status.as_u16().to_string()));
    }

    let text = response
        .text()
        .await
        .map_err(|e| RelayError::fetch(e.to_string()))?;

    Ok(LookupTable::parse(&text).into_mapping())
}
