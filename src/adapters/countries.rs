//! Country catalogue and eligibility filter

use crate::domain::{AdminLevel, CountryCode, FloodlineError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogRow {
    iso3: String,
    #[serde(default)]
    gid_region: Option<f64>,
    #[serde(default)]
    income_group: Option<String>,
    #[serde(default, alias = "Exclude")]
    exclude: Option<f64>,
}

/// One row of the country catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct CountryEntry {
    pub code: CountryCode,
    /// Administrative level used for regional processing; `None` when the
    /// catalogue marks the country as having no regional boundaries
    pub level: Option<AdminLevel>,
    pub income_group: Option<String>,
    pub excluded: bool,
}

impl CountryEntry {
    /// Whether the country takes part in a batch for the given income groups
    pub fn is_eligible(&self, income_groups: &[String]) -> bool {
        let income_ok = self
            .income_group
            .as_deref()
            .is_some_and(|g| income_groups.iter().any(|wanted| wanted == g));
        income_ok && self.level.is_some() && !self.excluded
    }
}

/// The countries known to the batch, in catalogue order
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    entries: Vec<CountryEntry>,
}

impl CountryCatalog {
    /// Reads the catalogue CSV (`iso3`, `gid_region`, `income_group`, `exclude`)
    ///
    /// Only the named columns are decoded, so other text columns may use any
    /// encoding. Rows with an invalid ISO3 code are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(FloodlineError::DataNotFound(format!(
                "Country catalogue not found: {}",
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let headers = reader.byte_headers()?.clone();

        let mut entries = Vec::new();
        for record in reader.byte_records() {
            let row: CatalogRow = record?.deserialize(Some(&headers))?;
            let code = match CountryCode::new(row.iso3.as_str()) {
                Ok(code) => code,
                Err(e) => {
                    tracing::warn!(iso3 = %row.iso3, error = %e, "Skipping catalogue row");
                    continue;
                }
            };
            let level = row
                .gid_region
                .filter(|l| *l >= 1.0 && l.fract() == 0.0)
                .and_then(|l| AdminLevel::new(l as u8).ok());
            entries.push(CountryEntry {
                code,
                level,
                income_group: row.income_group.filter(|g| !g.is_empty()),
                excluded: row.exclude.is_some_and(|e| e == 1.0),
            });
        }

        tracing::debug!(path = %path.display(), countries = entries.len(), "Loaded country catalogue");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CountryEntry] {
        &self.entries
    }

    pub fn get(&self, code: &CountryCode) -> Option<&CountryEntry> {
        self.entries.iter().find(|e| &e.code == code)
    }

    /// Eligible countries in catalogue order
    pub fn eligible<'a>(&'a self, income_groups: &'a [String]) -> impl Iterator<Item = &'a CountryEntry> + 'a {
        self.entries.iter().filter(move |e| e.is_eligible(income_groups))
    }
}
