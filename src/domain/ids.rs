//! Domain identifier types with validation
//!
//! Newtype wrappers for the keys that travel between pipeline stages. File
//! names are derived from these keys by the persistence layer, never the
//! other way round.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 3166-1 alpha-3 country code
///
/// # Examples
///
/// ```
/// use floodline::domain::ids::CountryCode;
/// use std::str::FromStr;
///
/// let code = CountryCode::from_str("ken").unwrap();
/// assert_eq!(code.as_str(), "KEN");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a new CountryCode, upper-casing the input
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into().trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!(
                "Country code must be three ASCII letters, got: '{code}'"
            ));
        }
        Ok(Self(code))
    }

    /// Returns the country code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountryCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// Hierarchical administrative region code (GADM `GID_n` style)
///
/// Codes are hierarchical, e.g. `KEN` → `KEN.1_1` → `KEN.1.2_1`, and are
/// used verbatim as file stems, so path separators are rejected.
///
/// # Examples
///
/// ```
/// use floodline::domain::ids::RegionCode;
///
/// let code = RegionCode::new("USA.1_1").unwrap();
/// assert_eq!(code.as_str(), "USA.1_1");
/// assert!(RegionCode::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Creates a new RegionCode
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err("Region code cannot be empty".to_string());
        }
        if trimmed.contains(['/', '\\']) {
            return Err(format!("Region code cannot contain path separators: '{trimmed}'"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the region code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RegionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

impl AsRef<str> for RegionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque identifier of a hazard scenario (the stem of the hazard raster file)
///
/// # Examples
///
/// ```
/// use floodline::domain::ids::HazardId;
/// use std::path::Path;
///
/// let id = HazardId::from_path(Path::new("raw/inunriver_rcp8p5_0100.tif")).unwrap();
/// assert_eq!(id.as_str(), "inunriver_rcp8p5_0100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HazardId(String);

impl HazardId {
    /// Creates a new HazardId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Hazard ID cannot be empty".to_string());
        }
        if id.contains(['/', '\\']) {
            return Err(format!("Hazard ID cannot contain path separators: '{id}'"));
        }
        Ok(Self(id))
    }

    /// Derives the hazard id from a raster file path (its file stem)
    pub fn from_path(path: &std::path::Path) -> Result<Self, String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("Cannot derive hazard id from path: {}", path.display()))?;
        Self::new(stem)
    }

    /// Returns the hazard id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HazardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HazardId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HazardId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HazardId> for String {
    fn from(id: HazardId) -> Self {
        id.0
    }
}

/// Administrative level of a boundary dataset (0 = national outline)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AdminLevel(u8);

impl AdminLevel {
    /// Deepest level published by GADM
    pub const MAX: u8 = 5;

    /// Creates a new AdminLevel
    pub fn new(level: u8) -> Result<Self, String> {
        if level > Self::MAX {
            return Err(format!(
                "Administrative level must be between 0 and {}, got {level}",
                Self::MAX
            ));
        }
        Ok(Self(level))
    }

    /// Returns the numeric level
    pub fn get(self) -> u8 {
        self.0
    }

    /// Name of the boundary attribute holding the region code for this level
    pub fn code_column(self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for AdminLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AdminLevel> for u8 {
    fn from(level: AdminLevel) -> Self {
        level.0
    }
}

/// Hazard family a raster belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    /// Riverine flooding
    River,
    /// Coastal flooding
    Coastal,
}

impl HazardKind {
    /// All hazard kinds, in processing order
    pub const ALL: [HazardKind; 2] = [HazardKind::River, HazardKind::Coastal];

    /// Returns the kind as a lowercase string
    pub fn as_str(self) -> &'static str {
        match self {
            HazardKind::River => "river",
            HazardKind::Coastal => "coastal",
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "river" | "riverine" | "inunriver" => Ok(HazardKind::River),
            "coastal" | "coast" | "inuncoast" => Ok(HazardKind::Coastal),
            other => Err(format!(
                "Invalid hazard kind '{other}'. Must be one of: river, coastal"
            )),
        }
    }
}

/// Typed key identifying one unit of pipeline work
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// Country being processed
    pub country: CountryCode,
    /// Hazard family
    pub kind: HazardKind,
    /// Hazard scenario, if the item is scoped to one hazard file
    pub hazard: Option<HazardId>,
    /// Region, if the item is scoped to one region
    pub region: Option<RegionCode>,
}

impl ItemKey {
    /// Key for a whole country and hazard kind
    pub fn country(country: CountryCode, kind: HazardKind) -> Self {
        Self {
            country,
            kind,
            hazard: None,
            region: None,
        }
    }

    /// Narrows the key to one hazard file
    pub fn with_hazard(mut self, hazard: HazardId) -> Self {
        self.hazard = Some(hazard);
        self
    }

    /// Narrows the key to one region
    pub fn with_region(mut self, region: RegionCode) -> Self {
        self.region = Some(region);
        self
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.kind)?;
        if let Some(hazard) = &self.hazard {
            write!(f, "/{hazard}")?;
        }
        if let Some(region) = &self.region {
            write!(f, "/{region}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_normalizes_case() {
        let code = CountryCode::new(" usa ").unwrap();
        assert_eq!(code.as_str(), "USA");
        assert_eq!(code.to_string(), "USA");
    }

    #[test]
    fn test_country_code_invalid() {
        assert!(CountryCode::new("").is_err());
        assert!(CountryCode::new("US").is_err());
        assert!(CountryCode::new("U5A").is_err());
        assert!(CountryCode::new("USAA").is_err());
    }

    #[test]
    fn test_region_code_rejects_empty_and_separators() {
        assert!(RegionCode::new("  ").is_err());
        assert!(RegionCode::new("USA/1").is_err());
        assert!(RegionCode::new("USA\\1").is_err());
        assert_eq!(RegionCode::new(" USA.1_1 ").unwrap().as_str(), "USA.1_1");
    }

    #[test]
    fn test_hazard_id_from_path() {
        let id = HazardId::from_path(std::path::Path::new(
            "/data/raw/flood_hazard/inunriver_historical_000000000WATCH_1980_rp00100.tif",
        ))
        .unwrap();
        assert_eq!(
            id.as_str(),
            "inunriver_historical_000000000WATCH_1980_rp00100"
        );
    }

    #[test]
    fn test_admin_level_bounds() {
        assert!(AdminLevel::new(0).is_ok());
        assert!(AdminLevel::new(5).is_ok());
        assert!(AdminLevel::new(6).is_err());
        assert_eq!(AdminLevel::new(2).unwrap().code_column("GID_"), "GID_2");
    }

    #[test]
    fn test_hazard_kind_parse() {
        assert_eq!(HazardKind::from_str("River").unwrap(), HazardKind::River);
        assert_eq!(HazardKind::from_str("inuncoast").unwrap(), HazardKind::Coastal);
        assert!(HazardKind::from_str("volcanic").is_err());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let json = serde_json::to_string(&CountryCode::new("ken").unwrap()).unwrap();
        assert_eq!(json, "\"KEN\"");
        assert!(serde_json::from_str::<CountryCode>("\"KENYA\"").is_err());
        assert!(serde_json::from_str::<AdminLevel>("9").is_err());
    }

    #[test]
    fn test_item_key_display() {
        let key = ItemKey::country(CountryCode::new("USA").unwrap(), HazardKind::River)
            .with_hazard(HazardId::new("rp100").unwrap())
            .with_region(RegionCode::new("USA.1_1").unwrap());
        assert_eq!(key.to_string(), "USA/river/rp100/USA.1_1");
    }
}
