//! Population table reader

use crate::domain::{FloodlineError, PopulationRecord, RegionCode, Result};
use std::path::Path;

/// Reads per-region population totals from a CSV table
///
/// `code_column` and `value_column` name the header fields holding the region
/// code and the population value. Rows with an empty code are ignored; an
/// unparseable value is an error, since the table is an input contract.
///
/// # Errors
///
/// - `DataNotFound` if the table does not exist
/// - `InvalidData` if a column is missing or a value is not numeric
pub fn read_population(
    path: &Path,
    code_column: &str,
    value_column: &str,
) -> Result<Vec<PopulationRecord>> {
    if !path.is_file() {
        return Err(FloodlineError::DataNotFound(format!(
            "Population table not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            FloodlineError::InvalidData(format!(
                "{}: missing column '{}'",
                path.display(),
                name
            ))
        })
    };
    let code_idx = column(code_column)?;
    let value_idx = column(value_column)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let code = row.get(code_idx).unwrap_or_default();
        if code.is_empty() {
            continue;
        }
        let raw = row.get(value_idx).unwrap_or_default();
        let population: f64 = raw.parse().map_err(|_| {
            FloodlineError::InvalidData(format!(
                "{}: row {}: '{}' is not a number",
                path.display(),
                line + 2,
                raw
            ))
        })?;
        records.push(PopulationRecord {
            region: RegionCode::new(code).map_err(FloodlineError::InvalidData)?,
            population,
        });
    }

    tracing::debug!(path = %path.display(), rows = records.len(), "Loaded population table");
    Ok(records)
}
