// 📂 Input Provider - decode customer records from JSON or CSV files
// No schema validation beyond what serde decoding enforces

use crate::customer::Customer;
use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Load customers, picking the decoder from the file extension (`.csv` → CSV, else JSON)
pub fn load_customers(path: &Path) -> Result<Vec<Customer>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        load_csv(path)
    } else {
        load_json(path)
    }
}

/// Load a JSON array of customer records
pub fn load_json(path: &Path) -> Result<Vec<Customer>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {:?}", path))?;

    let customers = parse_json(&content)?;
    info!(count = customers.len(), path = %path.display(), "loaded customers from JSON");
    Ok(customers)
}

pub fn parse_json(content: &str) -> Result<Vec<Customer>> {
    serde_json::from_str(content).context("Failed to parse customer JSON")
}

/// Load a CSV file whose header row carries the record field names
pub fn load_csv(path: &Path) -> Result<Vec<Customer>> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;

    let customers = read_csv(file)?;
    info!(count = customers.len(), path = %path.display(), "loaded customers from CSV");
    Ok(customers)
}

/// Decode CSV rows from any reader; an empty `payment_amount` cell decodes as absent
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Customer>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut customers = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let customer: Customer =
            result.with_context(|| format!("Failed to deserialize customer on row {}", index + 1))?;
        customers.push(customer);
    }

    Ok(customers)
}

// ============================================================================
// TESTS
// ============================================================================
