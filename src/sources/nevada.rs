// Nevada - Dept of Public & Behavioral Health credential export

use super::{SourceNormalizer, SourceType};
use crate::coerce::{to_date, to_numeric};
use crate::error::Result;
use crate::table::{Table, Value};
use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing run of digits in the address line
static ZIP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)$").expect("valid zip pattern"));

const COLUMN_MAP: &[(&str, &str)] = &[
    ("Name", "company"),
    ("Credential Type", "license_type"),
    ("Credential Number", "license_number"),
    ("Status", "license_status"),
    ("Expiration Date", "certificate_expiration_date"),
    ("Address", "address1"),
    ("State", "state"),
    ("Phone#", "phone"),
    ("First Issue Date", "license_issued"),
    ("Primary Contact Name", "name"),
    ("Primary Contact Role", "title"),
];

const DROP_COLUMNS: &[&str] = &["Disciplinary Action", "County"];

const DATE_COLUMNS: &[&str] = &["certificate_expiration_date", "license_issued"];

pub struct NevadaNormalizer;

impl NevadaNormalizer {
    pub fn new() -> Self {
        NevadaNormalizer
    }

    /// Zip code is the trailing number of the address, if any
    pub fn extract_zip(address: &str) -> Option<String> {
        ZIP_PATTERN
            .captures(address)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Only single-person names ("First Last") are split. Anything else
    /// (one token, three or more, empty) yields no first/last name.
    pub fn split_name(name: &str) -> Option<(String, String)> {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        match tokens.as_slice() {
            [first, last] => Some((first.to_string(), last.to_string())),
            _ => None,
        }
    }
}

impl Default for NevadaNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceNormalizer for NevadaNormalizer {
    fn source_type(&self) -> SourceType {
        SourceType::Nevada
    }

    fn column_map(&self) -> &'static [(&'static str, &'static str)] {
        COLUMN_MAP
    }

    fn drop_columns(&self) -> &'static [&'static str] {
        DROP_COLUMNS
    }

    fn derive(&self, table: &mut Table) -> Result<()> {
        // zip from the address line
        let zips: Vec<Value> = table
            .column("address1")?
            .iter()
            .map(|v| match v.as_text().and_then(Self::extract_zip) {
                Some(zip) => Value::Text(zip),
                None => Value::Null,
            })
            .collect();
        table.set_column("zip", zips);

        // "12-345" → 12345
        table.map_column("license_number", |_, value| {
            Ok(match value {
                Value::Text(s) => Value::Text(s.replace('-', "")),
                other => other.clone(),
            })
        })?;
        to_numeric(table, &["license_number"])?;

        to_date(table, DATE_COLUMNS)?;

        let (first_names, last_names): (Vec<Value>, Vec<Value>) = table
            .column("name")?
            .iter()
            .map(|v| match v.as_text().and_then(Self::split_name) {
                Some((first, last)) => (Value::Text(first), Value::Text(last)),
                None => (Value::Null, Value::Null),
            })
            .unzip();
        table.set_column("first_name", first_names);
        table.set_column("last_name", last_names);

        Ok(())
    }
}
