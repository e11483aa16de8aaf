// Texas - DHHS child care operations export

use super::{SourceNormalizer, SourceType};
use crate::coerce::{to_date, to_numeric};
use crate::error::Result;
use crate::table::Table;

const COLUMN_MAP: &[(&str, &str)] = &[
    ("Operation/Caregiver Name", "company"),
    ("Address", "address1"),
    ("City", "city"),
    ("State", "state"),
    ("Zip", "zip"),
    ("Phone", "phone"),
    ("Type", "license_type"),
    ("Status", "license_status"),
    ("Issue Date", "license_issued"),
    ("Capacity", "capacity"),
    ("Email Address", "email"),
    ("Facility ID", "provider_id"),
];

const DROP_COLUMNS: &[&str] = &["Operation #", "Agency Number", "County", "Monitoring Frequency"];

pub struct TexasNormalizer;

impl TexasNormalizer {
    pub fn new() -> Self {
        TexasNormalizer
    }
}

impl Default for TexasNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceNormalizer for TexasNormalizer {
    fn source_type(&self) -> SourceType {
        SourceType::Texas
    }

    fn column_map(&self) -> &'static [(&'static str, &'static str)] {
        COLUMN_MAP
    }

    fn drop_columns(&self) -> &'static [&'static str] {
        DROP_COLUMNS
    }

    fn derive(&self, table: &mut Table) -> Result<()> {
        to_numeric(table, &["capacity"])?;
        to_date(table, &["license_issued"])
    }
}
