// Oklahoma - Human Services child care provider export

use super::{SourceNormalizer, SourceType};
use crate::coerce::to_numeric;
use crate::error::{PipelineError, Result};
use crate::table::{Table, Value};

const COLUMN_MAP: &[(&str, &str)] = &[
    ("Type License", "license_type"),
    ("Company", "company"),
    ("Accepts Subsidy", "accepts_financial_aid"),
    ("Phone", "phone"),
    ("Email", "email"),
    ("Address1", "address1"),
    ("Address2", "address2"),
    ("City", "city"),
    ("State", "state"),
    ("Zip", "zip"),
    ("Total Cap", "capacity"),
    ("Ages Accepted 1", "ages_served_1"),
    ("AA2", "ages_served_2"),
    ("AA3", "ages_served_3"),
    ("AA4", "ages_served_4"),
];

const DROP_COLUMNS: &[&str] = &[
    "Year Round",
    "Daytime Hours",
    "Star Level",
    "Subsidy Contract Number",
    "License Monitoring Since",
    "School Year Only",
    "Evening Hours",
    "Primary Caregiver",
    "name",
];

const CAREGIVER_COLUMN: &str = "Primary Caregiver";

const WEEKDAYS: &[&str] = &["Mon", "Tues", "Wed", "Thurs", "Friday"];
const WEEKEND: &[&str] = &["Saturday", "Sunday"];

/// Open-day schedule codes derived from the day flags
pub const SCHEDULE_WEEKDAYS: i64 = 1;
pub const SCHEDULE_WEEKENDS: i64 = 2;
pub const SCHEDULE_BOTH: i64 = 3;

pub struct OklahomaNormalizer;

impl OklahomaNormalizer {
    pub fn new() -> Self {
        OklahomaNormalizer
    }

    /// "Jane Doe\r\nDirector" → ("Jane Doe", "Director").
    /// A single line is both the name and the title.
    pub fn split_caregiver(caregiver: &str) -> (String, String) {
        let parts: Vec<&str> = caregiver.split("\r\n").collect();
        let name = parts.first().copied().unwrap_or_default();
        let title = parts.last().copied().unwrap_or_default();
        (name.to_string(), title.to_string())
    }

    /// First two whitespace tokens of a name
    pub fn split_name(name: &str) -> (Option<String>, Option<String>) {
        let mut tokens = name.split_whitespace();
        let first = tokens.next().map(|t| t.to_string());
        let last = tokens.next().map(|t| t.to_string());
        (first, last)
    }

    /// "Family Child Care-12345" → ("Family Child Care", "12345").
    /// Anything other than exactly one hyphen is rejected.
    pub fn split_license(row: usize, value: &str) -> Result<(String, String)> {
        let mut parts = value.split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(kind), Some(number), None) => Ok((kind.to_string(), number.to_string())),
            _ => Err(PipelineError::LicenseSplit {
                row,
                value: value.to_string(),
            }),
        }
    }

    /// Whether a day flag cell means "open"
    fn is_open(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            other => {
                let flag = other.to_string().trim().to_lowercase();
                !flag.is_empty() && !matches!(flag.as_str(), "n" | "no" | "0" | "false")
            }
        }
    }

    /// 1 = weekdays only, 2 = weekends only, 3 = both, null = never open
    fn schedule_codes(table: &Table) -> Vec<Value> {
        let open_on = |row: usize, days: &[&str]| {
            days.iter()
                .any(|day| table.get(row, day).map(Self::is_open).unwrap_or(false))
        };

        (0..table.len())
            .map(|row| match (open_on(row, WEEKDAYS), open_on(row, WEEKEND)) {
                (true, true) => Value::Int(SCHEDULE_BOTH),
                (true, false) => Value::Int(SCHEDULE_WEEKDAYS),
                (false, true) => Value::Int(SCHEDULE_WEEKENDS),
                (false, false) => Value::Null,
            })
            .collect()
    }
}

impl Default for OklahomaNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceNormalizer for OklahomaNormalizer {
    fn source_type(&self) -> SourceType {
        SourceType::Oklahoma
    }

    fn column_map(&self) -> &'static [(&'static str, &'static str)] {
        COLUMN_MAP
    }

    fn drop_columns(&self) -> &'static [&'static str] {
        DROP_COLUMNS
    }

    fn derive(&self, table: &mut Table) -> Result<()> {
        // name + title from the caregiver block
        let (names, titles): (Vec<Value>, Vec<Value>) = table
            .column(CAREGIVER_COLUMN)?
            .iter()
            .map(|v| match v {
                Value::Null => (Value::Null, Value::Null),
                other => {
                    let (name, title) = Self::split_caregiver(&other.to_string());
                    (Value::Text(name), Value::Text(title))
                }
            })
            .unzip();
        table.set_column("name", names);
        table.set_column("title", titles);

        let (first_names, last_names): (Vec<Value>, Vec<Value>) = table
            .column("name")?
            .iter()
            .map(|v| {
                let (first, last) = v
                    .as_text()
                    .map(Self::split_name)
                    .unwrap_or((None, None));
                (
                    first.map(Value::Text).unwrap_or_default(),
                    last.map(Value::Text).unwrap_or_default(),
                )
            })
            .unzip();
        table.set_column("first_name", first_names);
        table.set_column("last_name", last_names);

        // license type and number share one column in the export
        let (kinds, numbers): (Vec<Value>, Vec<Value>) = table
            .column("license_type")?
            .iter()
            .enumerate()
            .map(|(row, v)| match v {
                Value::Null => Ok((Value::Null, Value::Null)),
                other => Self::split_license(row, &other.to_string())
                    .map(|(kind, number)| (Value::Text(kind), Value::Text(number))),
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();
        table.set_column("license_type", kinds);
        table.set_column("license_number", numbers);

        let schedule = Self::schedule_codes(table);
        table.set_column("schedule", schedule);

        to_numeric(table, &["capacity"])?;

        Ok(())
    }
}
