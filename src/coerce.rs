// 🔢 Type coercion - numeric and date columns
// All-or-nothing per column: one bad cell fails the whole column

use crate::error::{PipelineError, Result};
use crate::table::{Table, Value};
use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

/// Coerce each listed column to numbers. Integers stay `Int`, anything with
/// a fraction or exponent becomes `Float`. Nulls stay null.
pub fn to_numeric(table: &mut Table, columns: &[&str]) -> Result<()> {
    for column in columns {
        table.map_column(column, |row, value| match value {
            Value::Null | Value::Int(_) | Value::Float(_) => Ok(value.clone()),
            other => {
                let raw = other.to_string();
                parse_number(&raw).ok_or_else(|| PipelineError::NumericCoercion {
                    column: column.to_string(),
                    row,
                    value: raw,
                })
            }
        })?;
    }
    Ok(())
}

/// Coerce each listed column to calendar dates. Nulls stay null.
pub fn to_date(table: &mut Table, columns: &[&str]) -> Result<()> {
    for column in columns {
        table.map_column(column, |row, value| match value {
            Value::Null | Value::Date(_) => Ok(value.clone()),
            other => {
                let raw = other.to_string();
                parse_date(&raw)
                    .map(Value::Date)
                    .ok_or_else(|| PipelineError::DateCoercion {
                        column: column.to_string(),
                        row,
                        value: raw,
                    })
            }
        })?;
    }
    Ok(())
}

/// Parse one numeric cell
pub fn parse_number(raw: &str) -> Option<Value> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Int(i));
    }

    match s.parse::<f64>() {
        Ok(x) if x.is_finite() => Some(Value::Float(x)),
        _ => None,
    }
}

/// Parse one date cell (supports the common US and ISO layouts)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_numeric_ints_and_floats() {
        let mut table = Table::from_strings(&["capacity"], &[&["12"], &[" 7 "], &["2.5"], &[""]]);
        to_numeric(&mut table, &["capacity"]).unwrap();

        let values: Vec<Value> = table.column("capacity").unwrap().into_iter().cloned().collect();
        assert_eq!(
            values,
            vec![Value::Int(12), Value::Int(7), Value::Float(2.5), Value::Null]
        );
    }

    #[test]
    fn test_to_numeric_fails_whole_column() {
        let mut table = Table::from_strings(&["capacity"], &[&["12"], &["twelve"], &["4"]]);
        let err = to_numeric(&mut table, &["capacity"]).unwrap_err();

        match err {
            PipelineError::NumericCoercion { column, row, value } => {
                assert_eq!(column, "capacity");
                assert_eq!(row, 1);
                assert_eq!(value, "twelve");
            }
            other => panic!("unexpected error: {}", other),
        }

        // no partial coercion
        assert_eq!(table.get(0, "capacity"), Some(&Value::text("12")));
    }

    #[test]
    fn test_to_date_formats() {
        let mut table = Table::from_strings(
            &["license_issued"],
            &[&["07/07/2023"], &["2023-07-07"], &["7/7/2023 12:00:00 AM"], &[""]],
        );
        to_date(&mut table, &["license_issued"]).unwrap();

        let expected = Value::Date(NaiveDate::from_ymd_opt(2023, 7, 7).unwrap());
        assert_eq!(table.get(0, "license_issued"), Some(&expected));
        assert_eq!(table.get(1, "license_issued"), Some(&expected));
        assert_eq!(table.get(2, "license_issued"), Some(&expected));
        assert_eq!(table.get(3, "license_issued"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_date_export_layouts() {
        let expected = NaiveDate::from_ymd_opt(2023, 7, 7);
        for raw in [
            "2023-07-07 00:00:00.000",
            "2023-07-07T08:30:00.25",
            "July 7, 2023",
            "Jul 07, 2023",
            "20230707",
        ] {
            assert_eq!(parse_date(raw), expected, "{} should parse", raw);
        }
        assert_eq!(parse_date("2023"), None);
    }

    #[test]
    fn test_to_date_fails_whole_column() {
        let mut table = Table::from_strings(&["license_issued"], &[&["07/07/2023"], &["soon"]]);
        let err = to_date(&mut table, &["license_issued"]).unwrap_err();

        assert!(matches!(err, PipelineError::DateCoercion { row: 1, .. }));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut table = Table::from_strings(&["other"], &[&["1"]]);
        assert!(matches!(
            to_numeric(&mut table, &["capacity"]),
            Err(PipelineError::MissingColumn { .. })
        ));
    }
}
