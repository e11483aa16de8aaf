// 🔍 Duplicate Flagger - repeated phone numbers and addresses
// Scope is one source table; sources are never compared with each other

use crate::error::Result;
use crate::table::{Table, Value};
use std::collections::HashSet;

/// Columns checked for repeats, each gets a `duplicate_<column>` sibling
pub const DUPLICATE_COLUMNS: [&str; 2] = ["phone", "address1"];

/// Name of the flag column for a checked column
pub fn flag_column(column: &str) -> String {
    format!("duplicate_{}", column)
}

/// Flag repeated phone numbers and addresses within one table.
///
/// 1. `phone` is whitespace-trimmed in place.
/// 2. For each of `phone` and `address1`, a row whose value already appeared
///    in an earlier row gets `duplicate_<column> = 1`. Everything else is null
///    (only positives are marked). The first occurrence is never flagged.
///
/// Missing values compare equal to each other, so the second and later null
/// cells of a column are flagged like any other repeat.
pub fn flag_duplicates(mut table: Table) -> Result<Table> {
    table.map_column("phone", |_, value| {
        Ok(match value {
            Value::Text(s) => Value::Text(s.trim().to_string()),
            other => other.clone(),
        })
    })?;

    for column in DUPLICATE_COLUMNS {
        let flags = mark_repeats(&table.column(column)?);
        table.set_column(&flag_column(column), flags);
    }

    Ok(table)
}

/// Single pass over a column with a seen-set; null is keyed as `None`
fn mark_repeats(values: &[&Value]) -> Vec<Value> {
    let mut seen: HashSet<Option<String>> = HashSet::new();

    values
        .iter()
        .map(|value| {
            let key = (!value.is_null()).then(|| value.to_string());
            if seen.insert(key) {
                Value::Null
            } else {
                Value::Int(1)
            }
        })
        .collect()
}

/// Count the rows flagged in a `duplicate_<column>` column
pub fn count_flagged(table: &Table, column: &str) -> usize {
    table
        .column(&flag_column(column))
        .map(|values| values.iter().filter(|v| **v == &Value::Int(1)).count())
        .unwrap_or(0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn leads(phones: &[&str], addresses: &[&str]) -> Table {
        let rows: Vec<Vec<&str>> = phones
            .iter()
            .zip(addresses)
            .map(|(p, a)| vec![*p, *a])
            .collect();
        let row_refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
        Table::from_strings(&["phone", "address1"], &row_refs)
    }

    #[test]
    fn test_first_occurrence_not_flagged() {
        // value repeats at rows 2, 5 and 9 (1-indexed)
        let phones = [
            "111", "555-1234", "222", "333", "555-1234", "444", "666", "777", "555-1234",
        ];
        let addresses = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];

        let table = flag_duplicates(leads(&phones, &addresses)).unwrap();

        let flagged: Vec<usize> = (0..table.len())
            .filter(|i| table.get(*i, "duplicate_phone") == Some(&Value::Int(1)))
            .collect();
        assert_eq!(flagged, vec![4, 8]);
        assert_eq!(table.get(1, "duplicate_phone"), Some(&Value::Null));
        assert_eq!(count_flagged(&table, "address1"), 0);
    }

    #[test]
    fn test_phone_whitespace_trimmed() {
        let table = flag_duplicates(leads(&["555-1234", " 555-1234 "], &["x", "y"])).unwrap();

        assert_eq!(table.get(1, "phone"), Some(&Value::text("555-1234")));
        assert_eq!(table.get(1, "duplicate_phone"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_columns_flagged_independently() {
        let table = flag_duplicates(leads(
            &["1", "2", "1"],
            &["12 Elm St", "12 Elm St", "9 Oak Ave"],
        ))
        .unwrap();

        assert_eq!(table.get(1, "duplicate_address1"), Some(&Value::Int(1)));
        assert_eq!(table.get(1, "duplicate_phone"), Some(&Value::Null));
        assert_eq!(table.get(2, "duplicate_phone"), Some(&Value::Int(1)));
        assert_eq!(table.get(2, "duplicate_address1"), Some(&Value::Null));
    }

    #[test]
    fn test_repeated_nulls_flagged() {
        let table = flag_duplicates(leads(&["", "", "1", "2"], &["", "a", "b", ""])).unwrap();

        assert_eq!(table.get(0, "duplicate_phone"), Some(&Value::Null));
        assert_eq!(table.get(1, "duplicate_phone"), Some(&Value::Int(1)));
        assert_eq!(table.get(3, "duplicate_address1"), Some(&Value::Int(1)));
        assert_eq!(count_flagged(&table, "phone"), 1);
        assert_eq!(count_flagged(&table, "address1"), 1);
    }

    #[test]
    fn test_single_null_not_flagged() {
        let table = flag_duplicates(leads(&["", "1"], &["a", ""])).unwrap();

        assert_eq!(count_flagged(&table, "phone"), 0);
        assert_eq!(count_flagged(&table, "address1"), 0);
    }

    #[test]
    fn test_missing_phone_column() {
        let table = Table::from_strings(&["address1"], &[&["a"]]);
        let err = flag_duplicates(table).unwrap_err();

        assert!(matches!(err, PipelineError::MissingColumn { ref column } if column == "phone"));
    }
}
