//! Normalization of raw street-level crime payloads into a [`CrimeTable`].
//!
//! Nested objects are flattened into dotted keys (`location.street.name`),
//! renamed to the canonical column names, and restricted to
//! [`CrimeColumn::ALL`]. The resulting schema is exactly the set of
//! canonical columns that at least one record carried.

use std::collections::{BTreeMap, BTreeSet};

use crime_grid_crime_models::{CrimeColumn, CrimeRecord, CrimeTable, parse_coordinate};
use serde_json::{Map, Value};

/// Maps a flattened source key to its canonical column name. Keys without
/// a mapping keep their own name.
fn rename(key: &str) -> &str {
    match key {
        "category" => "crime_category",
        "location.latitude" => "latitude",
        "location.longitude" => "longitude",
        "location.street.id" => "street_id",
        "location.street.name" => "street_name",
        "outcome_status.category" => "outcome_category",
        "outcome_status.date" => "outcome_date",
        other => other,
    }
}

/// Normalizes a decoded crimes response.
///
/// `null`, empty arrays, empty objects and scalars all mean "no data" and
/// yield an empty table with no columns. A bare object is treated as a
/// single record.
#[must_use]
pub fn normalize_crimes(data: &Value) -> CrimeTable {
    let objects: Vec<&Map<String, Value>> = match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let obj = item.as_object();
                if obj.is_none() {
                    log::warn!("Skipping non-object crime record at index {idx}: {item}");
                }
                obj
            })
            .collect(),
        Value::Object(obj) if !obj.is_empty() => vec![obj],
        _ => Vec::new(),
    };

    if objects.is_empty() {
        return CrimeTable::default();
    }

    let mut present = BTreeSet::new();
    let mut records = Vec::with_capacity(objects.len());

    for obj in objects {
        let mut flat = Vec::new();
        flatten_into(&mut flat, None, obj);

        let renamed: BTreeMap<&str, &Value> =
            flat.iter().map(|(key, value)| (rename(key), *value)).collect();

        let mut record = CrimeRecord::default();
        for &column in CrimeColumn::ALL {
            let name: &str = column.as_ref();
            if let Some(value) = renamed.get(name) {
                present.insert(column);
                assign(&mut record, column, value);
            }
        }
        records.push(record);
    }

    CrimeTable::new(present, records)
}

/// Flattens nested objects into `(dotted.key, value)` pairs. Arrays and
/// empty objects are kept as leaf values.
fn flatten_into<'a>(
    out: &mut Vec<(String, &'a Value)>,
    prefix: Option<&str>,
    obj: &'a Map<String, Value>,
) {
    for (key, value) in obj {
        let path = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_into(out, Some(&path), nested);
            }
            _ => out.push((path, value)),
        }
    }
}

fn assign(record: &mut CrimeRecord, column: CrimeColumn, value: &Value) {
    match column {
        CrimeColumn::Latitude => record.latitude = coerce_numeric(value),
        CrimeColumn::Longitude => record.longitude = coerce_numeric(value),
        CrimeColumn::CrimeCategory => record.crime_category = to_text(value),
        CrimeColumn::PersistentId => record.persistent_id = to_text(value),
        CrimeColumn::Month => record.month = to_text(value),
        CrimeColumn::StreetId => record.street_id = to_text(value),
        CrimeColumn::StreetName => record.street_name = to_text(value),
        CrimeColumn::LocationType => record.location_type = to_text(value),
        CrimeColumn::OutcomeCategory => record.outcome_category = to_text(value),
        CrimeColumn::OutcomeDate => record.outcome_date = to_text(value),
    }
}

/// Coerces a JSON value to a coordinate. Numbers and numeric strings
/// convert; anything else (including non-finite values) is `None`.
fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_coordinate(s),
        _ => None,
    }
}

fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_payload() -> Value {
        json!([
            {
                "category": "anti-social-behaviour",
                "location_type": "Force",
                "location": {
                    "latitude": "52.640961",
                    "street": { "id": 884_343, "name": "On or near Wharf Street North" },
                    "longitude": "-1.126371"
                },
                "context": "",
                "outcome_status": null,
                "persistent_id": "",
                "id": 54_164_419,
                "location_subtype": "",
                "month": "2017-01"
            },
            {
                "category": "burglary",
                "location_type": "Force",
                "location": {
                    "latitude": "52.633888",
                    "street": { "id": 883_425, "name": "On or near Peacock Lane" },
                    "longitude": "-1.138924"
                },
                "context": "",
                "outcome_status": { "category": "Under investigation", "date": "2017-01" },
                "persistent_id": "7a1b7c9f0e",
                "id": 54_163_555,
                "location_subtype": "",
                "month": "2017-01"
            }
        ])
    }

    #[test]
    fn normalizes_full_payload() {
        let table = normalize_crimes(&sample_payload());

        assert_eq!(table.columns(), CrimeColumn::ALL);
        assert_eq!(table.len(), 2);

        let first = &table.records()[0];
        assert_eq!(first.crime_category.as_deref(), Some("anti-social-behaviour"));
        assert_eq!(first.persistent_id.as_deref(), Some(""));
        assert_eq!(first.month.as_deref(), Some("2017-01"));
        assert_eq!(first.latitude, Some(52.640_961));
        assert_eq!(first.longitude, Some(-1.126_371));
        assert_eq!(first.street_id.as_deref(), Some("884343"));
        assert_eq!(
            first.street_name.as_deref(),
            Some("On or near Wharf Street North")
        );
        assert_eq!(first.location_type.as_deref(), Some("Force"));
        assert_eq!(first.outcome_category, None);
        assert_eq!(first.outcome_date, None);

        let second = &table.records()[1];
        assert_eq!(
            second.outcome_category.as_deref(),
            Some("Under investigation")
        );
        assert_eq!(second.outcome_date.as_deref(), Some("2017-01"));
    }

    #[test]
    fn empty_payloads_yield_empty_table() {
        for payload in [json!(null), json!([]), json!({}), json!(""), json!(0)] {
            let table = normalize_crimes(&payload);
            assert!(table.is_empty(), "{payload} produced rows");
            assert!(table.columns().is_empty(), "{payload} produced columns");
        }
    }

    #[test]
    fn keeps_only_columns_the_source_returned() {
        let table = normalize_crimes(&json!([
            { "category": "drugs", "month": "2024-02", "id": 1, "context": "" }
        ]));

        assert_eq!(
            table.columns(),
            &[CrimeColumn::CrimeCategory, CrimeColumn::Month]
        );
        assert!(!table.has_column(CrimeColumn::Latitude));
        assert_eq!(table.records()[0].latitude, None);
    }

    #[test]
    fn outcome_status_null_everywhere_drops_outcome_columns() {
        let table = normalize_crimes(&json!([
            { "category": "robbery", "outcome_status": null }
        ]));

        assert_eq!(table.columns(), &[CrimeColumn::CrimeCategory]);
    }

    #[test]
    fn coerces_coordinates_and_nulls_junk() {
        let table = normalize_crimes(&json!([
            { "location": { "latitude": 51.5, "longitude": "-0.12" } },
            { "location": { "latitude": "unknown", "longitude": null } },
            { "location": { "latitude": true, "longitude": "  -0.5 " } }
        ]));

        assert!(table.has_column(CrimeColumn::Latitude));
        assert!(table.has_column(CrimeColumn::Longitude));

        let coords: Vec<(Option<f64>, Option<f64>)> = table
            .records()
            .iter()
            .map(|r| (r.latitude, r.longitude))
            .collect();
        assert_eq!(
            coords,
            vec![
                (Some(51.5), Some(-0.12)),
                (None, None),
                (None, Some(-0.5)),
            ]
        );
    }

    #[test]
    fn single_object_is_one_record() {
        let table = normalize_crimes(&json!({ "category": "shoplifting" }));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.records()[0].crime_category.as_deref(),
            Some("shoplifting")
        );
    }

    #[test]
    fn skips_non_object_elements() {
        let table = normalize_crimes(&json!([42, { "category": "arson" }, "junk"]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].crime_category.as_deref(), Some("arson"));
    }

    #[test]
    fn flatten_builds_dotted_paths() {
        let value = json!({ "a": { "b": { "c": 1 }, "d": [] }, "e": {} });
        let mut flat = Vec::new();
        flatten_into(&mut flat, None, value.as_object().unwrap());

        let keys: Vec<&str> = flat.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a.b.c", "a.d", "e"]);
    }
}
