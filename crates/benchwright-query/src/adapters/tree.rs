use std::path::Path;

use benchwright_core::{format_f64, stringify_json};
use serde_json::Value;

use crate::adapters::text::read_file;
use crate::errors::QueryError;
use crate::filter::value_as_f64;
use crate::path::{expand, navigate};

/// JSON and YAML share one adapter: YAML documents deserialize into
/// `serde_json::Value`, so the navigator and filter engine see a single
/// structured model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Json,
    Yaml,
}

fn load(path: &Path, format: TreeFormat) -> Result<Value, QueryError> {
    let contents = read_file(path)?;
    match format {
        TreeFormat::Json => Ok(serde_json::from_str(&contents)?),
        TreeFormat::Yaml => Ok(serde_yaml::from_str(&contents)?),
    }
}

/// `json_value`/`yaml_value` (and the `*_path` aliases): strict navigation
/// to a single value.
pub fn value(path: &Path, format: TreeFormat, key_path: &str) -> Result<String, QueryError> {
    let root = load(path, format)?;
    let found = navigate(&root, key_path)?;
    Ok(stringify_json(found))
}

/// `json_count`/`yaml_count`: array length or object key count.
pub fn count(path: &Path, format: TreeFormat, key_path: Option<&str>) -> Result<String, QueryError> {
    let root = load(path, format)?;
    let target = match key_path {
        Some(key_path) => navigate(&root, key_path)?,
        None => &root,
    };
    match target {
        Value::Array(items) => Ok(items.len().to_string()),
        Value::Object(map) => Ok(map.len().to_string()),
        other => Err(QueryError::NotFound(format!(
            "'{}' is not countable (found {})",
            key_path.unwrap_or("$"),
            json_type(other)
        ))),
    }
}

/// `json_keys`/`yaml_keys`: comma-joined object keys.
pub fn keys(path: &Path, format: TreeFormat, key_path: Option<&str>) -> Result<String, QueryError> {
    let root = load(path, format)?;
    let target = match key_path {
        Some(key_path) => navigate(&root, key_path)?,
        None => &root,
    };
    match target {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            Ok(keys.join(","))
        }
        other => Err(QueryError::NotFound(format!(
            "'{}' is not an object (found {})",
            key_path.unwrap_or("$"),
            json_type(other)
        ))),
    }
}

/// Numeric/collect aggregation over an expanded wildcard path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeAggregate {
    Sum,
    Avg,
    Max,
    Min,
    Collect,
}

/// `json_sum|avg|max|min|collect` and their YAML twins.
///
/// Non-numeric candidates are dropped; an empty candidate set yields `0`
/// for every numeric op (collect yields an empty string).
pub fn aggregate(
    path: &Path,
    format: TreeFormat,
    wildcard_path: &str,
    op: TreeAggregate,
) -> Result<String, QueryError> {
    let root = load(path, format)?;
    let matches = expand(&root, wildcard_path)?;

    if op == TreeAggregate::Collect {
        let rendered: Vec<String> = matches.iter().map(|value| stringify_json(value)).collect();
        return Ok(rendered.join(","));
    }

    let values: Vec<f64> = matches.iter().filter_map(|value| value_as_f64(value)).collect();
    let result = if values.is_empty() {
        0.0
    } else {
        match op {
            TreeAggregate::Sum => values.iter().sum(),
            TreeAggregate::Avg => values.iter().sum::<f64>() / values.len() as f64,
            TreeAggregate::Max => values.iter().copied().fold(f64::MIN, f64::max),
            TreeAggregate::Min => values.iter().copied().fold(f64::MAX, f64::min),
            TreeAggregate::Collect => 0.0,
        }
    };
    Ok(format_f64(result))
}

/// `json_count_where`/`yaml_count_where`: size of the filtered match set.
pub fn count_where(
    path: &Path,
    format: TreeFormat,
    filter_path: &str,
) -> Result<String, QueryError> {
    let root = load(path, format)?;
    let matches = expand(&root, filter_path)?;
    Ok(matches.len().to_string())
}

/// `json_filter`/`yaml_filter`: the filtered matches themselves,
/// comma-joined.
pub fn filter(path: &Path, format: TreeFormat, filter_path: &str) -> Result<String, QueryError> {
    let root = load(path, format)?;
    let matches = expand(&root, filter_path)?;
    let rendered: Vec<String> = matches.iter().map(|value| stringify_json(value)).collect();
    Ok(rendered.join(","))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const JSON_FIXTURE: &str = r#"{
        "users": [
            {"name": "Alice", "age": 34, "score": "92.5"},
            {"name": "Bob", "age": 28, "score": "n/a"},
            {"name": "Cara", "age": 41, "score": "78"}
        ],
        "meta": {"version": 3, "released": true}
    }"#;

    const YAML_FIXTURE: &str =
        "users:\n  - name: Alice\n    age: 34\n  - name: Bob\n    age: 28\nmeta:\n  version: 3\n";

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bw_tree_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn value_navigates_and_stringifies_bare() {
        let path = write_fixture("value.json", JSON_FIXTURE);
        assert_eq!(
            value(&path, TreeFormat::Json, "$.users[0].name").expect("value"),
            "Alice"
        );
        assert_eq!(
            value(&path, TreeFormat::Json, "$.meta.released").expect("value"),
            "true"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn count_handles_arrays_objects_and_scalars() {
        let path = write_fixture("count.json", JSON_FIXTURE);
        assert_eq!(count(&path, TreeFormat::Json, Some("$.users")).expect("count"), "3");
        assert_eq!(count(&path, TreeFormat::Json, Some("$.meta")).expect("count"), "2");
        assert_eq!(count(&path, TreeFormat::Json, None).expect("count"), "2");
        assert!(count(&path, TreeFormat::Json, Some("$.meta.version")).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn keys_are_comma_joined() {
        let path = write_fixture("keys.json", JSON_FIXTURE);
        assert_eq!(
            keys(&path, TreeFormat::Json, Some("$.meta")).expect("keys"),
            "version,released"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn aggregation_skips_non_numeric_candidates() {
        let path = write_fixture("agg.json", JSON_FIXTURE);
        assert_eq!(
            aggregate(&path, TreeFormat::Json, "$.users[*].age", TreeAggregate::Sum)
                .expect("sum"),
            "103"
        );
        // "n/a" is dropped; string numbers still participate.
        assert_eq!(
            aggregate(&path, TreeFormat::Json, "$.users[*].score", TreeAggregate::Sum)
                .expect("sum"),
            "170.5"
        );
        assert_eq!(
            aggregate(&path, TreeFormat::Json, "$.users[*].age", TreeAggregate::Max)
                .expect("max"),
            "41"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_expansion_aggregates_to_zero() {
        let path = write_fixture("empty.json", JSON_FIXTURE);
        assert_eq!(
            aggregate(&path, TreeFormat::Json, "$.users[*].salary", TreeAggregate::Sum)
                .expect("sum"),
            "0"
        );
        assert_eq!(
            aggregate(
                &path,
                TreeFormat::Json,
                "$.users[*].salary",
                TreeAggregate::Collect
            )
            .expect("collect"),
            ""
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn count_where_counts_filter_matches() {
        let path = write_fixture("where.json", JSON_FIXTURE);
        assert_eq!(
            count_where(&path, TreeFormat::Json, "$.users[?age>30]").expect("count"),
            "2"
        );
        assert_eq!(
            count_where(&path, TreeFormat::Json, "$.users[?age>100]").expect("count"),
            "0"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn filter_collects_matching_values() {
        let path = write_fixture("filter.json", JSON_FIXTURE);
        assert_eq!(
            filter(&path, TreeFormat::Json, "$.users[?age>30].name").expect("filter"),
            "Alice,Cara"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn yaml_rides_the_same_navigator() {
        let path = write_fixture("ride.yaml", YAML_FIXTURE);
        assert_eq!(
            value(&path, TreeFormat::Yaml, "$.users[1].name").expect("value"),
            "Bob"
        );
        assert_eq!(
            aggregate(&path, TreeFormat::Yaml, "$.users[*].age", TreeAggregate::Sum)
                .expect("sum"),
            "62"
        );
        let _ = std::fs::remove_file(&path);
    }
}
