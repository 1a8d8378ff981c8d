use serde_json::Value;

use crate::errors::QueryError;
use crate::filter::FilterPredicate;

/// One dot-path segment: an optional key followed by at most one bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub key: Option<String>,
    pub op: SegmentOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentOp {
    /// Plain key access.
    None,
    /// `key[n]`, 0-indexed.
    Index(usize),
    /// `key[*]`.
    Wildcard,
    /// `key[?field OP value]`.
    Filter(FilterPredicate),
}

/// Parse a dot/bracket key path, e.g. `$.users[0].name` or
/// `items[?price>100].name`.
///
/// Splitting is bracket-aware so filter literals may contain dots; the
/// leading `$`/`$.` is optional.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, QueryError> {
    let trimmed = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);

    let mut segments = Vec::new();
    for raw in split_segments(trimmed) {
        if raw.is_empty() {
            continue;
        }
        segments.push(parse_segment(&raw, path)?);
    }
    Ok(segments)
}

/// Strict navigation for single-value lookups: a missing key or an
/// out-of-range index is an error naming the failing segment.
pub fn navigate<'a>(root: &'a Value, path: &str) -> Result<&'a Value, QueryError> {
    let mut current = root;
    for segment in parse_path(path)? {
        if let Some(key) = &segment.key {
            current = lookup_key(current, key, path)?;
        }
        match &segment.op {
            SegmentOp::None => {}
            SegmentOp::Index(index) => {
                let items = current.as_array().ok_or_else(|| {
                    QueryError::NotFound(format!(
                        "segment '{}[{index}]' in '{path}' is not an array",
                        segment.key.as_deref().unwrap_or("")
                    ))
                })?;
                current = items.get(*index).ok_or_else(|| {
                    QueryError::NotFound(format!(
                        "index {index} out of range ({} element(s)) at segment '{}' in '{path}'",
                        items.len(),
                        segment.key.as_deref().unwrap_or("")
                    ))
                })?;
            }
            SegmentOp::Wildcard | SegmentOp::Filter(_) => {
                return Err(QueryError::InvalidArgument(format!(
                    "wildcards and filters are not allowed in value paths ('{path}')"
                )));
            }
        }
    }
    Ok(current)
}

/// Wildcard expansion for aggregate paths.
///
/// A branch set starts at the root; `key[*]` fans a list out into one
/// branch per element, a non-list at a wildcard is treated as a
/// one-element list, filters narrow the set, and missing keys drop the
/// branch instead of erroring so aggregation over sparse data degrades to
/// fewer matches.
pub fn expand<'a>(root: &'a Value, path: &str) -> Result<Vec<&'a Value>, QueryError> {
    let segments = parse_path(path)?;
    let mut current = vec![root];

    for segment in &segments {
        let mut next = Vec::new();
        for branch in current {
            let branch = match &segment.key {
                Some(key) => match branch.get(key) {
                    Some(value) => value,
                    None => continue,
                },
                None => branch,
            };
            match &segment.op {
                SegmentOp::None => next.push(branch),
                SegmentOp::Index(index) => {
                    if let Some(value) = branch.get(*index) {
                        next.push(value);
                    }
                }
                SegmentOp::Wildcard => match branch {
                    Value::Array(items) => next.extend(items.iter()),
                    other => next.push(other),
                },
                SegmentOp::Filter(predicate) => match branch {
                    Value::Array(items) => {
                        next.extend(items.iter().filter(|item| predicate.matches(item)));
                    }
                    other => {
                        if predicate.matches(other) {
                            next.push(other);
                        }
                    }
                },
            }
        }
        current = next;
    }

    Ok(current)
}

fn lookup_key<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value, QueryError> {
    match value {
        Value::Object(map) => map.get(key).ok_or_else(|| {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            QueryError::NotFound(format!(
                "key '{key}' not found in '{path}' (available keys: {})",
                keys.join(", ")
            ))
        }),
        other => Err(QueryError::NotFound(format!(
            "segment '{key}' in '{path}' is not an object (found {})",
            type_name(other)
        ))),
    }
}

fn parse_segment(raw: &str, path: &str) -> Result<PathSegment, QueryError> {
    let Some(open) = raw.find('[') else {
        return Ok(PathSegment {
            key: Some(raw.to_string()),
            op: SegmentOp::None,
        });
    };

    if !raw.ends_with(']') {
        return Err(QueryError::InvalidArgument(format!(
            "unclosed bracket in segment '{raw}' of '{path}'"
        )));
    }

    let key = if open == 0 {
        None
    } else {
        Some(raw[..open].to_string())
    };
    let inner = &raw[open + 1..raw.len() - 1];

    let op = if inner == "*" {
        SegmentOp::Wildcard
    } else if let Some(expr) = inner.strip_prefix('?') {
        SegmentOp::Filter(FilterPredicate::parse(expr)?)
    } else {
        let index = inner.trim().parse::<usize>().map_err(|_| {
            QueryError::InvalidArgument(format!(
                "bracket '[{inner}]' in '{path}' is not an index, wildcard, or filter"
            ))
        })?;
        SegmentOp::Index(index)
    };

    Ok(PathSegment {
        key,
        op,
    })
}

/// Split on `.` outside brackets, so `items[?name=='a.b'].id` stays intact.
fn split_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut depth = 0_i32;
    let mut current = String::new();
    for ch in path.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth -= 1;
                current.push(ch);
            }
            '.' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    segments.push(current);
    segments
}

fn type_name(value: &Value) -> &'static str {
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
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "users": [
                {"name": "Alice", "age": 34, "tags": ["admin", "ops"]},
                {"name": "Bob", "age": 28, "tags": ["dev"]}
            ],
            "meta": {"count": 2}
        })
    }

    #[test]
    fn navigates_keys_and_indexes() {
        let root = fixture();
        let value = navigate(&root, "$.users[0].name").expect("navigate");
        assert_eq!(value, &json!("Alice"));
        let value = navigate(&root, "meta.count").expect("navigate");
        assert_eq!(value, &json!(2));
    }

    #[test]
    fn missing_key_names_the_segment_and_alternatives() {
        let root = fixture();
        let err = navigate(&root, "$.users[0].email").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("email"));
        assert!(message.contains("name"), "should list available keys: {message}");
    }

    #[test]
    fn out_of_range_index_reports_length() {
        let root = fixture();
        let err = navigate(&root, "$.users[5].name").unwrap_err();
        let message = err.to_string();
        assert!(message.contains('5'));
        assert!(message.contains("2 element"));
    }

    #[test]
    fn wildcard_expands_each_element() {
        let root = fixture();
        let values = expand(&root, "$.users[*].name").expect("expand");
        assert_eq!(values, vec![&json!("Alice"), &json!("Bob")]);
    }

    #[test]
    fn nested_wildcards_fan_out() {
        let root = fixture();
        let values = expand(&root, "$.users[*].tags[*]").expect("expand");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn non_list_at_wildcard_degrades_to_single_branch() {
        let root = fixture();
        let values = expand(&root, "$.meta[*]").expect("expand");
        assert_eq!(values, vec![&json!({"count": 2})]);
    }

    #[test]
    fn filter_segment_narrows_the_set() {
        let root = fixture();
        let values = expand(&root, "$.users[?age>30].name").expect("expand");
        assert_eq!(values, vec![&json!("Alice")]);
    }

    #[test]
    fn missing_keys_drop_branches_in_expansion() {
        let root = fixture();
        let values = expand(&root, "$.users[*].email").expect("expand");
        assert!(values.is_empty());
    }

    #[test]
    fn filter_literals_may_contain_dots() {
        let root = json!({"items": [{"price": 9.5}, {"price": 20.0}]});
        let values = expand(&root, "$.items[?price>10.25]").expect("expand");
        assert_eq!(values.len(), 1);
    }
}
