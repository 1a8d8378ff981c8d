use serde_json::Value;

use crate::errors::QueryError;

/// Comparison operators accepted inside `[?field OP value]` predicates and
/// the CSV `_where` functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Ge,
    Le,
    Ne,
    Eq,
    Gt,
    Lt,
    Contains,
    StartsWith,
    EndsWith,
}

/// Longer operators first so `>=` never tokenizes as `>`.
const OPERATORS: &[(&str, FilterOp)] = &[
    (">=", FilterOp::Ge),
    ("<=", FilterOp::Le),
    ("!=", FilterOp::Ne),
    ("==", FilterOp::Eq),
    (">", FilterOp::Gt),
    ("<", FilterOp::Lt),
    ("contains", FilterOp::Contains),
    ("startswith", FilterOp::StartsWith),
    ("endswith", FilterOp::EndsWith),
];

impl FilterOp {
    pub fn parse(token: &str) -> Result<Self, QueryError> {
        OPERATORS
            .iter()
            .find(|(text, _)| *text == token)
            .map(|(_, op)| *op)
            .ok_or_else(|| {
                QueryError::InvalidArgument(format!("unknown filter operator '{token}'"))
            })
    }
}

/// One parsed filter predicate: `field OP literal`.
///
/// Comparison is numeric-first with a string fallback; a missing field or a
/// non-record item evaluates to false, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub field: String,
    pub op: FilterOp,
    pub literal: String,
}

impl FilterPredicate {
    /// Parse the body of a `[?...]` predicate, e.g. `price>100` or
    /// `name contains 'smith'`.
    pub fn parse(expr: &str) -> Result<Self, QueryError> {
        for (text, op) in OPERATORS {
            if let Some(at) = expr.find(text) {
                let field = expr[..at].trim().to_string();
                let literal = strip_quotes(expr[at + text.len()..].trim()).to_string();
                if field.is_empty() {
                    return Err(QueryError::InvalidArgument(format!(
                        "filter predicate '{expr}' has no field"
                    )));
                }
                return Ok(Self { field, op: *op, literal });
            }
        }
        Err(QueryError::InvalidArgument(format!(
            "filter predicate '{expr}' has no recognized operator"
        )))
    }

    pub fn from_parts(field: &str, op: &str, literal: &str) -> Result<Self, QueryError> {
        Ok(Self {
            field: field.to_string(),
            op: FilterOp::parse(op)?,
            literal: strip_quotes(literal).to_string(),
        })
    }

    /// Evaluate against a record item (JSON/YAML object).
    pub fn matches(&self, item: &Value) -> bool {
        let Value::Object(map) = item else {
            return false;
        };
        let Some(field_value) = map.get(&self.field) else {
            return false;
        };
        self.compare_value(field_value)
    }

    /// Evaluate against an already-extracted field value.
    pub fn compare_value(&self, value: &Value) -> bool {
        match value {
            Value::String(text) => self.compare_text(text),
            other => self.compare_text(&stringify_scalar(other)),
        }
    }

    /// Evaluate against raw cell text (CSV rows).
    pub fn compare_text(&self, actual: &str) -> bool {
        match self.op {
            FilterOp::Contains => actual.contains(&self.literal),
            FilterOp::StartsWith => actual.starts_with(&self.literal),
            FilterOp::EndsWith => actual.ends_with(&self.literal),
            _ => {
                if let (Ok(left), Ok(right)) =
                    (actual.trim().parse::<f64>(), self.literal.parse::<f64>())
                {
                    self.compare_f64(left, right)
                } else {
                    self.compare_str(actual)
                }
            }
        }
    }

    fn compare_f64(&self, left: f64, right: f64) -> bool {
        match self.op {
            FilterOp::Gt => left > right,
            FilterOp::Ge => left >= right,
            FilterOp::Lt => left < right,
            FilterOp::Le => left <= right,
            FilterOp::Eq => left == right,
            FilterOp::Ne => left != right,
            FilterOp::Contains | FilterOp::StartsWith | FilterOp::EndsWith => false,
        }
    }

    fn compare_str(&self, left: &str) -> bool {
        let right = self.literal.as_str();
        match self.op {
            FilterOp::Gt => left > right,
            FilterOp::Ge => left >= right,
            FilterOp::Lt => left < right,
            FilterOp::Le => left <= right,
            FilterOp::Eq => left == right,
            FilterOp::Ne => left != right,
            FilterOp::Contains | FilterOp::StartsWith | FilterOp::EndsWith => false,
        }
    }
}

/// Float view of a JSON scalar, for the uniform numeric coercion policy:
/// non-parseable candidates are silently dropped by callers.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn stringify_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2
        && ((value.starts_with('\'') && value.ends_with('\''))
            || (value.starts_with('"') && value.ends_with('"')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
