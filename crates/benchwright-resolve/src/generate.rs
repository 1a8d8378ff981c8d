use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::errors::ResolveError;
use crate::pools;

/// Numeric generation kind for `{{number<N>:min:max[:type]}}` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Decimal,
    Currency,
    Percentage,
    /// Round a uniform draw to the nearest multiple of the increment.
    Round(i64),
}

impl NumberKind {
    /// Parse a type suffix. Absent suffixes mean `integer`; anything not in
    /// the closed set is an error (the resolver is strict about values
    /// inside a recognized grammar).
    pub fn parse(spec: &str) -> Result<Self, ResolveError> {
        match spec {
            "integer" => Ok(Self::Integer),
            "decimal" => Ok(Self::Decimal),
            "currency" => Ok(Self::Currency),
            "percentage" => Ok(Self::Percentage),
            _ => {
                if let Some(suffix) = spec.strip_prefix("round_") {
                    let increment = match suffix {
                        "tens" => 10,
                        "hundreds" => 100,
                        "thousands" => 1_000,
                        "millions" => 1_000_000,
                        _ => suffix
                            .parse::<i64>()
                            .map_err(|_| ResolveError::UnknownNumberKind(spec.to_string()))?,
                    };
                    if increment <= 0 {
                        return Err(ResolveError::InvalidIncrement(spec.to_string()));
                    }
                    Ok(Self::Round(increment))
                } else {
                    Err(ResolveError::UnknownNumberKind(spec.to_string()))
                }
            }
        }
    }
}

/// A generated number together with its rendered form.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberValue {
    pub text: String,
    pub value: f64,
}

/// Draw a number uniformly from `[min, max]` and render it per kind.
pub fn random_number(
    min: f64,
    max: f64,
    kind: NumberKind,
    rng: &mut impl Rng,
) -> Result<NumberValue, ResolveError> {
    if min > max {
        return Err(ResolveError::InvalidRange { min, max });
    }

    let value = match kind {
        NumberKind::Integer => {
            let drawn = rng.random_range(min as i64..=max as i64);
            NumberValue {
                text: drawn.to_string(),
                value: drawn as f64,
            }
        }
        NumberKind::Decimal => {
            let drawn = round_to_places(rng.random_range(min..=max), 2);
            NumberValue {
                text: format!("{drawn:.2}"),
                value: drawn,
            }
        }
        NumberKind::Currency => {
            let drawn = round_to_places(rng.random_range(min..=max), 2);
            NumberValue {
                text: format!("{drawn:.2}"),
                value: drawn,
            }
        }
        NumberKind::Percentage => {
            let drawn = round_to_places(rng.random_range(min..=max), 1);
            NumberValue {
                text: format!("{drawn:.1}"),
                value: drawn,
            }
        }
        NumberKind::Round(increment) => {
            let drawn = rng.random_range(min..=max);
            let rounded = (drawn / increment as f64).round() as i64 * increment;
            NumberValue {
                text: rounded.to_string(),
                value: rounded as f64,
            }
        }
    };

    Ok(value)
}

/// Generate a value for a semantic kind.
///
/// Unknown kinds fall back to the generic word pool; this never errors, so
/// template authors can introduce new vocabularies without breaking runs.
pub fn semantic_value(kind: &str, rng: &mut impl Rng) -> String {
    match kind {
        "person_name" => {
            let first = pick(pools::FIRST_NAMES, rng);
            let last = pick(pools::LAST_NAMES, rng);
            format!("{first} {last}")
        }
        "first_name" => pick(pools::FIRST_NAMES, rng).to_string(),
        "last_name" => pick(pools::LAST_NAMES, rng).to_string(),
        "city" => pick(pools::CITIES, rng).to_string(),
        "department" => pick(pools::DEPARTMENTS, rng).to_string(),
        "status" => pick(pools::STATUSES, rng).to_string(),
        "company" => pick(pools::COMPANIES, rng).to_string(),
        "product" => pick(pools::PRODUCTS, rng).to_string(),
        "color" => pick(pools::COLORS, rng).to_string(),
        "email" => {
            let name = pick(pools::FIRST_NAMES, rng).to_lowercase();
            let number = rng.random_range(1..=999);
            format!("{name}{number}@example.com")
        }
        "date" => {
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
            let offset = rng.random_range(0..=364);
            (base + Duration::days(offset)).format("%Y-%m-%d").to_string()
        }
        _ => pick(pools::WORDS, rng).to_string(),
    }
}

fn pick<'a>(values: &'a [&'a str], rng: &mut impl Rng) -> &'a str {
    if values.is_empty() {
        return "";
    }
    values[rng.random_range(0..values.len())]
}

fn round_to_places(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}
