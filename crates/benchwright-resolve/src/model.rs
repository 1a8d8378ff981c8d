use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A variable resolved within a session, keyed by token identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVariable {
    /// The token as written, without braces (e.g. `semantic1:city`).
    pub token: String,
    /// Rendered value substituted into the text.
    pub value: String,
    /// Typed numeric value for `number` tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<f64>,
}

/// Outcome of resolving one template text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// The text with every recognized token substituted.
    pub text: String,
    /// Token identity to rendered value, for every token this text touched.
    pub variables: BTreeMap<String, String>,
}
