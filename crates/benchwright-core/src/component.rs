use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A named artifact produced by an external writer.
///
/// The outer tool materializes one file per component; templates refer to
/// those files through `TARGET_FILE` / `TARGET_FILE[name]` arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub target_path: PathBuf,
}

impl Component {
    pub fn new(name: impl Into<String>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            target_path: target_path.into(),
        }
    }
}

/// Ordered set of components for one test sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSet {
    components: Vec<Component>,
}

impl ComponentSet {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Resolve a `TARGET_FILE` reference to an artifact path.
    ///
    /// A bare `TARGET_FILE` resolves to the first component; a named
    /// reference must match a component exactly.
    pub fn resolve(&self, name: Option<&str>) -> Result<&Path, Error> {
        match name {
            None => self
                .components
                .first()
                .map(|component| component.target_path.as_path())
                .ok_or(Error::NoComponents),
            Some(name) => self
                .components
                .iter()
                .find(|component| component.name == name)
                .map(|component| component.target_path.as_path())
                .ok_or_else(|| Error::UnknownComponent {
                    name: name.to_string(),
                    known: self.known_names(),
                }),
        }
    }

    fn known_names(&self) -> String {
        let names: Vec<&str> = self
            .components
            .iter()
            .map(|component| component.name.as_str())
            .collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }
}
