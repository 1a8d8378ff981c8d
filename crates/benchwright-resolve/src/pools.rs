use std::collections::BTreeMap;

/// Catalog of value pools available to a resolution session.
///
/// Built-in pools cover the common semantic vocabularies; test definitions
/// may register custom entity lists, which shadow built-ins of the same
/// name. Lookup is by pool name.
#[derive(Debug, Clone)]
pub struct PoolCatalog {
    pools: BTreeMap<String, Vec<String>>,
}

impl PoolCatalog {
    pub fn new() -> Self {
        let mut pools = BTreeMap::new();
        for (name, values) in BUILTIN_POOLS {
            pools.insert(
                (*name).to_string(),
                values.iter().map(|value| (*value).to_string()).collect(),
            );
        }
        Self { pools }
    }

    /// Register a custom entity pool, replacing any pool of the same name.
    pub fn register(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.pools.insert(name.into(), values);
    }

    pub fn pool(&self, name: &str) -> Option<&[String]> {
        self.pools.get(name).map(Vec::as_slice)
    }

    pub fn known_pools(&self) -> String {
        let names: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        names.join(", ")
    }
}

impl Default for PoolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

const BUILTIN_POOLS: &[(&str, &[&str])] = &[
    ("default", DEFAULT_ITEMS),
    ("first_names", FIRST_NAMES),
    ("last_names", LAST_NAMES),
    ("cities", CITIES),
    ("departments", DEPARTMENTS),
    ("statuses", STATUSES),
    ("companies", COMPANIES),
    ("products", PRODUCTS),
    ("colors", COLORS),
    ("words", WORDS),
];

pub(crate) const DEFAULT_ITEMS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
];

pub(crate) const FIRST_NAMES: &[&str] = &[
    "Alice", "Brian", "Carmen", "Derek", "Elena", "Frank", "Grace", "Henry", "Irene", "James",
    "Karen", "Leo", "Maria", "Nathan", "Olivia", "Peter", "Quinn", "Rachel", "Samuel", "Teresa",
];

pub(crate) const LAST_NAMES: &[&str] = &[
    "Anderson", "Baker", "Carter", "Dixon", "Evans", "Foster", "Graham", "Hughes", "Ingram",
    "Jensen", "Keller", "Lawson", "Mercer", "Nolan", "Osborne", "Parker", "Quincy", "Reyes",
    "Sutton", "Turner",
];

pub(crate) const CITIES: &[&str] = &[
    "Austin",
    "Boston",
    "Chicago",
    "Denver",
    "El Paso",
    "Fresno",
    "Glendale",
    "Houston",
    "Irvine",
    "Jackson",
    "Knoxville",
    "Lincoln",
    "Madison",
    "Nashville",
    "Oakland",
    "Portland",
];

pub(crate) const DEPARTMENTS: &[&str] = &[
    "Engineering",
    "Marketing",
    "Sales",
    "Finance",
    "Operations",
    "Legal",
    "Support",
    "Research",
];

pub(crate) const STATUSES: &[&str] = &[
    "active", "pending", "completed", "cancelled", "archived", "failed",
];

pub(crate) const COMPANIES: &[&str] = &[
    "Acme Corp",
    "Globex",
    "Initech",
    "Umbrella Systems",
    "Stark Industries",
    "Wayne Enterprises",
    "Hooli",
    "Vandelay Industries",
];

pub(crate) const PRODUCTS: &[&str] = &[
    "Widget", "Gadget", "Gizmo", "Doohickey", "Contraption", "Apparatus", "Device", "Instrument",
];

pub(crate) const COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "blue", "indigo", "violet", "silver",
];

pub(crate) const WORDS: &[&str] = &[
    "river", "mountain", "forest", "harbor", "meadow", "valley", "summit", "prairie", "lagoon",
    "canyon", "glacier", "desert", "island", "plateau", "estuary", "tundra",
];
