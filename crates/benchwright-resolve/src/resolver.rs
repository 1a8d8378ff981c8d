use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regex::{Captures, Regex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::ResolveError;
use crate::generate::{NumberKind, random_number, semantic_value};
use crate::model::{Resolution, ResolvedVariable};
use crate::pools::PoolCatalog;

/// Options for a resolution session.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Seed for the session RNG; `None` draws one from the OS.
    pub seed: Option<u64>,
}

/// One resolution session: the scope of a single generated test sample.
///
/// The session owns the RNG and the variable cache. Resolving the same
/// token identity twice returns the memoized value, which is the contract
/// that keeps computed golden answers in agreement with data already
/// written to generated files.
#[derive(Debug)]
pub struct VariableResolver {
    session_id: Uuid,
    seed: u64,
    rng: ChaCha8Rng,
    cache: HashMap<String, ResolvedVariable>,
    pools: PoolCatalog,
}

impl VariableResolver {
    pub fn new(options: ResolverOptions) -> Self {
        let seed = options.seed.unwrap_or_else(rand::random);
        let session_id = Uuid::new_v4();
        info!(session_id = %session_id, seed, "resolution session started");
        Self {
            session_id,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            cache: HashMap::new(),
            pools: PoolCatalog::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(ResolverOptions { seed: Some(seed) })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Register a custom entity pool for `{{entity<N>:<pool>}}` tokens.
    pub fn register_pool(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.pools.register(name, values);
    }

    /// Start a new sample: drop every cached variable and reseed the RNG
    /// from the session seed, so a fixed seed reproduces byte-identical
    /// output across runs.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        debug!(session_id = %self.session_id, seed = self.seed, "session reset");
    }

    /// Every variable resolved so far in this session.
    pub fn session_variables(&self) -> BTreeMap<String, String> {
        self.cache
            .values()
            .map(|variable| (variable.token.clone(), variable.value.clone()))
            .collect()
    }

    /// Resolve every recognized placeholder in `text`.
    ///
    /// Four independent passes run in a fixed order (semantic, number,
    /// entity, legacy entity). Tokens that do not match a recognized
    /// grammar are left untouched; invalid values inside a recognized
    /// grammar (unknown number kind, unknown pool) abort with an error.
    pub fn resolve_all(&mut self, text: &str) -> Result<Resolution, ResolveError> {
        let mut touched = BTreeMap::new();

        let text = self.pass_semantic(text, &mut touched)?;
        let text = self.pass_number(&text, &mut touched)?;
        let text = self.pass_entity(&text, &mut touched)?;
        let text = self.pass_entity_legacy(&text, &mut touched)?;

        debug!(
            session_id = %self.session_id,
            variables = touched.len(),
            "template resolved"
        );

        Ok(Resolution {
            text,
            variables: touched,
        })
    }

    fn pass_semantic(
        &mut self,
        text: &str,
        touched: &mut BTreeMap<String, String>,
    ) -> Result<String, ResolveError> {
        substitute(text, semantic_re(), |caps| {
            let token = token_key(caps);
            let kind = caps[2].to_string();
            let variable = match self.cache.get(&token) {
                Some(variable) => variable.clone(),
                None => {
                    let value = semantic_value(&kind, &mut self.rng);
                    let variable = ResolvedVariable {
                        token: token.clone(),
                        value,
                        numeric: None,
                    };
                    self.cache.insert(token.clone(), variable.clone());
                    variable
                }
            };
            touched.insert(token, variable.value.clone());
            Ok(variable.value)
        })
    }

    fn pass_number(
        &mut self,
        text: &str,
        touched: &mut BTreeMap<String, String>,
    ) -> Result<String, ResolveError> {
        substitute(text, number_re(), |caps| {
            let token = token_key(caps);
            let variable = match self.cache.get(&token) {
                Some(variable) => variable.clone(),
                None => {
                    let min: f64 = caps[2].parse().unwrap_or(0.0);
                    let max: f64 = caps[3].parse().unwrap_or(0.0);
                    let kind = match caps.get(4) {
                        Some(spec) => NumberKind::parse(spec.as_str())?,
                        None => NumberKind::Integer,
                    };
                    let number = random_number(min, max, kind, &mut self.rng)?;
                    let variable = ResolvedVariable {
                        token: token.clone(),
                        value: number.text,
                        numeric: Some(number.value),
                    };
                    self.cache.insert(token.clone(), variable.clone());
                    variable
                }
            };
            touched.insert(token, variable.value.clone());
            Ok(variable.value)
        })
    }

    fn pass_entity(
        &mut self,
        text: &str,
        touched: &mut BTreeMap<String, String>,
    ) -> Result<String, ResolveError> {
        substitute(text, entity_re(), |caps| {
            let token = token_key(caps);
            let index: u64 = caps[1].parse().unwrap_or(0);
            let pool = caps[2].to_string();
            let value = self.entity_value(&token, index, &pool)?;
            touched.insert(token, value.clone());
            Ok(value)
        })
    }

    fn pass_entity_legacy(
        &mut self,
        text: &str,
        touched: &mut BTreeMap<String, String>,
    ) -> Result<String, ResolveError> {
        substitute(text, entity_legacy_re(), |caps| {
            let token = token_key(caps);
            let index: u64 = caps[1].parse().unwrap_or(0);
            let value = self.entity_value(&token, index, "default")?;
            touched.insert(token, value.clone());
            Ok(value)
        })
    }

    /// `entity<N>:<pool>` selects `pool[N mod len]`; no RNG draw involved,
    /// so entity references are stable even across sessions.
    fn entity_value(
        &mut self,
        token: &str,
        index: u64,
        pool_name: &str,
    ) -> Result<String, ResolveError> {
        if let Some(variable) = self.cache.get(token) {
            return Ok(variable.value.clone());
        }

        let pool = self
            .pools
            .pool(pool_name)
            .ok_or_else(|| ResolveError::UnknownPool {
                name: pool_name.to_string(),
                known: self.pools.known_pools(),
            })?;
        if pool.is_empty() {
            return Err(ResolveError::EmptyPool(pool_name.to_string()));
        }

        let value = pool[(index % pool.len() as u64) as usize].clone();
        self.cache.insert(
            token.to_string(),
            ResolvedVariable {
                token: token.to_string(),
                value: value.clone(),
                numeric: None,
            },
        );
        Ok(value)
    }
}

/// Cache key: the token exactly as written, without braces. Identity is the
/// full (kind, index, params) tuple, so `number1:10:20` and
/// `number1:10:20:integer` memoize independently.
fn token_key(caps: &Captures<'_>) -> String {
    let full = &caps[0];
    full.trim_start_matches("{{").trim_end_matches("}}").to_string()
}

/// Apply `repl` to every match of `re`, propagating the first error.
fn substitute<F>(text: &str, re: &Regex, mut repl: F) -> Result<String, ResolveError>
where
    F: FnMut(&Captures<'_>) -> Result<String, ResolveError>,
{
    let mut output = String::with_capacity(text.len());
    let mut last_end = 0;
    for caps in re.captures_iter(text) {
        let matched = match caps.get(0) {
            Some(matched) => matched,
            None => continue,
        };
        output.push_str(&text[last_end..matched.start()]);
        output.push_str(&repl(&caps)?);
        last_end = matched.end();
    }
    output.push_str(&text[last_end..]);
    Ok(output)
}

fn semantic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{semantic(\d+):([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("valid pattern")
    })
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{number(\d+):(-?\d+(?:\.\d+)?):(-?\d+(?:\.\d+)?)(?::([A-Za-z_][A-Za-z0-9_]*))?\}\}")
            .expect("valid pattern")
    })
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{entity(\d+):([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("valid pattern")
    })
}

fn entity_legacy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{entity(\d+)\}\}").expect("valid pattern"))
}
