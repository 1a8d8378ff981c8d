//! Generate-then-query agreement: the values a seeded session writes into
//! artifacts must be exactly the values the query phase reads back.

use std::path::PathBuf;

use benchwright_core::{Component, ComponentSet};
use benchwright_query::QueryEngine;
use benchwright_resolve::VariableResolver;

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        init_logs();
        let dir = std::env::temp_dir().join(format!("bw_e2e_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create fixture dir");
        Self { dir }
    }
}

fn init_logs() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// The content template an external CSV writer would receive, after
/// variable resolution, becomes the artifact; the answer template queries
/// the same cells back.
#[test]
fn csv_roundtrip_agrees_with_resolved_variables() {
    let fixture = Fixture::new();
    let mut resolver = VariableResolver::with_seed(42);

    let content = resolver
        .resolve_all(
            "name,amount\n{{semantic1:person_name}},{{number1:100:900}}\n\
             {{semantic2:person_name}},{{number2:100:900}}\n",
        )
        .expect("resolve");
    let csv_path = fixture.dir.join("ledger.csv");
    std::fs::write(&csv_path, &content.text).expect("write artifact");

    // The same token identities re-resolve from cache, not fresh draws.
    let expected = resolver
        .resolve_all("{{semantic1:person_name}}")
        .expect("resolve");

    let engine = QueryEngine::with_base_dir(&fixture.dir);
    let components = ComponentSet::new(vec![Component::new("ledger", &csv_path)]);

    let answer = engine
        .evaluate("{{csv_value:0:name:TARGET_FILE[ledger]}}", &components)
        .expect("evaluate");
    assert_eq!(answer, expected.text);

    let first = content.variables["number1:100:900"].clone();
    let second = content.variables["number2:100:900"].clone();
    let total: f64 = first.parse::<f64>().expect("numeric") + second.parse::<f64>().expect("numeric");
    let answer = engine
        .evaluate("{{csv_sum:amount:TARGET_FILE[ledger]}}", &components)
        .expect("evaluate");
    assert_eq!(answer, format!("{total}"));
}

#[test]
fn json_roundtrip_counts_what_was_generated() {
    let fixture = Fixture::new();
    let mut resolver = VariableResolver::with_seed(7);

    let content = resolver
        .resolve_all(
            r#"{"users": [{"city": "{{semantic1:city}}"}, {"city": "{{semantic2:city}}"}, {"city": "{{semantic3:city}}"}]}"#,
        )
        .expect("resolve");
    let json_path = fixture.dir.join("users.json");
    std::fs::write(&json_path, &content.text).expect("write artifact");

    let engine = QueryEngine::with_base_dir(&fixture.dir);
    let components = ComponentSet::new(vec![Component::new("users", &json_path)]);

    let count = engine
        .evaluate("{{json_count:$.users:TARGET_FILE}}", &components)
        .expect("evaluate");
    assert_eq!(count, "3");

    let first_city = engine
        .evaluate("{{json_value:$.users[0].city:TARGET_FILE}}", &components)
        .expect("evaluate");
    assert_eq!(
        Some(&first_city),
        content.variables.get("semantic1:city")
    );
}

#[test]
fn two_independent_runs_produce_identical_artifacts_and_answers() {
    let run = || {
        let fixture = Fixture::new();
        let mut resolver = VariableResolver::with_seed(1234);
        let content = resolver
            .resolve_all("{{semantic1:person_name}} has {{number1:2:5}} items")
            .expect("resolve");
        let path = fixture.dir.join("summary.txt");
        std::fs::write(&path, &content.text).expect("write artifact");

        let engine = QueryEngine::with_base_dir(&fixture.dir);
        let line = engine
            .evaluate("{{file_line:1:summary.txt}}", &ComponentSet::default())
            .expect("evaluate");
        (content.text, line)
    };

    let (first_text, first_line) = run();
    let (second_text, second_line) = run();

    assert_eq!(first_text, second_text);
    assert_eq!(first_line, second_line);
    assert_eq!(first_text, first_line);
}
