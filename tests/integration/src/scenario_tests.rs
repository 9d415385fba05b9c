//! Whole-document scenarios
//!
//! Documents loaded from `test-fixtures/configs` and from temporary files,
//! read back through the typed API.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use refconf_core::{Config, ConfigOptions, Error, Mode};
use refconf_test_utils::{TestDir, documents};
use serde::Deserialize;
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/configs")
        .join(name)
}

// =============================================================================
// Fixture documents
// =============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Service {
    name: String,
    host: String,
    port: u16,
    url: String,
    workers: u32,
    replicas: Vec<String>,
    primary: String,
    banner: String,
}

#[test]
fn test_service_fixture_deserializes() {
    let config = Config::from_file(fixture("service.jsonc"), ConfigOptions::default()).unwrap();
    let service: Service = config.deserialize().unwrap();

    assert_eq!(
        service,
        Service {
            name: "billing".to_string(),
            host: "localhost".to_string(),
            port: 8080,
            url: "http://localhost:8080/billing".to_string(),
            workers: 8,
            replicas: vec!["billing-a".to_string(), "billing-b".to_string()],
            primary: "billing-a".to_string(),
            banner: "billing runs 8 workers".to_string(),
        }
    );
}

#[test]
fn test_cycle_fixture_names_the_whole_cycle() {
    let err = Config::from_file(fixture("cycle.json"), ConfigOptions::default()).unwrap_err();
    match err {
        Error::CyclicReference { cycle } => assert_eq!(cycle, vec!["a", "b", "c", "a"]),
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_options_from_serialized_settings() {
    let options: ConfigOptions = serde_json::from_value(json!({"mode": "unrestricted"})).unwrap();
    assert_eq!(options, ConfigOptions::unrestricted());

    let defaults: ConfigOptions = serde_json::from_value(json!({})).unwrap();
    assert_eq!(defaults.mode, Mode::Restricted);
}

// =============================================================================
// Sandbox
// =============================================================================

#[test]
fn test_file_read_depends_on_mode() {
    let dir = TestDir::new();
    dir.write("token.txt", "s3cr3t");
    let source = documents::read_file_document(&dir.expr_path("token.txt"));

    assert!(matches!(
        Config::parse(&source),
        Err(Error::ForbiddenCapability { .. })
    ));

    let config = Config::parse_with(&source, ConfigOptions::unrestricted()).unwrap();
    assert_eq!(config["contents"], json!("s3cr3t"));
    assert_eq!(config.mode(), Mode::Unrestricted);
}

#[test]
fn test_path_exists_in_unrestricted_mode() {
    let dir = TestDir::new();
    dir.write("present.txt", "");
    let source = format!(
        r#"{{"dir": "{}", "yes": "{{{{ path_exists('${{dir}}/present.txt') }}}}", "no": "{{{{ path_exists('${{dir}}/absent.txt') }}}}"}}"#,
        dir.expr_path("").trim_end_matches('/')
    );

    let config = Config::parse_with(&source, ConfigOptions::unrestricted()).unwrap();
    assert_eq!(config["yes"], json!(true));
    assert_eq!(config["no"], json!(false));
}

#[test]
fn test_env_default_in_unrestricted_mode() {
    let config = Config::parse_with(
        r#"{"region": "{{ env('REFCONF_SURELY_UNSET_VARIABLE', 'eu-west-1') }}"}"#,
        ConfigOptions::unrestricted(),
    )
    .unwrap();
    assert_eq!(config["region"], json!("eu-west-1"));
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn test_exp_and_brace_blocks_mix() {
    let config = Config::parse(
        r#"{"base": 2, "kb": "exp(${base} ** 10)", "mb": "{{ ${kb} * exp(${kb}) }}"}"#,
    )
    .unwrap();
    assert_eq!(config["kb"], json!(1024));
    assert_eq!(config["mb"], json!(1048576));
}

#[test]
fn test_expression_over_containers() {
    let config = Config::parse(
        r#"{
            "ports": [80, 443],
            "labels": {"tier": "web"},
            "count": "{{ len(${ports}) }}",
            "total": "{{ sum(${ports}) }}",
            "tier": "{{ ${labels}['tier'].upper() }}"
        }"#,
    )
    .unwrap();
    assert_eq!(config["count"], json!(2));
    assert_eq!(config["total"], json!(523));
    assert_eq!(config["tier"], json!("WEB"));
}

#[test]
fn test_declaration_order_does_not_matter() {
    let reversed = r#"{
        "e": "as pie",
        "d": "${a} ${e}",
        "c": "${d}",
        "b": "${a} ${c}",
        "a": "simple"
    }"#;
    let forward = Config::parse(documents::COMPLEX_REFERENCES).unwrap();
    let backward = Config::parse(reversed).unwrap();
    for key in ["a", "b", "c", "d", "e"] {
        assert_eq!(forward.get(key), backward.get(key));
    }
}
