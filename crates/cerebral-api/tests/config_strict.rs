#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use cerebral_api::config;
use cerebral_api::obs::metrics::DEFAULT_BUCKETS;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
api:
  listen: "0.0.0.0:8000"
exporter:
  enabeld: false # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.api.listen, "0.0.0.0:8000");
    assert!(cfg.exporter.enabled);
    assert_eq!(cfg.exporter.listen, "0.0.0.0:8001");
    assert_eq!(cfg.metrics.latency_buckets, DEFAULT_BUCKETS.to_vec());
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn rejects_bad_listen_addr() {
    let bad = r#"
version: 1
api:
  listen: "localhost"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("api.listen"), "{err}");
}

#[test]
fn exporter_must_not_share_api_addr() {
    let bad = r#"
version: 1
api:
  listen: "127.0.0.1:9000"
exporter:
  listen: "127.0.0.1:9000"
"#;
    assert!(config::load_from_str(bad).is_err());

    let disabled = r#"
version: 1
api:
  listen: "127.0.0.1:9000"
exporter:
  enabled: false
  listen: "127.0.0.1:9000"
"#;
    let cfg = config::load_from_str(disabled).expect("disabled exporter is not checked");
    assert!(!cfg.exporter.enabled);
}

#[test]
fn latency_buckets_must_increase() {
    let bad = r#"
version: 1
metrics:
  latency_buckets: [0.1, 0.05, 1.0]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("latency_buckets"), "{err}");

    let empty = "version: 1\nmetrics:\n  latency_buckets: []\n";
    assert!(config::load_from_str(empty).is_err());

    let ok = "version: 1\nmetrics:\n  latency_buckets: [0.1, 0.5, 2]\n";
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.metrics.latency_buckets, vec![0.1, 0.5, 2.0]);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let cfg = config::load_or_default("definitely-not-here/cerebral.yaml").expect("defaults");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.api.listen_addr().unwrap().port(), 8000);
}

#[test]
fn bucket_errors_are_not_double_prefixed() {
    let bad = "version: 1\nmetrics:\n  latency_buckets: [0.5, 0.5]\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(
        err.to_string(),
        "bad request: metrics.latency_buckets: histogram buckets must be strictly increasing"
    );
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}
