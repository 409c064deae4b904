#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use greenhouse_gateway::config::{self, StorageBackend, SyncMode};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8000"
storage:
  pathh: "sensor.db" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8000");
    assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
    assert_eq!(cfg.storage.path.to_str(), Some("greenhouse.db"));
    assert_eq!(cfg.storage.synchronous, SyncMode::Normal);
    assert_eq!(cfg.board.interval_ms, 2000);
    assert_eq!(cfg.board.max_iterations, Some(1000));
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
storage:
  backend: memory
  busy_timeout_ms: 2000
  pool_size: 4
  synchronous: full
  history_max_limit: 50
board:
  base_url: "http://gateway:9000"
  interval_ms: 500
  max_iterations: null
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.storage.pool_size, 4);
    assert_eq!(cfg.storage.synchronous.pragma_value(), "FULL");
    assert_eq!(cfg.storage.history_max_limit, 50);
    assert_eq!(cfg.board.base_url, "http://gateway:9000");
    assert_eq!(cfg.board.max_iterations, None);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn range_validation() {
    let cases = [
        "version: 1\nserver:\n  listen: \"not-an-addr\"\n",
        "version: 1\nstorage:\n  pool_size: 0\n",
        "version: 1\nstorage:\n  busy_timeout_ms: 10\n",
        "version: 1\nstorage:\n  path: \":memory:\"\n",
        "version: 1\nstorage:\n  history_max_limit: 0\n",
        "version: 1\nboard:\n  base_url: \"gateway:8000\"\n",
        "version: 1\nboard:\n  interval_ms: 1\n",
        "version: 1\nboard:\n  max_iterations: 0\n",
    ];
    for yaml in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST", "yaml={yaml}");
    }
}

#[test]
fn memory_path_allowed_for_memory_backend() {
    let yaml = "version: 1\nstorage:\n  backend: memory\n  path: \":memory:\"\n";
    assert!(config::load_from_str(yaml).is_ok());
}
