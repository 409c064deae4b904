//! Counter name validation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use greenhouse_core::counter::MAX_COUNTER_NAME_LEN;
use greenhouse_core::{CounterName, DEFAULT_COUNTER};

#[test]
fn default_is_global_sentinel() {
    assert_eq!(CounterName::default().as_str(), DEFAULT_COUNTER);
    assert_eq!(DEFAULT_COUNTER, "global");
}

#[test]
fn accepts_typical_names() {
    for raw in ["global", "new-name", "pump_cycles", "greenhouse.a:1", "X9"] {
        let name = CounterName::parse(raw).expect("must parse");
        assert_eq!(name.to_string(), raw);
    }
}

#[test]
fn rejects_empty_and_overlong() {
    let err = CounterName::parse("").expect_err("empty must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");

    let long = "a".repeat(MAX_COUNTER_NAME_LEN + 1);
    let err = CounterName::parse(long).expect_err("overlong must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");

    assert!(CounterName::parse("a".repeat(MAX_COUNTER_NAME_LEN)).is_ok());
}

#[test]
fn rejects_sql_and_path_characters() {
    for raw in ["a b", "x'; DROP TABLE counters; --", "a/b", "é"] {
        assert!(CounterName::parse(raw).is_err(), "raw={raw:?}");
    }
}

#[test]
fn serde_goes_through_validation() {
    let name: CounterName = serde_json::from_str("\"other\"").unwrap();
    assert_eq!(name.as_str(), "other");
    assert!(serde_json::from_str::<CounterName>("\"\"").is_err());
    assert_eq!(serde_json::to_string(&name).unwrap(), "\"other\"");
}
