#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use hookwatch_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  port: 9090
  debgu: true # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.port().unwrap(), 9090);
    assert!(!cfg.server.debug);
}

#[test]
fn port_as_string_or_integer() {
    let s = config::load_from_str("version: 1\nserver:\n  port: \"8081\"\n  debug: true\n").unwrap();
    assert_eq!(s.server.port().unwrap(), 8081);
    assert!(s.server.debug);

    let n = config::load_from_str("version: 1\nserver:\n  port: 8082\n").unwrap();
    assert_eq!(n.server.port().unwrap(), 8082);
}

#[test]
fn rejects_bad_ports() {
    for bad in ["port: 70000", "port: \"abc\"", "port: -1"] {
        let doc = format!("version: 1\nserver:\n  {bad}\n");
        let err = config::load_from_str(&doc).expect_err("must fail");
        assert_eq!(err.kind().as_str(), "CONFIG", "{bad}");
    }
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn missing_file_is_a_config_error() {
    let err = config::load_from_file("/nonexistent/hookwatch.yaml").expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}
