use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.admin_token, None);
    assert_eq!(cfg.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("POOLYFI_API_BASE_URL", "http://localhost:8080/api/"),
        ("POOLYFI_ADMIN_TOKEN", "bootstrap"),
        ("POOLYFI_STORAGE_PATH", "/tmp/poolyfi.json"),
        ("POOLYFI_REQUEST_TIMEOUT_SECS", "42"),
        ("POOLYFI_CONNECT_TIMEOUT_SECS", " 7 "),
    ]))
    .unwrap();

    assert_eq!(cfg.api_base_url, "http://localhost:8080/api");
    assert_eq!(cfg.admin_token.as_deref(), Some("bootstrap"));
    assert_eq!(cfg.storage_path, PathBuf::from("/tmp/poolyfi.json"));
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn from_lookup_blank_admin_token_is_none() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("POOLYFI_ADMIN_TOKEN", "   ")])).unwrap();
    assert_eq!(cfg.admin_token, None);
}

#[test]
fn from_lookup_rejects_non_numeric_timeout() {
    let err = ClientConfig::from_lookup(lookup_from(&[("POOLYFI_REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidNumber { var: "POOLYFI_REQUEST_TIMEOUT_SECS", ref value } if value == "soon"
    ));
}

#[test]
fn from_lookup_rejects_relative_base_url() {
    let err = ClientConfig::from_lookup(lookup_from(&[("POOLYFI_API_BASE_URL", "/api")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
}

// =============================================================================
// normalize_base_url
// =============================================================================

#[test]
fn normalize_strips_trailing_slashes() {
    assert_eq!(normalize_base_url("https://example.test/api//").unwrap(), "https://example.test/api");
}

#[test]
fn normalize_rejects_non_http_scheme() {
    assert!(normalize_base_url("ftp://example.test/api").is_err());
}

#[test]
fn normalize_rejects_garbage() {
    assert!(normalize_base_url("not a url").is_err());
}

// =============================================================================
// endpoint_url
// =============================================================================

#[test]
fn endpoint_url_joins_with_single_slash() {
    let cfg = ClientConfig::new("https://example.test/api/").unwrap();
    assert_eq!(cfg.endpoint_url("login_admin"), "https://example.test/api/login_admin");
    assert_eq!(cfg.endpoint_url("/user/logout"), "https://example.test/api/user/logout");
}

#[test]
fn builder_helpers_set_fields() {
    let cfg = ClientConfig::new("http://127.0.0.1:1")
        .unwrap()
        .with_admin_token("x")
        .with_timeouts(Timeouts { request_secs: 1, connect_secs: 1 });
    assert_eq!(cfg.admin_token.as_deref(), Some("x"));
    assert_eq!(cfg.timeouts.request_secs, 1);
}
