#[path = "common/mod.rs"]
mod common;

use common::VitrineTest;
use std::fs;

#[test]
fn test_config_show_defaults() {
    let vitrine = VitrineTest::new();

    let config = vitrine.run_json(&["config", "show", "--json"]);
    assert_eq!(config["api_url"], "http://localhost:8000/api");
    assert_eq!(config["page_size"], 10);
    assert_eq!(config["search_debounce_ms"], 400);
    assert_eq!(config["validation_debounce_ms"], 300);
    assert_eq!(config["auth"]["token_configured"], false);
    assert_eq!(config["auth"]["token_source"], "not configured");
}

#[test]
fn test_config_set_then_show() {
    let vitrine = VitrineTest::new();

    let output = vitrine.run_success(&["config", "set", "page_size", "25"]);
    assert!(output.contains("to 25"));

    let config = vitrine.run_json(&["config", "show", "--json"]);
    assert_eq!(config["page_size"], 25);

    let content = fs::read_to_string(vitrine.config_path()).unwrap();
    assert!(content.contains("page_size: 25"));
}

#[test]
fn test_config_token_is_masked() {
    let vitrine = VitrineTest::new();

    let set = vitrine.run_json(&["config", "set", "auth.token", "secret-admin-token", "--json"]);
    assert_eq!(set["value"], "se...en");
    assert_eq!(set["masked"], true);

    let output = vitrine.run_success(&["config", "get", "auth.token"]);
    assert!(output.contains("se...en"));
    assert!(!output.contains("secret-admin-token"));

    let config = vitrine.run_json(&["config", "show", "--json"]);
    assert_eq!(config["auth"]["token_source"], "config file");
}

#[test]
fn test_config_get_not_set() {
    let vitrine = VitrineTest::new();

    let stderr = vitrine.run_failure(&["config", "get", "auth.token"]);
    assert!(stderr.contains("not set"));
}

#[test]
fn test_config_rejects_underscore_keys() {
    let vitrine = VitrineTest::new();

    let stderr = vitrine.run_failure(&["config", "set", "auth_token", "abc"]);
    assert!(stderr.contains("'auth.token'"));
}

#[test]
fn test_config_set_invalid_values() {
    let vitrine = VitrineTest::new();

    let stderr = vitrine.run_failure(&["config", "set", "page_size", "0"]);
    assert!(stderr.contains("at least 1"));

    let stderr = vitrine.run_failure(&["config", "set", "search_debounce_ms", "soon"]);
    assert!(stderr.contains("whole number"));

    let stderr = vitrine.run_failure(&["config", "set", "api_url", "not a url"]);
    assert!(stderr.contains("invalid URL"));

    assert!(!vitrine.config_path().exists());
}

#[test]
fn test_config_file_is_private_and_ignored() {
    let vitrine = VitrineTest::new();

    vitrine.run_success(&["config", "set", "api_url", "https://shop.example.com/api"]);

    let gitignore = vitrine.temp_dir.path().join(".vitrine").join(".gitignore");
    assert!(gitignore.exists(), ".gitignore should be created next to the config");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(vitrine.config_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_config_reads_existing_file() {
    let vitrine = VitrineTest::new();
    vitrine.write_config("api_url: https://shop.example.com/api\npage_size: 50\n");

    let output = vitrine.run_success(&["config", "get", "page_size"]);
    assert_eq!(output.trim(), "50");
    let output = vitrine.run_success(&["config", "get", "search_debounce_ms"]);
    assert_eq!(output.trim(), "400");
}
