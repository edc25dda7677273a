//! Tests for config module

use std::sync::Arc;
use std::time::Duration;

use collection_uploader::config::{
    Config, ConfigOptions, Credentials, DEFAULT_API_BASE_URL, DEFAULT_MANAGEMENT_BASE_URL,
};
use tempfile::TempDir;

fn test_credentials() -> Credentials {
    Credentials::new("api-key".to_string(), Some("mgmt-key".to_string())).unwrap()
}

fn test_config(dir: &TempDir, options: ConfigOptions) -> anyhow::Result<Arc<Config>> {
    Config::new(
        "collection_123".to_string(),
        vec![dir.path().to_path_buf()],
        test_credentials(),
        options,
    )
}

#[test]
fn test_credentials_management_key_falls_back() {
    let creds = Credentials::new("api-key".to_string(), None).unwrap();
    assert_eq!(creds.management_api_key, "api-key");

    let creds = Credentials::new("api-key".to_string(), Some("  ".to_string())).unwrap();
    assert_eq!(creds.management_api_key, "api-key");
}

#[test]
fn test_credentials_empty_api_key_fails() {
    let result = Credentials::new(" ".to_string(), Some("mgmt".to_string()));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("XAI_API_KEY"));
}

#[test]
fn test_credentials_debug_masks_keys() {
    let debug = format!("{:?}", test_credentials());
    assert!(!debug.contains("api-key"));
    assert!(!debug.contains("mgmt-key"));
}

#[test]
fn test_config_default_values() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, ConfigOptions::default()).unwrap();

    assert_eq!(config.collection_id, "collection_123");
    assert_eq!(config.max_workers, 4);
    assert_eq!(config.rate_limit_interval(), Duration::from_millis(300));
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.backoff_multiplier, 2.0);
    assert_eq!(config.max_file_size, None);
    assert_eq!(config.upload_timeout_secs, 3600);
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.management_base_url, DEFAULT_MANAGEMENT_BASE_URL);
    assert!(config.skip_extensions.contains(".log"));
    assert!(config.skip_extensions.contains(".ds_store"));
    assert!(!config.assume_yes);
}

#[test]
fn test_config_with_custom_values() {
    let dir = TempDir::new().unwrap();
    let config = test_config(
        &dir,
        ConfigOptions {
            max_workers: Some(8),
            rate_limit_interval_secs: Some(0.0),
            max_retries: Some(5),
            backoff_multiplier: Some(1.5),
            max_file_size: Some(1024),
            skip_extensions: vec!["PDF".to_string(), ".csv".to_string()],
            api_base_url: Some("http://127.0.0.1:9000/".to_string()),
            management_base_url: Some("mgmt.example.com".to_string()),
            upload_timeout_secs: Some(10),
            assume_yes: true,
        },
    )
    .unwrap();

    assert_eq!(config.max_workers, 8);
    assert_eq!(config.rate_limit_interval(), Duration::ZERO);
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.max_file_size, Some(1024));
    assert_eq!(config.skip_extensions.len(), 2);
    assert!(config.skip_extensions.contains(".pdf"));
    assert!(config.skip_extensions.contains(".csv"));
    assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
    assert_eq!(config.management_base_url, "https://mgmt.example.com");
    assert_eq!(config.upload_timeout_secs, 10);
    assert!(config.assume_yes);
}

#[test]
fn test_config_zero_workers_clamped() {
    let dir = TempDir::new().unwrap();
    let config = test_config(
        &dir,
        ConfigOptions {
            max_workers: Some(0),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(config.max_workers, 1);
}

#[test]
fn test_config_accepts_multiplier_below_one() {
    let dir = TempDir::new().unwrap();
    for multiplier in [0.0, 0.5] {
        let config = test_config(
            &dir,
            ConfigOptions {
                backoff_multiplier: Some(multiplier),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.backoff_multiplier, multiplier);
    }
}

#[test]
fn test_config_negative_interval_disables_pacing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(
        &dir,
        ConfigOptions {
            rate_limit_interval_secs: Some(-1.0),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(config.rate_limit_interval(), Duration::ZERO);
}

#[test]
fn test_config_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();

    let err = test_config(
        &dir,
        ConfigOptions {
            max_retries: Some(0),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("max_retries"));

    let err = test_config(
        &dir,
        ConfigOptions {
            backoff_multiplier: Some(-0.5),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("backoff_multiplier"));

    let err = test_config(
        &dir,
        ConfigOptions {
            rate_limit_interval_secs: Some(f64::NAN),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("rate_limit_interval"));
}

#[test]
fn test_config_empty_collection_id_fails() {
    let dir = TempDir::new().unwrap();
    let result = Config::new(
        "  ".to_string(),
        vec![dir.path().to_path_buf()],
        test_credentials(),
        ConfigOptions::default(),
    );
    assert!(result.unwrap_err().to_string().contains("collection_id"));
}

#[test]
fn test_config_requires_sources() {
    let result = Config::new(
        "collection_123".to_string(),
        Vec::new(),
        test_credentials(),
        ConfigOptions::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_config_rejects_missing_or_file_sources() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain.txt");
    std::fs::write(&file, "x").unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = Config::new(
        "collection_123".to_string(),
        vec![dir.path().to_path_buf(), file.clone(), missing.clone()],
        test_credentials(),
        ConfigOptions::default(),
    )
    .unwrap_err()
    .to_string();

    assert!(err.contains(&file.display().to_string()));
    assert!(err.contains(&missing.display().to_string()));
}
