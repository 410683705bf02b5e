use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_empty_toml_produces_defaults() {
    let cfg: StoreConfig = toml::from_str("").expect("Should parse empty TOML");
    assert_eq!(cfg, StoreConfig::default());
    assert_eq!(cfg.backend, StorageKind::Filesystem);
    assert_eq!(cfg.key_value.ttl, DEFAULT_TTL);
    assert_eq!(cfg.key_value.max_file_size, 10 * 1024 * 1024);
    assert_eq!(cfg.key_value.url, "redis://127.0.0.1:6379");
}

#[test]
fn test_key_value_section_with_human_durations() {
    let toml_str = r#"
backend = "key_value"

[key_value]
url = "redis://cache.internal:6380/2"
prefix = "tenant-a:"
ttl = "2h 30m"
timeout = "250ms"
max_file_size = 1024
max_memory_bytes = 4096
"#;
    let cfg: StoreConfig = toml::from_str(toml_str).expect("Should parse");
    assert_eq!(cfg.backend, StorageKind::KeyValue);
    assert_eq!(cfg.key_value.url, "redis://cache.internal:6380/2");
    assert_eq!(cfg.key_value.prefix, "tenant-a:");
    assert_eq!(cfg.key_value.ttl, Duration::from_secs(9000));
    assert_eq!(cfg.key_value.timeout, Duration::from_millis(250));
    assert_eq!(cfg.key_value.max_file_size, 1024);
    assert_eq!(cfg.key_value.max_memory_bytes, Some(4096));
}

#[test]
fn test_invalid_duration_is_rejected() {
    let result: Result<StoreConfig, _> = toml::from_str("[key_value]\nttl = \"soon\"\n");
    assert!(result.is_err());
}

#[test]
fn test_unknown_fields_are_rejected() {
    let result: Result<StoreConfig, _> = toml::from_str("[filesystem]\nrooot = \"/tmp\"\n");
    assert!(result.is_err());
}

#[test]
fn test_roundtrip_serialization() {
    let cfg = StoreConfig {
        backend: StorageKind::KeyValue,
        key_value: KeyValueConfig {
            ttl: Duration::from_secs(90),
            ..KeyValueConfig::default()
        },
        ..StoreConfig::default()
    };
    let serialized = toml::to_string(&cfg).expect("Should serialize");
    let deserialized: StoreConfig = toml::from_str(&serialized).expect("Should deserialize");
    assert_eq!(cfg, deserialized);
}

#[test]
fn test_load_config_absent_file_returns_defaults() {
    let dir = tempdir().expect("tempdir");
    let cfg = load_config_from(&dir.path().join("config.toml")).expect("defaults");
    assert_eq!(cfg, StoreConfig::default());
}

#[test]
fn test_load_config_reads_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "[filesystem]\nroot = \"/srv/docs\"\n").expect("write");
    let cfg = load_config_from(&path).expect("load");
    assert_eq!(cfg.filesystem.root, PathBuf::from("/srv/docs"));
    assert_eq!(cfg.filesystem.min_free_bytes, DEFAULT_MIN_FREE_BYTES);
}

#[test]
fn test_load_config_reports_parse_errors() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "backend = \"tape\"\n").expect("write");
    assert!(matches!(load_config_from(&path), Err(ConfigError::Toml(_))));
}

#[test]
fn test_config_path_is_under_docstore_home() {
    let path = config_path();
    assert!(path.ends_with("config.toml"));
    assert!(path.to_string_lossy().contains(".docstore"));
}
