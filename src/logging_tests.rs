use super::*;

fn rotation_name(rotation: &Rotation) -> String {
    format!("{rotation:?}")
}

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.log_level, Level::INFO);
    assert!(!config.json_format);
    assert!(config.log_dir.ends_with("logs"));
    assert!(config.log_dir.to_string_lossy().contains(".docstore"));
}

#[test]
fn test_log_file_is_inside_log_dir() {
    let config = LogConfig {
        log_dir: PathBuf::from("/tmp/ds-logs"),
        ..LogConfig::default()
    };
    assert_eq!(config.log_file(), PathBuf::from("/tmp/ds-logs/docstore.log"));
}

#[test]
fn test_parse_rotation_is_case_insensitive() {
    assert_eq!(
        rotation_name(&parse_rotation("HOURLY")),
        rotation_name(&Rotation::HOURLY)
    );
    assert_eq!(
        rotation_name(&parse_rotation("Never")),
        rotation_name(&Rotation::NEVER)
    );
}

#[test]
fn test_parse_rotation_unknown_defaults_to_daily() {
    assert_eq!(
        rotation_name(&parse_rotation("weekly")),
        rotation_name(&Rotation::DAILY)
    );
}
