#![allow(clippy::unwrap_used)]

use super::*;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.granularity(), Granularity::Month);
    assert_eq!(config.timeframe(), Timeframe::Last30Days);
    assert_eq!(config.note_search_min_chars, 0);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"{"default_granularity":"week","note_search_min_chars":3}"#,
    );
    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.granularity(), Granularity::Week);
    assert_eq!(config.note_search_min_chars, 3);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.data_dir, None);
}

#[test]
fn test_malformed_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "{ nope");
    let err = AppConfig::load(&path).unwrap_err();
    assert!(err.to_string().starts_with("Invalid config"));
}

#[test]
fn test_unknown_tokens_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for content in [
        r#"{"default_granularity":"fortnight"}"#,
        r#"{"default_timeframe":"forever"}"#,
        r#"{"default_timeframe":"custom"}"#,
        r#"{"log_level":"loud"}"#,
    ] {
        let path = write_config(dir.path(), content);
        assert!(AppConfig::load(&path).is_err(), "{content}");
    }
}

#[test]
fn test_data_dir_override_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("data");
    let config = AppConfig {
        data_dir: Some(target.clone()),
        ..AppConfig::default()
    };
    let paths = Paths {
        config_file: dir.path().join(CONFIG_FILE),
        data_dir: dir.path().to_path_buf(),
    }
    .with_config(&config)
    .unwrap();
    assert!(target.is_dir());
    assert_eq!(paths.db_file(), target.join(DB_FILE));
    assert_eq!(paths.log_file(), target.join(LOG_FILE));
}
