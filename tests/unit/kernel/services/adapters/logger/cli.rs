use super::*;
use std::fs;
use tempfile::tempdir;

fn args(level: Option<&str>, file: Option<PathBuf>) -> LogLevelArgs {
    LogLevelArgs {
        log_level: level.map(str::to_string),
        log_level_file: file,
    }
}

#[test]
fn test_no_flags_defaults_to_info() {
    let config = args(None, None).resolve().unwrap();
    assert_eq!(config.default, LogLevel::Info);
    assert!(config.loggers.is_empty());
}

#[test]
fn test_log_level_flag() {
    let config = args(Some("DEBUG"), None).resolve().unwrap();
    assert_eq!(config.default, LogLevel::Debug);
    assert_eq!(config.level_for("anything"), LogLevel::Debug);
}

#[test]
fn test_log_level_flag_rejects_bad_name() {
    let err = args(Some("verbose"), None).resolve().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLevel(_)));
    assert!(err.to_string().contains("verbose"));
}

#[test]
fn test_log_level_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("levels.json");
    fs::write(
        &path,
        r#"{ "default": "warn", "loggers": { "search": "trace", "lsp": "error" } }"#,
    )
    .unwrap();

    let config = args(None, Some(path)).resolve().unwrap();
    assert_eq!(config.default, LogLevel::Warn);
    assert_eq!(config.level_for("search"), LogLevel::Trace);
    assert_eq!(config.level_for("lsp"), LogLevel::Error);
    assert_eq!(config.level_for("other"), LogLevel::Warn);
    assert_eq!(config.override_for("other"), None);
}

#[test]
fn test_log_level_file_without_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("levels.json");
    fs::write(&path, r#"{ "loggers": { "search": "debug" } }"#).unwrap();

    let config = LogLevelConfig::load(&path).unwrap();
    assert_eq!(config.default, LogLevel::Info);
    assert_eq!(config.level_for("search"), LogLevel::Debug);
}

#[test]
fn test_both_flags_are_mutually_exclusive() {
    let err = args(Some("info"), Some(PathBuf::from("levels.json")))
        .resolve()
        .unwrap_err();
    assert!(matches!(err, ConfigError::MutuallyExclusive));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = args(None, Some(dir.path().join("nope.json")))
        .resolve()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("levels.json");

    fs::write(&path, "{ default: ").unwrap();
    assert!(matches!(
        LogLevelConfig::load(&path),
        Err(ConfigError::Json { .. })
    ));

    fs::write(&path, r#"{ "loggers": { "search": "loud" } }"#).unwrap();
    assert!(matches!(
        LogLevelConfig::load(&path),
        Err(ConfigError::InvalidLevel(_))
    ));
}
