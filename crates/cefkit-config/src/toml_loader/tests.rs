use super::*;
use crate::schema::LogLevel;

fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn missing_file_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_from_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "[process]\nsingle_process = true\n\n[protocol]\nevaluate_timeout_ms = 250\n",
    );

    let config = load_from_path(&path).unwrap();
    assert!(config.process.single_process);
    assert_eq!(config.protocol.evaluate_timeout_ms, 250);
    assert_eq!(config.protocol.pending_request_capacity, 1024);
    assert!(!config.protocol.focused_node_notifications);
}

#[test]
fn malformed_toml_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "this is not valid toml {{{");

    match load_from_path(&path).unwrap_err() {
        ConfigError::ParseError(msg) => assert!(msg.contains("config.toml")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn out_of_range_values_survive_lenient_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "[protocol]\npending_request_capacity = 0\n");

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.protocol.pending_request_capacity, 0);
}

#[test]
fn template_parses_and_validates() {
    let config: CefkitConfig = toml::from_str(template::default_config_toml()).unwrap();
    assert!(validation::validate(&config).is_ok());
    assert_eq!(config.process.uncaught_exception_stack_size, 10);
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn missing_platform_file_is_seeded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cefkit").join("config.toml");

    let config = load_location(&ConfigLocation::Platform(path.clone())).unwrap();
    assert!(path.exists());
    assert!(!config.process.single_process);

    let reread = load_from_path(&path).unwrap();
    assert_eq!(reread.protocol.evaluate_timeout_ms, config.protocol.evaluate_timeout_ms);
}

#[test]
fn missing_env_file_is_not_seeded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elsewhere.toml");

    let err = load_location(&ConfigLocation::Env(path.clone())).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
    assert!(!path.exists());
}

#[test]
fn env_value_overrides_platform_path() {
    let location = resolve_location(Some("/srv/cefkit.toml".into())).unwrap();
    assert_eq!(location, ConfigLocation::Env(PathBuf::from("/srv/cefkit.toml")));
}

#[test]
fn empty_env_value_is_ignored() {
    if let Ok(location) = resolve_location(Some("".into())) {
        assert!(matches!(location, ConfigLocation::Platform(_)));
        assert!(location.path().ends_with("cefkit/config.toml"));
    }
}
