use super::*;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_memerank_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("MEMERANK_ROLE_DIR");
        env::remove_var("MEMERANK_REFERENCE_PATHS");
        env::remove_var("MEMERANK_NAMES_PATH");
        env::remove_var("MEMERANK_OUTPUT_DIR");
        env::remove_var("MEMERANK_DIAGNOSTICS_DIR");
        env::remove_var("MEMERANK_WEIGHTS");
        env::remove_var("MEMERANK_BATCH_SIZE");
        env::remove_var("MEMERANK_OVERWRITE");
    }
}

fn valid_layout() -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().expect("tempdir");
    let role_dir = dir.path().join("roles");
    fs::create_dir(&role_dir).expect("create role dir");
    let reference = dir.path().join("embeddings.npy");
    fs::write(&reference, b"placeholder").expect("write reference");
    let names = dir.path().join("figures.json");
    fs::write(&names, b"[]").expect("write names");

    let config = Config {
        role_dir,
        reference_paths: vec![reference],
        names_path: names,
        diagnostics_dir: None,
        ..Default::default()
    };
    (dir, config)
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.role_dir, PathBuf::from("roles-dialog-embedding"));
    assert_eq!(
        config.reference_paths,
        vec![PathBuf::from("Meme_Warehouse/embeddings.npy")]
    );
    assert_eq!(config.names_path, PathBuf::from("Meme_Warehouse/figures.json"));
    assert!(config.output_dir.is_none());
    assert_eq!(config.diagnostics_dir, Some(PathBuf::from("./plots")));
    assert_eq!(config.weights.as_array(), [0.3, -0.2, 0.2, 0.7]);
    assert_eq!(config.batch_size, 100);
    assert!(!config.overwrite);
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_memerank_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.batch_size, 100);
    assert_eq!(config.weights, ScoreWeights::default());
    assert_eq!(config.diagnostics_dir, Some(PathBuf::from("./plots")));
}

#[test]
#[serial]
fn test_from_env_custom_weights() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_WEIGHTS", "0.25, 0.25,-0.5 ,1.0")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.weights.as_array(), [0.25, 0.25, -0.5, 1.0]);
    });
}

#[test]
#[serial]
fn test_from_env_wrong_weight_count() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_WEIGHTS", "0.3,0.2,0.5")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::WrongWeightCount { count: 3, .. }));
    });
}

#[test]
#[serial]
fn test_from_env_unparsable_weight() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_WEIGHTS", "0.3,abc,0.2,0.7")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::WeightParseError { .. }));
        assert!(err.to_string().contains("abc"));
    });
}

#[test]
fn test_parse_weights_rejects_nan() {
    let err = Config::parse_weights("0.3,NaN,0.2,0.7").unwrap_err();
    assert!(matches!(err, ConfigError::NonFiniteWeight { .. }));
}

#[test]
#[serial]
fn test_from_env_custom_batch_size() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_BATCH_SIZE", "256")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.batch_size, 256);
    });
}

#[test]
#[serial]
fn test_from_env_zero_batch_size() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_BATCH_SIZE", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBatchSize { .. }));
        assert!(err.to_string().contains("at least 1"));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_batch_size() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_BATCH_SIZE", "lots")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::BatchSizeParseError { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_custom_paths() {
    clear_memerank_env();

    with_env_vars(
        &[
            ("MEMERANK_ROLE_DIR", "/data/roles"),
            (
                "MEMERANK_REFERENCE_PATHS",
                "/data/memes_a.npy, /data/memes_b.npy,",
            ),
            ("MEMERANK_NAMES_PATH", "/data/figures.json"),
            ("MEMERANK_OUTPUT_DIR", "/data/out"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.role_dir, PathBuf::from("/data/roles"));
            assert_eq!(
                config.reference_paths,
                vec![
                    PathBuf::from("/data/memes_a.npy"),
                    PathBuf::from("/data/memes_b.npy")
                ]
            );
            assert_eq!(config.names_path, PathBuf::from("/data/figures.json"));
            assert_eq!(config.output_dir, Some(PathBuf::from("/data/out")));
        },
    );
}

#[test]
#[serial]
fn test_from_env_empty_diagnostics_dir_disables_diagnostics() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_DIAGNOSTICS_DIR", "")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.diagnostics_dir.is_none());
    });
}

#[test]
#[serial]
fn test_from_env_overwrite_flag() {
    clear_memerank_env();

    with_env_vars(&[("MEMERANK_OVERWRITE", "true")], || {
        assert!(Config::from_env().expect("should parse").overwrite);
    });
    with_env_vars(&[("MEMERANK_OVERWRITE", "0")], || {
        assert!(!Config::from_env().expect("should parse").overwrite);
    });
}

#[test]
fn test_validate_success_with_valid_paths() {
    let (_dir, config) = valid_layout();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_missing_reference() {
    let (dir, mut config) = valid_layout();
    config.reference_paths = vec![dir.path().join("missing.npy")];

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_no_reference_paths() {
    let (_dir, mut config) = valid_layout();
    config.reference_paths.clear();

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NoReferencePaths));
}

#[test]
fn test_validate_names_path_is_directory() {
    let (_dir, mut config) = valid_layout();
    config.names_path = config.role_dir.clone();

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotAFile { .. }));
}

#[test]
fn test_validate_role_dir_is_file() {
    let (_dir, mut config) = valid_layout();
    config.role_dir = config.names_path.clone();

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_output_dir_is_file() {
    let (_dir, mut config) = valid_layout();
    config.output_dir = Some(config.names_path.clone());

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
#[serial]
fn test_validate_map_does_not_need_reference_embeddings() {
    clear_memerank_env();
    let (dir, layout) = valid_layout();
    let role_dir = layout.role_dir.to_string_lossy().into_owned();
    let names = layout.names_path.to_string_lossy().into_owned();
    let missing = dir.path().join("roles/gone.npy");
    let missing = missing.to_string_lossy().into_owned();

    with_env_vars(
        &[
            ("MEMERANK_ROLE_DIR", role_dir.as_str()),
            ("MEMERANK_NAMES_PATH", names.as_str()),
            ("MEMERANK_REFERENCE_PATHS", missing.as_str()),
            ("MEMERANK_DIAGNOSTICS_DIR", ""),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.validate_map().is_ok());
            assert!(matches!(
                config.validate_rank(),
                Err(ConfigError::PathNotFound { .. })
            ));
            assert!(config.validate().is_err());
        },
    );
}

#[test]
#[serial]
fn test_validate_rank_does_not_need_name_table() {
    clear_memerank_env();
    let (dir, layout) = valid_layout();
    let role_dir = layout.role_dir.to_string_lossy().into_owned();
    let reference = layout.reference_paths[0].to_string_lossy().into_owned();
    let missing = dir.path().join("figures_gone.json");
    let missing = missing.to_string_lossy().into_owned();

    with_env_vars(
        &[
            ("MEMERANK_ROLE_DIR", role_dir.as_str()),
            ("MEMERANK_REFERENCE_PATHS", reference.as_str()),
            ("MEMERANK_NAMES_PATH", missing.as_str()),
            ("MEMERANK_DIAGNOSTICS_DIR", ""),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.validate_rank().is_ok());
            assert!(matches!(
                config.validate_map(),
                Err(ConfigError::PathNotFound { .. })
            ));
        },
    );
}

#[test]
fn test_validate_map_requires_results_dir() {
    let (dir, mut config) = valid_layout();
    config.output_dir = Some(dir.path().join("not_yet_written"));

    assert!(matches!(
        config.validate_map(),
        Err(ConfigError::PathNotFound { .. })
    ));
    // A full run creates the results directory itself.
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_zero_batch_size() {
    let (_dir, mut config) = valid_layout();
    config.batch_size = 0;

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBatchSize { .. }));
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::WrongWeightCount {
        value: "1,2".to_string(),
        count: 2,
    };
    assert!(err.to_string().contains("expected 4"));
    assert!(err.to_string().contains("1,2"));

    let err = ConfigError::PathNotFound {
        path: PathBuf::from("/some/path"),
    };
    assert!(err.to_string().contains("/some/path"));
}
