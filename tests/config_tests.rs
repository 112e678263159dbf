use boardmark::config::Config;
use boardmark::errors::AppError;
use boardmark::models::defect::{DEFAULT_DEFECTS, DefectCatalog};
use std::fs;

#[test]
fn missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::load(Some(dir.path().join("absent.conf").as_path())).unwrap();
    assert_eq!(cfg.history_retention_days, 365);
    assert_eq!(cfg.search_limit, 100);
    assert_eq!(cfg.undo_depth, 50);
    assert_eq!(cfg.select_radius, 20.0);
    assert!(cfg.privileged_users.is_empty());
}

#[test]
fn partial_yaml_keeps_defaults_for_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boardmark.conf");
    fs::write(
        &path,
        "storage_root: /srv/inspection\nworker_no: A001\nprivileged_users: [Q900, Q901]\nsearch_limit: 25\n",
    )
    .unwrap();

    let cfg = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(cfg.storage_root, "/srv/inspection");
    assert_eq!(cfg.search_limit, 25);
    assert_eq!(cfg.undo_depth, 50);
    assert!(cfg.is_privileged("Q901"));
    assert!(!cfg.is_privileged("A001"));
    assert!(!cfg.is_privileged(""));
}

#[test]
fn save_then_load_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("boardmark.conf");
    let mut cfg = Config::with_root(dir.path());
    cfg.worker_no = "A001".into();
    cfg.defect_list = Some("/etc/defects.txt".into());
    cfg.save(&path).unwrap();

    assert_eq!(Config::load(Some(path.as_path())).unwrap(), cfg);
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boardmark.conf");
    fs::write(&path, "search_limit: [not, a, number]\n").unwrap();
    assert!(matches!(Config::load(Some(path.as_path())), Err(AppError::Config(_))));
}

#[test]
fn validation_rejects_unusable_values() {
    let dir = tempfile::tempdir().unwrap();
    let ok = Config::with_root(dir.path());
    assert!(ok.validate().is_ok());

    let mut bad = ok.clone();
    bad.undo_depth = 0;
    assert!(matches!(bad.validate(), Err(AppError::Config(_))));

    let mut bad = ok.clone();
    bad.select_radius = f64::NAN;
    assert!(bad.validate().is_err());

    let mut bad = ok;
    bad.storage_root = "relative/dir".into();
    assert!(bad.validate().is_err());
}

#[test]
fn defect_catalog_from_file_or_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("defects.txt");
    fs::write(&list, "# line defects\nBridge\nOpen\n\nbridge\nVoid\n").unwrap();

    let mut cfg = Config::with_root(dir.path());
    cfg.defect_list = Some(list.to_string_lossy().to_string());
    let catalog = cfg.defect_catalog();
    assert_eq!(catalog.names(), ["Bridge", "Open", "bridge", "Void"]);
    assert_eq!(catalog.resolve("OPEN"), Some("Open"));
    assert!(!catalog.contains("scratch"));

    cfg.defect_list = Some(dir.path().join("missing.txt").to_string_lossy().to_string());
    assert_eq!(cfg.defect_catalog(), DefectCatalog::builtin());
    assert_eq!(DefectCatalog::builtin().names().len(), DEFAULT_DEFECTS.len());
}
