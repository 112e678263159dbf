use boardmark::models::board::BoardDocument;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::time::{Duration, SystemTime};

mod common;
use common::{ADMIN, LOT, TestEnv, read_json, rti, write_raw};

fn seed(env: &TestEnv, boards: &[u32]) {
    let files = env.files();
    for n in boards {
        let doc = BoardDocument {
            model: "MX-200".into(),
            coordinates: vec![[1, 2]],
            image_path: String::new(),
            coordinate_details: Vec::new(),
            lot_number: LOT.into(),
            worker_no: "A001".into(),
            created_at: String::new(),
            total_coordinates: 1,
            board_number: *n,
        };
        files.save(&files.board_path(LOT, *n), &doc).unwrap();
    }
    files.reload_manifest(LOT).unwrap();
}

#[test]
fn init_creates_config_and_storage_root() {
    let env = TestEnv::new();
    let cfg_path = env.dir.path().join("conf").join("boardmark.conf");
    let root = env.dir.path().join("shared");

    rti()
        .args([
            "--config",
            &cfg_path.to_string_lossy(),
            "--root",
            &root.to_string_lossy(),
            "init",
        ])
        .assert()
        .success()
        .stdout(contains("initialization completed"));

    assert!(cfg_path.is_file());
    assert!(root.is_dir());
    assert!(root.join("operation_log.csv").is_file());
}

#[test]
fn config_print_shows_effective_values() {
    let env = TestEnv::new();
    rti()
        .args(["--config", &env.config_arg(), "--worker", "Z777", "config", "--print"])
        .assert()
        .success()
        .stdout(contains("storage_root").and(contains("Z777")));
}

#[test]
fn session_script_annotates_and_saves() {
    let env = TestEnv::new();
    rti()
        .args([
            "--config",
            &env.config_arg(),
            "session",
            "--lot",
            LOT,
            "--model",
            "MX-200",
            "--scale",
            "0.5",
        ])
        .write_stdin("click 400 300\ndetail defect scratch\ncommit\nsave\npoints\nquit\n")
        .assert()
        .success()
        .stdout(contains("point 1 at (800, 600)").and(contains("scratch")));

    let json = read_json(&env.lot_dir().join("0001.json"));
    assert_eq!(json["coordinates"], serde_json::json!([[800, 600]]));
    assert_eq!(json["coordinate_details"][0]["defect"], "scratch");
}

#[test]
fn session_persists_current_board_when_input_ends() {
    let env = TestEnv::new();
    rti()
        .args([
            "--config",
            &env.config_arg(),
            "session",
            "--lot",
            LOT,
            "--model",
            "MX-200",
        ])
        .write_stdin("click 5 5\nnext\nclick 6 6\nclick 7 7\n")
        .assert()
        .success();

    assert_eq!(read_json(&env.lot_dir().join("0001.json"))["total_coordinates"], 1);
    assert_eq!(read_json(&env.lot_dir().join("0002.json"))["total_coordinates"], 2);
}

#[test]
fn session_reports_unknown_commands_and_keeps_going() {
    let env = TestEnv::new();
    rti()
        .args([
            "--config",
            &env.config_arg(),
            "session",
            "--lot",
            LOT,
            "--model",
            "MX-200",
        ])
        .write_stdin("frobnicate\nclick 1 1\nsave\n")
        .assert()
        .success()
        .stderr(contains("unknown command 'frobnicate'"));

    assert!(env.lot_dir().join("0001.json").is_file());
}

#[test]
fn session_rejects_invalid_lot() {
    let env = TestEnv::new();
    rti()
        .args([
            "--config",
            &env.config_arg(),
            "session",
            "--lot",
            "1234567-99",
            "--model",
            "MX-200",
        ])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("Invalid lot number"));
}

#[test]
fn search_and_list_show_documents() {
    let env = TestEnv::new();
    seed(&env, &[1, 2]);
    let cfg = env.config_arg();

    rti()
        .args(["--config", &cfg, "search", "0002"])
        .assert()
        .success()
        .stdout(contains("0002.json").and(contains("0001.json").not()));

    rti()
        .args(["--config", &cfg, "list", LOT])
        .assert()
        .success()
        .stdout(contains("0001.json").and(contains("0002.json")));
}

#[test]
fn list_of_unknown_lot_fails() {
    let env = TestEnv::new();
    rti()
        .args(["--config", &env.config_arg(), "list", "bad-lot"])
        .assert()
        .failure()
        .stderr(contains("Invalid lot number"));
}

#[test]
fn delete_requires_privilege_and_restore_brings_it_back() {
    let env = TestEnv::new();
    seed(&env, &[1]);
    let cfg = env.config_arg();
    let doc = env.lot_dir().join("0001.json");

    rti()
        .args(["--config", &cfg, "del", LOT, "1"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
    assert!(doc.exists());

    rti()
        .args(["--config", &cfg, "del", LOT, "1", "--actor", ADMIN])
        .assert()
        .success()
        .stdout(contains("moved to"));
    assert!(!doc.exists());

    rti()
        .args(["--config", &cfg, "history", LOT])
        .assert()
        .success()
        .stdout(contains("0001_"));

    rti()
        .args(["--config", &cfg, "--worker", ADMIN, "restore", LOT, "1"])
        .assert()
        .success()
        .stdout(contains("Restored"));
    assert!(doc.exists());
}

#[test]
fn manifest_prints_lot_info() {
    let env = TestEnv::new();
    seed(&env, &[1, 3]);
    rti()
        .args(["--config", &env.config_arg(), "manifest", LOT])
        .assert()
        .success()
        .stdout(contains("json_list").and(contains("0003.json")));
}

#[test]
fn maintain_backs_up_history() {
    let env = TestEnv::new();
    seed(&env, &[1]);
    let cfg = env.config_arg();
    rti()
        .args(["--config", &cfg, "del", LOT, "1", "--actor", ADMIN])
        .assert()
        .success();

    rti()
        .args(["--config", &cfg, "maintain"])
        .assert()
        .success()
        .stdout(contains("1 history file(s) backed up"));
}

#[test]
fn log_print_shows_operations() {
    let env = TestEnv::new();
    seed(&env, &[1]);
    rti()
        .args(["--config", &env.config_arg(), "log", "--print"])
        .assert()
        .success()
        .stdout(contains("save_file").and(contains("update_manifest")));
}

#[test]
fn session_start_backs_up_and_expires_history() {
    let env = TestEnv::new();
    let history = env.lot_dir().join("history");
    let stale = history.join("0001_20230101T000000.json");
    write_raw(&stale, b"{}");
    let long_ago = SystemTime::now() - Duration::from_secs(400 * 24 * 60 * 60);
    fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(long_ago)
        .unwrap();

    rti()
        .args([
            "--config",
            &env.config_arg(),
            "session",
            "--lot",
            LOT,
            "--model",
            "MX-200",
        ])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(contains("1 history file(s) backed up").and(contains("1 expired history file(s) removed")));

    assert!(!stale.exists());
    assert!(history.join("backup").join("0001_20230101T000000.json").is_file());
}
