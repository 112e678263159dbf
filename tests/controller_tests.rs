use boardmark::core::geometry::Viewport;
use boardmark::errors::{AppError, ErrorKind};
use boardmark::models::board::BoardDocument;
use boardmark::models::point::DetailField;
use boardmark::models::repair::RepairState;
use std::fs;

mod common;
use common::{ADMIN, LOT, TestEnv, read_json};

const MODEL: &str = "MX-200";

#[test]
fn click_then_save_writes_the_first_board() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.set_viewport(Viewport::with_scale(0.5)).unwrap();

    assert_eq!(ctl.on_click(400.0, 300.0).unwrap(), Some(1));
    let p = &ctl.points()[0];
    assert_eq!((p.x, p.y, p.ordinal), (800, 600, 1));
    assert_eq!(ctl.selected_index(), Some(0));

    let path = ctl.on_save().unwrap();
    assert_eq!(path, env.lot_dir().join("0001.json"));
    let json = read_json(&path);
    assert_eq!(json["coordinates"], serde_json::json!([[800, 600]]));
    assert_eq!(json["board_number"], 1);
    assert_eq!(json["model"], MODEL);
    assert_eq!(json["worker_no"], "A001");
    assert_eq!(ctl.sink().saved, vec![path.clone()]);
    assert_eq!(ctl.bound_path(), Some(path.as_path()));
}

#[test]
fn undo_past_creation_through_the_controller() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    for x in [10.0, 20.0, 30.0] {
        ctl.on_click(x, x).unwrap();
    }

    for _ in 0..3 {
        assert!(ctl.on_undo().unwrap());
    }
    assert!(ctl.points().is_empty());
    let state = ctl.undo_redo_state();
    assert!(!state.can_undo);
    assert!(state.can_redo);

    for _ in 0..3 {
        assert!(ctl.on_redo().unwrap());
    }
    let xs: Vec<u32> = ctl.points().iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![10, 20, 30]);
}

#[test]
fn switching_boards_persists_and_restores_points() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(100.0, 100.0).unwrap();
    ctl.on_click(200.0, 150.0).unwrap();

    assert_eq!(ctl.on_next_board().unwrap(), Some(2));
    let saved = read_json(&env.lot_dir().join("0001.json"));
    assert_eq!(saved["total_coordinates"], 2);
    assert!(ctl.points().is_empty());
    assert_eq!(ctl.board_summary().unwrap().current, 2);
    assert_eq!(ctl.bound_path(), None);

    assert_eq!(ctl.on_prev_board().unwrap(), Some(1));
    let xs: Vec<(u32, u32)> = ctl.points().iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(xs, vec![(100, 100), (200, 150)]);
    assert_eq!(
        ctl.bound_path(),
        Some(env.lot_dir().join("0001.json").as_path())
    );
    // Switching discards history.
    assert!(!ctl.undo_redo_state().can_undo);
}

#[test]
fn empty_unsaved_board_is_not_written_on_switch() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(1.0, 1.0).unwrap();
    ctl.on_new_board().unwrap();
    assert_eq!(ctl.board_summary().unwrap().current, 2);

    assert_eq!(ctl.on_prev_board().unwrap(), Some(1));
    assert!(!env.lot_dir().join("0002.json").exists());
}

#[test]
fn navigation_past_the_ends_is_reported() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();

    assert_eq!(ctl.on_prev_board().unwrap(), None);
    assert_eq!(ctl.on_next_board().unwrap(), None);
    assert_eq!(
        ctl.sink().kinds(),
        vec![ErrorKind::NoSuchBoard, ErrorKind::NoSuchBoard]
    );
    assert_eq!(ctl.board_summary().unwrap().current, 1);
}

#[test]
fn reopening_a_lot_composes_after_the_last_board() {
    let env = TestEnv::new();
    {
        let mut ctl = env.controller();
        ctl.open_lot(LOT, MODEL, None).unwrap();
        ctl.on_click(5.0, 5.0).unwrap();
        ctl.on_save().unwrap();
    }
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    assert_eq!(ctl.board_summary().unwrap().current, 2);
    assert!(ctl.points().is_empty());
}

#[test]
fn bound_documents_are_auto_saved() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(10.0, 10.0).unwrap();
    let path = ctl.on_save().unwrap();

    ctl.on_click(20.0, 20.0).unwrap();
    assert_eq!(read_json(&path)["total_coordinates"], 2);

    ctl.on_detail_change(DetailField::Defect, "Scratch").unwrap();
    ctl.on_detail_change(DetailField::Repair, "no").unwrap();
    ctl.on_detail_commit().unwrap();
    let json = read_json(&path);
    assert_eq!(json["coordinate_details"][1]["defect"], "scratch");
    assert_eq!(json["coordinate_details"][1]["repaired"], false);

    ctl.on_undo().unwrap();
    let json = read_json(&path);
    assert_eq!(json["coordinate_details"][1]["defect"], "");
    assert_eq!(
        ctl.points()[1].detail.repaired,
        RepairState::Unset
    );
}

#[test]
fn unbound_boards_are_not_flushed() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(10.0, 10.0).unwrap();
    ctl.on_undo().unwrap();
    assert!(!env.lot_dir().join("0001.json").exists());
    assert!(ctl.sink().saved.is_empty());
}

#[test]
fn detail_changes_are_validated() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();

    let err = ctl.on_detail_change(DetailField::Comment, "x").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    ctl.on_click(10.0, 10.0).unwrap();
    assert!(matches!(
        ctl.on_detail_change(DetailField::Defect, "bogus"),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        ctl.on_detail_change(DetailField::Repair, "maybe"),
        Err(AppError::Validation(_))
    ));
    assert_eq!(ctl.sink().kinds(), vec![ErrorKind::ValidationError; 3]);

    ctl.on_detail_change(DetailField::Defect, "").unwrap();
    ctl.on_detail_change(DetailField::Reference, " R101 ").unwrap();
    assert_eq!(ctl.selected_point().unwrap().detail.reference, "R101");
}

#[test]
fn right_click_selects_nearest_with_smaller_index_on_ties() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(10.0, 10.0).unwrap();
    ctl.on_click(30.0, 10.0).unwrap();
    ctl.select_index(None);

    assert_eq!(ctl.on_select(20.0, 10.0), Some(0));
    assert_eq!(ctl.on_select(29.0, 12.0), Some(1));
    assert_eq!(ctl.on_select(200.0, 200.0), None);
    assert_eq!(ctl.selected_index(), Some(1));
}

#[test]
fn clicks_outside_the_image_are_ignored() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.set_image("/img/a.png", 800, 600, 400, 400).unwrap();

    assert_eq!(ctl.on_click(450.0, 10.0).unwrap(), None);
    assert!(ctl.points().is_empty());
    assert_eq!(ctl.on_click(399.0, 299.0).unwrap(), Some(1));
}

#[test]
fn actions_need_an_open_lot() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    assert!(matches!(
        ctl.on_click(1.0, 1.0),
        Err(AppError::Validation(_))
    ));
    assert!(ctl.on_save().is_err());
}

#[test]
fn invalid_lot_is_rejected_without_side_effects() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    assert!(matches!(
        ctl.open_lot("12345-10", MODEL, None),
        Err(AppError::InvalidLotNumber(_))
    ));
    assert!(ctl.session().is_none());
    assert_eq!(ctl.sink().kinds(), vec![ErrorKind::InvalidLotNumber]);
    assert!(!env.root().join("12345-10").exists());
}

#[test]
fn unprivileged_board_delete_is_refused() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(1.0, 1.0).unwrap();
    let path = ctl.on_save().unwrap();

    assert!(matches!(
        ctl.on_delete_board(),
        Err(AppError::PermissionDenied(_))
    ));
    assert!(path.exists());
    assert_eq!(ctl.points().len(), 1);
    assert_eq!(ctl.sink().kinds(), vec![ErrorKind::PermissionDenied]);
}

#[test]
fn privileged_delete_moves_to_the_largest_remaining_board() {
    let env = TestEnv::new();
    let cfg = env.as_worker(ADMIN);
    let mut ctl =
        boardmark::core::AnnotationController::new(&cfg, common::RecordingSink::default())
            .unwrap();
    ctl.open_lot(LOT, MODEL, None).unwrap();

    ctl.on_click(1.0, 1.0).unwrap();
    ctl.on_next_board().unwrap();
    ctl.on_click(2.0, 2.0).unwrap();
    ctl.on_click(3.0, 3.0).unwrap();
    ctl.on_save().unwrap();
    assert_eq!(ctl.board_summary().unwrap().current, 2);

    assert_eq!(ctl.on_delete_board().unwrap(), 1);
    assert!(!env.lot_dir().join("0002.json").exists());
    assert_eq!(ctl.points().len(), 1);

    let history = ctl.files().list_history(LOT).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].filename.starts_with("0002_"));

    let manifest = ctl.files().read_manifest(LOT).unwrap().unwrap();
    assert_eq!(manifest.json_list, vec!["0001.json"]);
}

#[test]
fn loading_a_document_switches_lot_and_binds_it() {
    let env = TestEnv::new();
    let other = "7654321-20";
    let files = env.files();
    let path = files.board_path(other, 4);
    let doc = BoardDocument {
        model: "ZX-9".into(),
        coordinates: vec![[11, 22], [33, 44]],
        image_path: env.dir.path().join("missing.png").to_string_lossy().to_string(),
        coordinate_details: Vec::new(),
        lot_number: other.into(),
        worker_no: "B002".into(),
        created_at: "2025-01-01T00:00:00+00:00".into(),
        total_coordinates: 2,
        board_number: 4,
    };
    files.save(&path, &doc).unwrap();

    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_load(&path).unwrap();

    let session = ctl.session().unwrap();
    assert_eq!(session.lot().as_str(), other);
    assert_eq!(session.model(), "ZX-9");
    assert_eq!(session.current(), 4);
    assert_eq!(ctl.points().len(), 2);
    assert_eq!(ctl.bound_path(), Some(path.as_path()));
    // The image is missing, which is reported but does not block loading.
    assert_eq!(ctl.sink().kinds(), vec![ErrorKind::NotFound]);

    ctl.on_click(50.0, 60.0).unwrap();
    let json = read_json(&path);
    assert_eq!(json["total_coordinates"], 3);
    assert_eq!(json["created_at"], "2025-01-01T00:00:00+00:00");
}

#[test]
fn loading_a_missing_document_fails() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    let missing = env.lot_dir().join("0042.json");
    assert!(matches!(ctl.on_load(&missing), Err(AppError::NotFound(_))));
    assert_eq!(ctl.sink().kinds(), vec![ErrorKind::NotFound]);
}

#[test]
fn write_failure_keeps_points_and_drops_the_binding() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(1.0, 1.0).unwrap();
    let path = ctl.on_save().unwrap();

    // A directory in place of the document makes the next write fail.
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    assert!(ctl.on_click(2.0, 2.0).is_err());
    assert_eq!(ctl.points().len(), 2);
    assert_eq!(ctl.bound_path(), None);
    assert_eq!(ctl.sink().kinds(), vec![ErrorKind::IoFailure]);
}

#[test]
fn changing_lots_saves_the_unsaved_board() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(10.0, 10.0).unwrap();
    ctl.on_click(20.0, 20.0).unwrap();
    assert!(ctl.bound_path().is_none());

    ctl.open_lot("7654321-20", MODEL, None).unwrap();

    let json = read_json(&env.lot_dir().join("0001.json"));
    assert_eq!(json["total_coordinates"], 2);
    assert!(ctl.sink().errors.is_empty());
    assert_eq!(ctl.session().unwrap().lot().as_str(), "7654321-20");
    assert!(ctl.points().is_empty());
}

#[test]
fn moving_the_selection_flushes_the_committed_detail() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    ctl.open_lot(LOT, MODEL, None).unwrap();
    ctl.on_click(10.0, 10.0).unwrap();
    ctl.on_click(30.0, 10.0).unwrap();
    let path = ctl.on_save().unwrap();

    ctl.select_index(Some(0));
    ctl.on_detail_change(DetailField::Comment, "cracked").unwrap();
    assert_eq!(read_json(&path)["coordinate_details"][0]["comment"], "");

    assert_eq!(ctl.on_select(30.0, 10.0), Some(1));
    assert_eq!(read_json(&path)["coordinate_details"][0]["comment"], "cracked");

    ctl.on_detail_change(DetailField::Reference, "C7").unwrap();
    ctl.select_index(None);
    ctl.on_detail_commit().unwrap();
    let json = read_json(&path);
    assert_eq!(json["coordinate_details"][0]["comment"], "cracked");
    assert_eq!(json["coordinate_details"][1]["reference"], "C7");
    assert!(ctl.undo_redo_state().can_undo);
}

#[test]
fn non_finite_scale_is_rejected() {
    let env = TestEnv::new();
    let mut ctl = env.controller();
    for scale in [f64::INFINITY, f64::NAN, 0.0, -2.0] {
        assert!(matches!(
            ctl.set_viewport(Viewport::with_scale(scale)),
            Err(AppError::Validation(_))
        ));
    }
    assert_eq!(ctl.viewport().scale, 1.0);
    assert_eq!(ctl.sink().kinds(), vec![ErrorKind::ValidationError; 4]);
}
