use boardmark::core::session::BoardSession;
use boardmark::errors::AppError;
use boardmark::models::lot::{LotNumber, is_valid_lot};
use boardmark::models::point::{Point, PointDetail};
use chrono::NaiveDate;

fn session() -> BoardSession {
    let lot = LotNumber::parse("1234567-20").unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    BoardSession::new(lot, "MX-200", "A001", date).unwrap()
}

fn points(n: u32) -> Vec<Point> {
    (0..n).map(|i| Point::new(i, i, PointDetail::default())).collect()
}

#[test]
fn lot_number_shape() {
    assert!(is_valid_lot("1234567-10"));
    assert!(is_valid_lot("0000000-20"));
    assert!(!is_valid_lot("1234567-30"));
    assert!(!is_valid_lot("123456-10"));
    assert!(!is_valid_lot("1234567-10 "));
    assert!(matches!(
        LotNumber::parse("12a4567-10"),
        Err(AppError::InvalidLotNumber(_))
    ));
}

#[test]
fn session_requires_model_and_worker() {
    let lot = LotNumber::parse("1234567-10").unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert!(matches!(
        BoardSession::new(lot.clone(), " ", "A001", date),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        BoardSession::new(lot, "MX", "", date),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn board_numbers_start_at_one() {
    let mut s = session();
    assert_eq!(s.current(), 1);
    assert!(matches!(s.set_current(0), Err(AppError::Validation(_))));
    assert_eq!(s.current(), 1);
}

#[test]
fn navigation_follows_disk_listing() {
    let mut s = session();
    s.sync_disk([1, 3, 4]);
    s.set_current(3).unwrap();

    assert_eq!(s.next_existing().unwrap(), 4);
    assert_eq!(s.previous_existing().unwrap(), 1);
    assert_eq!(s.next_new(), 5);

    s.set_current(4).unwrap();
    assert!(matches!(s.next_existing(), Err(AppError::NoSuchBoard(_))));
    s.set_current(1).unwrap();
    assert!(matches!(s.previous_existing(), Err(AppError::NoSuchBoard(_))));
}

#[test]
fn empty_lot_composes_board_one() {
    let s = session();
    assert_eq!(s.next_new(), 1);
    assert!(s.on_disk().is_empty());
}

#[test]
fn unsaved_changes_compare_against_snapshot() {
    let mut s = session();
    assert!(!s.has_unsaved_changes(&[]));
    assert!(s.has_unsaved_changes(&points(1)));

    s.snapshot_current(&points(2), "/img/board.png");
    assert!(!s.has_unsaved_changes(&points(2)));
    assert!(s.has_unsaved_changes(&points(3)));

    let board = s.current_board().unwrap();
    assert_eq!(board.total_points(), 2);
    assert_eq!(board.model, "MX-200");
    assert_eq!(board.lot, "1234567-20");
    assert_eq!(board.worker, "A001");
    assert_eq!(board.image_path, "/img/board.png");
}

#[test]
fn delete_moves_to_largest_remaining() {
    let mut s = session();
    s.sync_disk([1, 2, 5]);
    s.set_current(5).unwrap();
    assert_eq!(s.delete_current(), 2);
    assert_eq!(s.current(), 2);
    assert_eq!(s.on_disk(), vec![1, 2]);

    s.sync_disk([2]);
    assert_eq!(s.delete_current(), 1);
}

#[test]
fn summary_tracks_visited_boards() {
    let mut s = session();
    s.sync_disk([1, 2, 3]);
    s.set_current(2).unwrap();
    s.set_current(3).unwrap();
    s.set_current(1).unwrap();

    let summary = s.summary();
    assert_eq!(summary.current, 1);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.list, vec![1, 2, 3]);
    assert_eq!(summary.history, vec![3, 2]);
}
