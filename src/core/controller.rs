//! UI-facing command surface of the engine.
//!
//! The UI calls `on_*` handlers; the controller talks back only through an
//! [`EventSink`]. Every failure is reported to the sink before it is returned,
//! and in-memory edits are never rolled back because of an I/O error.

use super::geometry::Viewport;
use super::session::{BoardSession, SessionSummary};
use super::store::AnnotationStore;
use crate::config::Config;
use crate::errors::{AppError, AppResult, ErrorKind};
use crate::files::LotFileManager;
use crate::files::layout::{FileName, parse_file_name};
use crate::models::board::Board;
use crate::models::defect::DefectCatalog;
use crate::models::lot::LotNumber;
use crate::models::point::{DetailField, DetailPatch, Point};
use crate::utils::path::file_name_of;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Notifications from the core to the UI. No widget types cross this line.
pub trait EventSink {
    fn notify_state_changed(&mut self);
    fn notify_error(&mut self, kind: ErrorKind, message: &str);
    fn notify_saved(&mut self, path: &Path);
}

/// Sink that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify_state_changed(&mut self) {}
    fn notify_error(&mut self, _kind: ErrorKind, _message: &str) {}
    fn notify_saved(&mut self, _path: &Path) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRedoState {
    pub can_undo: bool,
    pub can_redo: bool,
}

pub struct AnnotationController<S: EventSink> {
    files: LotFileManager,
    store: AnnotationStore,
    session: Option<BoardSession>,
    viewport: Viewport,
    image_path: String,
    bound_path: Option<PathBuf>,
    defects: DefectCatalog,
    worker: String,
    select_radius: f64,
    sink: S,
}

impl<S: EventSink> AnnotationController<S> {
    pub fn new(cfg: &Config, sink: S) -> AppResult<Self> {
        cfg.validate()?;
        Ok(Self {
            files: LotFileManager::new(cfg),
            store: AnnotationStore::new(cfg.undo_depth),
            session: None,
            viewport: Viewport::default(),
            image_path: String::new(),
            bound_path: None,
            defects: cfg.defect_catalog(),
            worker: cfg.worker_no.trim().to_string(),
            select_radius: cfg.select_radius,
            sink,
        })
    }

    // ------------------------------------------------
    // Helpers
    // ------------------------------------------------

    fn report<T>(&mut self, result: AppResult<T>) -> AppResult<T> {
        if let Err(e) = &result {
            tracing::debug!(kind = %e.kind(), error = %e, "controller action failed");
            self.sink.notify_error(e.kind(), &e.to_string());
        }
        result
    }

    fn session_ref(&self) -> AppResult<&BoardSession> {
        self.session
            .as_ref()
            .ok_or_else(|| AppError::Validation("no lot is open".into()))
    }

    fn session_mut(&mut self) -> AppResult<&mut BoardSession> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::Validation("no lot is open".into()))
    }

    fn lot_string(&self) -> AppResult<String> {
        Ok(self.session_ref()?.lot().to_string())
    }

    fn refresh_disk(&mut self) -> AppResult<()> {
        let lot = self.lot_string()?;
        let numbers = self.files.existing_boards(&lot)?;
        self.session_mut()?.sync_disk(numbers);
        Ok(())
    }

    /// Snapshot the current board into the session and write it to `path`.
    fn write_current(&mut self, path: &Path) -> AppResult<()> {
        let points = self.store.snapshot();
        let image = self.image_path.clone();
        let doc = self
            .session_mut()?
            .snapshot_current(&points, &image)
            .to_document();

        if let Err(e) = self.files.save(path, &doc) {
            if e.invalidates_binding() {
                self.bound_path = None;
            }
            return Err(e);
        }
        self.sink.notify_saved(path);
        Ok(())
    }

    /// Auto-save: flush to the bound document, if any.
    fn flush(&mut self) -> AppResult<()> {
        let Some(path) = self.bound_path.clone() else {
            return Ok(());
        };
        self.write_current(&path)
    }

    /// Persist the current board before leaving it. Empty unsaved boards and
    /// bound boards without changes are skipped.
    fn persist_current(&mut self) -> AppResult<()> {
        self.store.commit_detail();
        let unsaved = self.session_ref()?.has_unsaved_changes(self.store.points());
        let bound = self.bound_path.is_some();
        match (bound, unsaved) {
            (true, true) => self.flush(),
            (true, false) => Ok(()),
            (false, _) if self.store.is_empty() => Ok(()),
            (false, _) => self.save_new().map(|_| ()),
        }
    }

    /// First save of an unbound board: take a free number and bind the path.
    fn save_new(&mut self) -> AppResult<PathBuf> {
        let lot = self.lot_string()?;
        self.files.ensure_layout(&lot)?;

        let current = self.session_ref()?.current();
        let on_disk = self.files.existing_boards(&lot)?;
        let number = if on_disk.contains(&current) {
            on_disk.last().map_or(1, |m| m + 1)
        } else {
            current
        };

        if number != current {
            self.session_mut()?.set_current(number)?;
            self.store.rebind(&lot, number);
        }

        let path = self.files.board_path(&lot, number);
        self.write_current(&path)?;
        self.bound_path = Some(path.clone());

        self.files.reload_manifest(&lot)?;
        self.refresh_disk()?;
        Ok(path)
    }

    /// Make `number` the current board, loading it from disk when it exists.
    fn switch_to(&mut self, number: u32) -> AppResult<()> {
        let lot = self.lot_string()?;
        let path = self.files.board_path(&lot, number);

        let loaded = if self.session_ref()?.exists_on_disk(number) && path.is_file() {
            let doc = self.files.open(&path)?;
            Some(Board::from_document(&doc, Some(number))?)
        } else {
            None
        };

        let session = self.session_mut()?;
        session.set_current(number)?;
        self.store.rebind(&lot, number);

        match loaded {
            Some(mut board) => {
                board.number = number;
                board.lot = lot.clone();
                let mut points = board.points.clone();
                crate::models::point::renumber(&mut points, &lot, number);
                board.points = points.clone();
                if !board.image_path.is_empty() {
                    self.image_path = board.image_path.clone();
                }
                self.session_mut()?.insert_board(board);
                self.store.replace_all(points);
                self.bound_path = Some(path);
            }
            None => {
                self.store.replace_all(Vec::new());
                self.bound_path = None;
            }
        }
        Ok(())
    }

    // ------------------------------------------------
    // Session setup
    // ------------------------------------------------

    /// Start a session for `(date, model, lot)`. Any previous session ends.
    pub fn open_lot(&mut self, lot: &str, model: &str, date: Option<NaiveDate>) -> AppResult<()> {
        let result = self.open_lot_inner(lot, model, date);
        let result = self.report(result);
        self.sink.notify_state_changed();
        result
    }

    fn open_lot_inner(&mut self, lot: &str, model: &str, date: Option<NaiveDate>) -> AppResult<()> {
        let lot = LotNumber::parse(lot)?;
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let mut session = BoardSession::new(lot.clone(), model, &self.worker, date)?;

        if self.session.is_some() {
            self.persist_current()?;
        }

        self.files.ensure_layout(lot.as_str())?;
        self.files.reload_manifest(lot.as_str())?;
        session.sync_disk(self.files.existing_boards(lot.as_str())?);

        let first = session.next_new();
        session.set_current(first)?;
        self.store.rebind(lot.as_str(), first);
        self.store.replace_all(Vec::new());
        self.bound_path = None;
        self.session = Some(session);

        tracing::info!(lot = %lot, board = first, "lot session opened");
        Ok(())
    }

    pub fn close_lot(&mut self) -> AppResult<()> {
        if self.session.is_some() {
            let result = self.persist_current();
            self.report(result)?;
        }
        self.session = None;
        self.bound_path = None;
        self.store.replace_all(Vec::new());
        self.sink.notify_state_changed();
        Ok(())
    }

    /// Image shown for the current board, fitted into the canvas.
    pub fn set_image(
        &mut self,
        image_path: &str,
        original_w: u32,
        original_h: u32,
        canvas_w: u32,
        canvas_h: u32,
    ) -> AppResult<()> {
        let viewport = Viewport::fit(original_w, original_h, canvas_w, canvas_h);
        let viewport = self.report(viewport)?;
        self.viewport = viewport;
        self.image_path = image_path.to_string();
        self.sink.notify_state_changed();
        Ok(())
    }

    pub fn set_image_path(&mut self, image_path: &str) {
        self.image_path = image_path.to_string();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> AppResult<()> {
        if !viewport.scale.is_finite() || viewport.scale <= 0.0 {
            let err = AppError::Validation(format!(
                "scale must be a positive finite number, got {}",
                viewport.scale
            ));
            return self.report(Err(err));
        }
        self.viewport = viewport;
        Ok(())
    }

    // ------------------------------------------------
    // Point events
    // ------------------------------------------------

    /// Left click: add a point under the cursor and select it.
    /// Returns the new ordinal, or `None` when the click is outside the image.
    pub fn on_click(&mut self, display_x: f64, display_y: f64) -> AppResult<Option<usize>> {
        let result = self.click_inner(display_x, display_y);
        self.report(result)
    }

    fn click_inner(&mut self, display_x: f64, display_y: f64) -> AppResult<Option<usize>> {
        self.session_ref()?;
        let Some((x, y)) = self.viewport.to_original(display_x, display_y) else {
            tracing::debug!(display_x, display_y, "click outside the image ignored");
            return Ok(None);
        };

        let ordinal = self.store.append(x, y, None);
        self.store.select(Some(ordinal - 1));
        self.sink.notify_state_changed();
        self.flush()?;
        Ok(Some(ordinal))
    }

    /// Right click: select the nearest point within the selection radius.
    pub fn on_select(&mut self, display_x: f64, display_y: f64) -> Option<usize> {
        let radius_sq = self.select_radius * self.select_radius;
        let mut best: Option<(usize, f64)> = None;

        for (i, p) in self.store.points().iter().enumerate() {
            let (px, py) = self.viewport.to_display(p.x, p.y);
            let (ddx, ddy) = (px as f64 - display_x, py as f64 - display_y);
            let d = ddx * ddx + ddy * ddy;
            if d <= radius_sq && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }

        let found = best.map(|(i, _)| i);
        if found.is_some() {
            self.change_selection(found);
        }
        found
    }

    /// Select by list index (`None` clears the selection).
    pub fn select_index(&mut self, index: Option<usize>) {
        self.change_selection(index);
    }

    /// Moving the selection closes the detail window; a detail edit committed
    /// that way is flushed like an explicit commit.
    fn change_selection(&mut self, index: Option<usize>) {
        let pending = self.store.has_pending_detail();
        self.store.select(index);
        self.sink.notify_state_changed();
        if pending && !self.store.has_pending_detail() {
            let result = self.flush();
            let _ = self.report(result);
        }
    }

    pub fn on_detail_change(&mut self, field: DetailField, value: &str) -> AppResult<()> {
        let result = self.detail_change_inner(field, value);
        self.report(result)
    }

    fn detail_change_inner(&mut self, field: DetailField, value: &str) -> AppResult<()> {
        let index = self
            .store
            .selected()
            .ok_or_else(|| AppError::Validation("no point selected".into()))?;

        let mut patch = DetailPatch::field(field, value)?;
        if let Some(defect) = &patch.defect
            && !defect.is_empty()
        {
            let canonical = self.defects.resolve(defect).ok_or_else(|| {
                AppError::Validation(format!("unknown defect category '{}'", defect))
            })?;
            patch.defect = Some(canonical.to_string());
        }

        if self.store.set_detail(index, &patch) {
            self.sink.notify_state_changed();
        }
        Ok(())
    }

    /// Focus left the detail form: close the coalescing window and auto-save.
    pub fn on_detail_commit(&mut self) -> AppResult<()> {
        if self.store.commit_detail() {
            self.sink.notify_state_changed();
            let result = self.flush();
            self.report(result)?;
        }
        Ok(())
    }

    pub fn on_remove_selected(&mut self) -> AppResult<bool> {
        let Some(index) = self.store.selected() else {
            return Ok(false);
        };
        self.store.remove(index);
        self.sink.notify_state_changed();
        let result = self.flush();
        self.report(result)?;
        Ok(true)
    }

    pub fn on_move_selected(&mut self, display_x: f64, display_y: f64) -> AppResult<bool> {
        let Some(index) = self.store.selected() else {
            return Ok(false);
        };
        let Some((x, y)) = self.viewport.to_original(display_x, display_y) else {
            return Ok(false);
        };
        self.store.update_position(index, x, y);
        self.sink.notify_state_changed();
        let result = self.flush();
        self.report(result)?;
        Ok(true)
    }

    pub fn on_clear(&mut self) -> AppResult<bool> {
        if !self.store.clear() {
            return Ok(false);
        }
        self.sink.notify_state_changed();
        let result = self.flush();
        self.report(result)?;
        Ok(true)
    }

    pub fn on_undo(&mut self) -> AppResult<bool> {
        let changed = self.store.undo();
        self.sink.notify_state_changed();
        if changed {
            let result = self.flush();
            self.report(result)?;
        }
        Ok(changed)
    }

    pub fn on_redo(&mut self) -> AppResult<bool> {
        let changed = self.store.redo();
        self.sink.notify_state_changed();
        if changed {
            let result = self.flush();
            self.report(result)?;
        }
        Ok(changed)
    }

    // ------------------------------------------------
    // Persistence and navigation
    // ------------------------------------------------

    /// Save the current board, allocating `NNNN.json` on first save.
    pub fn on_save(&mut self) -> AppResult<PathBuf> {
        let result = self.save_inner();
        let result = self.report(result);
        self.sink.notify_state_changed();
        result
    }

    fn save_inner(&mut self) -> AppResult<PathBuf> {
        self.session_ref()?;
        self.store.commit_detail();
        match self.bound_path.clone() {
            Some(path) => {
                self.write_current(&path)?;
                Ok(path)
            }
            None => self.save_new(),
        }
    }

    /// Returns the board switched to, or `None` at the first board.
    pub fn on_prev_board(&mut self) -> AppResult<Option<u32>> {
        let result = self.navigate(Direction::Previous);
        self.finish_navigation(result)
    }

    /// Next existing board, or a new one past the last.
    pub fn on_next_board(&mut self) -> AppResult<Option<u32>> {
        let result = self.navigate(Direction::Next);
        self.finish_navigation(result)
    }

    pub fn on_new_board(&mut self) -> AppResult<Option<u32>> {
        let result = self.navigate(Direction::New);
        self.finish_navigation(result)
    }

    fn finish_navigation(&mut self, result: AppResult<u32>) -> AppResult<Option<u32>> {
        let out = match result {
            Ok(n) => Ok(Some(n)),
            Err(AppError::NoSuchBoard(msg)) => {
                self.sink.notify_error(ErrorKind::NoSuchBoard, &msg);
                Ok(None)
            }
            Err(e) => self.report(Err(e)),
        };
        self.sink.notify_state_changed();
        out
    }

    fn navigate(&mut self, direction: Direction) -> AppResult<u32> {
        self.session_ref()?;
        self.persist_current()?;
        self.refresh_disk()?;

        let session = self.session_ref()?;
        let current = session.current();
        let target = match direction {
            Direction::Previous => session.previous_existing()?,
            Direction::Next => session.next_existing().unwrap_or_else(|_| session.next_new()),
            Direction::New => session.next_new(),
        };

        if target == current {
            return Err(AppError::NoSuchBoard(format!(
                "board {} is already the last one",
                current
            )));
        }

        self.switch_to(target)?;
        tracing::debug!(from = current, to = target, "board switched");
        Ok(target)
    }

    /// Soft-delete the current board (privileged) and move to the largest
    /// remaining one. Returns the new current board number.
    pub fn on_delete_board(&mut self) -> AppResult<u32> {
        let result = self.delete_inner();
        let result = self.report(result);
        self.sink.notify_state_changed();
        result
    }

    fn delete_inner(&mut self) -> AppResult<u32> {
        let lot = self.lot_string()?;
        let current = self.session_ref()?.current();
        let path = self.files.board_path(&lot, current);

        if path.is_file() {
            let actor = self.worker.clone();
            let outcome = self.files.soft_delete(&path, &lot, &actor)?;
            if outcome.integrity == crate::files::Integrity::Mismatch {
                self.sink.notify_error(
                    ErrorKind::IntegrityWarning,
                    &format!("history copy {} differs from the original", outcome.history_path.display()),
                );
            }
            self.files.reload_manifest(&lot)?;
        }

        self.bound_path = None;
        self.store.replace_all(Vec::new());
        self.refresh_disk()?;
        let next = self.session_mut()?.delete_current();
        self.session_mut()?.set_current(next)?;
        self.switch_to(next)?;
        Ok(next)
    }

    /// Open an arbitrary document. The document is loaded even when its image
    /// is missing; the missing image is reported separately.
    pub fn on_load(&mut self, path: &Path) -> AppResult<()> {
        let result = self.load_inner(path);
        let result = self.report(result);
        self.sink.notify_state_changed();
        result
    }

    fn load_inner(&mut self, path: &Path) -> AppResult<()> {
        let doc = self.files.open(path)?;
        let fallback = match parse_file_name(&file_name_of(path)) {
            FileName::Current(n) | FileName::Legacy { sequence: n, .. } => Some(n),
            _ => None,
        };
        let board = Board::from_document(&doc, fallback)?;

        let same_lot = self
            .session
            .as_ref()
            .is_some_and(|s| s.lot().as_str() == doc.lot_number);

        if same_lot {
            self.persist_current()?;
        } else {
            let model = if doc.model.is_empty() {
                self.session.as_ref().map(|s| s.model().to_string()).unwrap_or_default()
            } else {
                doc.model.clone()
            };
            let date = self.session.as_ref().map(|s| s.date());
            self.open_lot_inner(&doc.lot_number, &model, date)?;
        }

        let lot = self.lot_string()?;
        let number = board.number;
        let mut points = board.points.clone();
        crate::models::point::renumber(&mut points, &lot, number);

        let session = self.session_mut()?;
        session.set_current(number)?;
        session.insert_board(Board {
            points: points.clone(),
            ..board.clone()
        });
        self.store.rebind(&lot, number);
        self.store.replace_all(points);
        self.image_path = board.image_path.clone();
        self.bound_path = Some(path.to_path_buf());
        self.refresh_disk()?;

        if !board.image_path.is_empty() && !Path::new(&board.image_path).exists() {
            self.sink.notify_error(
                ErrorKind::NotFound,
                &format!("image not found: {}", board.image_path),
            );
        }
        Ok(())
    }

    // ------------------------------------------------
    // Read-only accessors
    // ------------------------------------------------

    pub fn selected_point(&self) -> Option<&Point> {
        self.store.selected_point()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.store.selected()
    }

    pub fn points(&self) -> &[Point] {
        self.store.points()
    }

    pub fn undo_redo_state(&self) -> UndoRedoState {
        UndoRedoState {
            can_undo: self.store.can_undo(),
            can_redo: self.store.can_redo(),
        }
    }

    pub fn board_summary(&self) -> Option<SessionSummary> {
        self.session.as_ref().map(BoardSession::summary)
    }

    pub fn session(&self) -> Option<&BoardSession> {
        self.session.as_ref()
    }

    pub fn bound_path(&self) -> Option<&Path> {
        self.bound_path.as_deref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn defects(&self) -> &DefectCatalog {
        &self.defects
    }

    pub fn files(&self) -> &LotFileManager {
        &self.files
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Previous,
    Next,
    New,
}
