//! Point list of the board being edited, with bounded undo/redo and selection.

use crate::models::point::{DetailPatch, Point, PointDetail, renumber};
use std::collections::VecDeque;

pub const DEFAULT_UNDO_DEPTH: usize = 50;

/// Bounded snapshot stacks. Pushing a new undo entry clears redo.
#[derive(Debug, Clone)]
pub struct UndoLog {
    undo: VecDeque<Vec<Point>>,
    redo: VecDeque<Vec<Point>>,
    depth: usize,
}

impl UndoLog {
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            depth: depth.max(1),
        }
    }

    /// Record the state before a destructive mutation.
    pub fn push(&mut self, snapshot: Vec<Point>) {
        Self::push_bounded(&mut self.undo, snapshot, self.depth);
        self.redo.clear();
    }

    fn push_bounded(stack: &mut VecDeque<Vec<Point>>, snapshot: Vec<Point>, depth: usize) {
        stack.push_back(snapshot);
        while stack.len() > depth {
            stack.pop_front();
        }
    }

    /// Pop the newest undo entry, parking `current` on the redo stack.
    fn undo(&mut self, current: Vec<Point>) -> Option<Vec<Point>> {
        let prev = self.undo.pop_back()?;
        Self::push_bounded(&mut self.redo, current, self.depth);
        Some(prev)
    }

    fn redo(&mut self, current: Vec<Point>) -> Option<Vec<Point>> {
        let next = self.redo.pop_back()?;
        Self::push_bounded(&mut self.undo, current, self.depth);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Exclusive owner of the current board's points.
///
/// Detail edits are coalesced: the first `set_detail` after a snapshot
/// remembers the pre-edit list, and that list is pushed as one undo entry when
/// the edit window closes (`commit_detail`, selection change, any structural
/// mutation, undo/redo). `replace_all` discards it together with the history.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    points: Vec<Point>,
    selected: Option<usize>,
    log: UndoLog,
    pending_detail: Option<Vec<Point>>,
    lot: String,
    board: u32,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl AnnotationStore {
    pub fn new(undo_depth: usize) -> Self {
        Self {
            points: Vec::new(),
            selected: None,
            log: UndoLog::new(undo_depth),
            pending_detail: None,
            lot: String::new(),
            board: 1,
        }
    }

    /// Lot and board the point ids are derived from.
    pub fn identity(&self) -> (&str, u32) {
        (&self.lot, self.board)
    }

    /// Change the id basis without touching history (board renumbered on first save).
    pub fn rebind(&mut self, lot: &str, board: u32) {
        self.lot = lot.to_string();
        self.board = board;
        self.renumber();
        let (lot, board) = (self.lot.clone(), self.board);
        for snapshot in self
            .log
            .undo
            .iter_mut()
            .chain(self.log.redo.iter_mut())
            .chain(self.pending_detail.iter_mut())
        {
            renumber(snapshot, &lot, board);
        }
    }

    fn renumber(&mut self) {
        renumber(&mut self.points, &self.lot, self.board);
    }

    fn begin_mutation(&mut self) {
        self.commit_detail();
        self.log.push(self.points.clone());
    }

    pub fn append(&mut self, x: u32, y: u32, detail: Option<PointDetail>) -> usize {
        self.begin_mutation();
        self.points.push(Point::new(x, y, detail.unwrap_or_default()));
        self.renumber();
        self.points.len()
    }

    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.begin_mutation();
        self.points.remove(index);
        self.renumber();

        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        true
    }

    pub fn update_position(&mut self, index: usize, x: u32, y: u32) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.begin_mutation();
        let p = &mut self.points[index];
        p.x = x;
        p.y = y;
        true
    }

    /// Merge `patch` into the point at `index` without an immediate snapshot.
    pub fn set_detail(&mut self, index: usize, patch: &DetailPatch) -> bool {
        if index >= self.points.len() || patch.is_empty() {
            return false;
        }
        let mut updated = self.points[index].detail.clone();
        updated.merge(patch);
        if updated == self.points[index].detail {
            return false;
        }
        if self.pending_detail.is_none() {
            self.pending_detail = Some(self.points.clone());
            self.log.redo.clear();
        }
        self.points[index].detail = updated;
        true
    }

    /// Close the detail-edit window. Returns true when an undo entry was pushed.
    pub fn commit_detail(&mut self) -> bool {
        match self.pending_detail.take() {
            Some(before) if before != self.points => {
                self.log.push(before);
                true
            }
            _ => false,
        }
    }

    pub fn has_pending_detail(&self) -> bool {
        self.pending_detail.is_some()
    }

    pub fn clear(&mut self) -> bool {
        if self.points.is_empty() {
            return false;
        }
        self.begin_mutation();
        self.points.clear();
        self.selected = None;
        true
    }

    pub fn select(&mut self, index: Option<usize>) {
        let index = index.filter(|i| *i < self.points.len());
        if index != self.selected {
            self.commit_detail();
        }
        self.selected = index;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_point(&self) -> Option<&Point> {
        self.selected.and_then(|i| self.points.get(i))
    }

    /// Board switch: take over `points` and forget all history.
    pub fn replace_all(&mut self, points: Vec<Point>) {
        self.points = points;
        self.renumber();
        self.selected = None;
        self.pending_detail = None;
        self.log.clear();
    }

    pub fn undo(&mut self) -> bool {
        self.commit_detail();
        let current = self.points.clone();
        match self.log.undo(current) {
            Some(prev) => {
                self.points = prev;
                self.fix_selection();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.commit_detail();
        let current = self.points.clone();
        match self.log.redo(current) {
            Some(next) => {
                self.points = next;
                self.fix_selection();
                true
            }
            None => false,
        }
    }

    fn fix_selection(&mut self) {
        if let Some(s) = self.selected
            && s >= self.points.len()
        {
            self.selected = None;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo() || self.pending_detail.as_ref().is_some_and(|b| *b != self.points)
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Deep copy for persistence.
    pub fn snapshot(&self) -> Vec<Point> {
        self.points.clone()
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.log
    }
}
