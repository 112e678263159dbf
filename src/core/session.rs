//! Multi-board state of one open lot.

use crate::errors::{AppError, AppResult};
use crate::models::board::Board;
use crate::models::lot::LotNumber;
use crate::models::point::Point;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

const VISITED_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub current: u32,
    pub total: usize,
    pub list: Vec<u32>,
    pub history: Vec<u32>,
}

/// Boards of one `(date, model, lot)` session.
///
/// `on_disk` mirrors the lot directory listing; the controller refreshes it
/// through [`BoardSession::sync_disk`] after every save or delete.
#[derive(Debug, Clone)]
pub struct BoardSession {
    lot: LotNumber,
    model: String,
    worker: String,
    date: NaiveDate,
    current: u32,
    boards: BTreeMap<u32, Board>,
    on_disk: BTreeSet<u32>,
    visited: VecDeque<u32>,
}

impl BoardSession {
    pub fn new(lot: LotNumber, model: &str, worker: &str, date: NaiveDate) -> AppResult<Self> {
        if model.trim().is_empty() {
            return Err(AppError::Validation("model name is required".into()));
        }
        if worker.trim().is_empty() {
            return Err(AppError::Validation("worker id is required".into()));
        }

        Ok(Self {
            lot,
            model: model.trim().to_string(),
            worker: worker.trim().to_string(),
            date,
            current: 1,
            boards: BTreeMap::new(),
            on_disk: BTreeSet::new(),
            visited: VecDeque::new(),
        })
    }

    pub fn today(lot: LotNumber, model: &str, worker: &str) -> AppResult<Self> {
        Self::new(lot, model, worker, Local::now().date_naive())
    }

    pub fn lot(&self) -> &LotNumber {
        &self.lot
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn worker(&self) -> &str {
        &self.worker
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn set_current(&mut self, n: u32) -> AppResult<()> {
        if n == 0 {
            return Err(AppError::Validation("board numbers start at 1".into()));
        }
        if n != self.current {
            let current = self.current;
            self.visited.retain(|v| *v != current && *v != n);
            self.visited.push_front(self.current);
            self.visited.truncate(VISITED_LIMIT);
        }
        self.current = n;
        Ok(())
    }

    /// Replace the known on-disk board numbers.
    pub fn sync_disk<I: IntoIterator<Item = u32>>(&mut self, numbers: I) {
        self.on_disk = numbers.into_iter().filter(|n| *n > 0).collect();
    }

    pub fn on_disk(&self) -> Vec<u32> {
        self.on_disk.iter().copied().collect()
    }

    pub fn exists_on_disk(&self, n: u32) -> bool {
        self.on_disk.contains(&n)
    }

    pub fn next_existing(&self) -> AppResult<u32> {
        self.on_disk
            .range(self.current.saturating_add(1)..)
            .next()
            .copied()
            .ok_or_else(|| AppError::NoSuchBoard(format!("no board after {}", self.current)))
    }

    pub fn previous_existing(&self) -> AppResult<u32> {
        self.on_disk
            .range(..self.current)
            .next_back()
            .copied()
            .ok_or_else(|| AppError::NoSuchBoard(format!("no board before {}", self.current)))
    }

    /// Number for composing a new board.
    pub fn next_new(&self) -> u32 {
        self.on_disk.last().map_or(1, |m| m + 1)
    }

    /// Store the current board's points into the session map.
    pub fn snapshot_current(&mut self, points: &[Point], image_path: &str) -> &Board {
        let now = Local::now().to_rfc3339();
        let (lot, model, worker) = (self.lot.to_string(), self.model.clone(), self.worker.clone());
        let board = self
            .boards
            .entry(self.current)
            .or_insert_with(|| Board::new(self.current, &lot, &model, &worker, image_path));

        board.points = points.to_vec();
        board.image_path = image_path.to_string();
        board.model = model;
        board.worker = worker;
        board.lot = lot;
        board.updated_at = now;
        board
    }

    /// Register a board loaded from disk.
    pub fn insert_board(&mut self, board: Board) {
        self.boards.insert(board.number, board);
    }

    pub fn board(&self, n: u32) -> Option<&Board> {
        self.boards.get(&n)
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.boards.get(&self.current)
    }

    pub fn has_unsaved_changes(&self, points: &[Point]) -> bool {
        match self.boards.get(&self.current) {
            Some(b) => b.points != points,
            None => !points.is_empty(),
        }
    }

    /// Drop the current board; the largest remaining number (or 1) becomes current.
    pub fn delete_current(&mut self) -> u32 {
        let gone = self.current;
        self.boards.remove(&gone);
        self.on_disk.remove(&gone);
        self.visited.retain(|v| *v != gone);

        let remaining = self
            .on_disk
            .iter()
            .chain(self.boards.keys())
            .copied()
            .max()
            .unwrap_or(1);
        self.current = remaining;
        remaining
    }

    /// Forget in-memory boards; they are reloaded from disk on navigation.
    pub fn invalidate(&mut self) {
        let current = self.current;
        self.boards.retain(|n, _| *n == current);
    }

    pub fn summary(&self) -> SessionSummary {
        let mut list: BTreeSet<u32> = self.on_disk.clone();
        list.extend(self.boards.keys().copied());
        SessionSummary {
            current: self.current,
            total: list.len(),
            list: list.into_iter().collect(),
            history: self.visited.iter().copied().collect(),
        }
    }
}
