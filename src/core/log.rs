//! Console rendering of `operation_log.csv`.

use crate::errors::AppResult;
use crate::files::LotFileManager;
use crate::files::audit::{AuditRecord, action};
use ansi_term::Colour;
use unicode_width::UnicodeWidthStr;

const PATH_WIDTH: usize = 60;

/// Colour of an audit action. Denied operations are suffixed with the
/// attempted action (`permission_denied:move_to_history`).
fn color_for_action(op: &str) -> Colour {
    match op {
        action::SAVE_FILE => Colour::Green,
        action::OPEN_FILE => Colour::Cyan,
        action::MOVE_TO_HISTORY | action::GC_HISTORY => Colour::Red,
        action::RESTORE_LATEST => Colour::Yellow,
        action::BACKUP_HISTORY => Colour::Blue,
        action::UPDATE_MANIFEST => Colour::Purple,
        action::LOCK_FILE | action::UNLOCK_FILE => Colour::Fixed(244),
        action::INIT => Colour::RGB(255, 153, 51),
        other if other.starts_with(action::PERMISSION_DENIED) => Colour::Red,
        _ => Colour::White,
    }
}

/// Keep the tail of long paths, where the file name is.
fn shorten_path(path: &str) -> String {
    if UnicodeWidthStr::width(path) <= PATH_WIDTH {
        return path.to_string();
    }
    let chars: Vec<char> = path.chars().collect();
    let keep = PATH_WIDTH - 3;
    let tail: String = chars[chars.len().saturating_sub(keep)..].iter().collect();
    format!("...{}", tail)
}

pub struct AuditLogic;

impl AuditLogic {
    /// Audit rows, optionally only the last `tail`.
    pub fn rows(files: &LotFileManager, tail: Option<usize>) -> AppResult<Vec<AuditRecord>> {
        let mut rows = files.read_audit()?;
        if let Some(n) = tail
            && rows.len() > n
        {
            rows.drain(..rows.len() - n);
        }
        Ok(rows)
    }

    pub fn print_log(files: &LotFileManager, tail: Option<usize>) -> AppResult<()> {
        let rows = Self::rows(files, tail)?;
        if rows.is_empty() {
            println!("📜 Operation log is empty ({})", files.audit_path().display());
            return Ok(());
        }

        let id_w = rows.len().to_string().len();
        let ts_w = rows.iter().map(|r| r.timestamp.len()).max().unwrap_or(19);
        let user_w = rows
            .iter()
            .map(|r| UnicodeWidthStr::width(r.user.as_str()))
            .max()
            .unwrap_or(4);
        let op_w = rows.iter().map(|r| r.action.len()).max().unwrap_or(10);

        println!("📜 Operation log:\n");

        for (i, row) in rows.iter().enumerate() {
            let colour = color_for_action(&row.action);
            let padding = " ".repeat(op_w.saturating_sub(row.action.len()));
            let user_pad =
                " ".repeat(user_w.saturating_sub(UnicodeWidthStr::width(row.user.as_str())));

            println!(
                "{:>id_w$}: {:<ts_w$} | {}{} | {}{} => {}",
                i + 1,
                row.timestamp,
                row.user,
                user_pad,
                colour.paint(row.action.as_str()),
                padding,
                shorten_path(&row.path),
                id_w = id_w,
                ts_w = ts_w
            );
        }

        Ok(())
    }
}
