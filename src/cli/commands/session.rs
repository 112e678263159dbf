//! Line-driven annotation session.
//!
//! Each stdin line is one UI event, for example:
//!
//! ```text
//! click 400 300
//! detail defect scratch
//! commit
//! save
//! next
//! ```

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::controller::{AnnotationController, EventSink};
use crate::core::geometry::Viewport;
use crate::errors::{AppError, AppResult};
use crate::files::LotFileManager;
use crate::models::point::DetailField;
use crate::ui::{ConsoleSink, messages};
use crate::utils::date::parse_session_date;
use crate::utils::table::{Column, Table};
use std::io::{self, BufRead};
use std::path::Path;

const HELP: &str = "\
commands:
  click X Y            add a point at display position X,Y
  select X Y           select the nearest point
  pick N               select point N (0 clears)
  move X Y             move the selected point
  remove               remove the selected point
  detail FIELD VALUE   set reference|defect|comment|repair on the selected point
  commit               close the current detail edit
  clear                remove every point
  undo | redo
  save
  prev | next | new    switch board
  delete               soft-delete the current board
  load PATH            open a document
  points | summary | defects
  quit";

/// `WIDTHxHEIGHT` → `(width, height)`.
pub fn parse_size(s: &str) -> AppResult<(u32, u32)> {
    let invalid = || AppError::Validation(format!("Invalid size '{}'. Use WIDTHxHEIGHT.", s));
    let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let w = w.trim().parse::<u32>().map_err(|_| invalid())?;
    let h = h.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok((w, h))
}

fn parse_xy(args: &[&str]) -> AppResult<(f64, f64)> {
    let invalid = || AppError::Validation(format!("expected X Y, got '{}'", args.join(" ")));
    match args {
        [x, y] => Ok((
            x.parse::<f64>().map_err(|_| invalid())?,
            y.parse::<f64>().map_err(|_| invalid())?,
        )),
        _ => Err(invalid()),
    }
}

fn print_points<S: EventSink>(ctl: &AnnotationController<S>) {
    if ctl.points().is_empty() {
        messages::info("No points on this board");
        return;
    }
    let mut table = Table::new(vec![
        Column::new("#", 4),
        Column::new("X", 6),
        Column::new("Y", 6),
        Column::new("REF", 12),
        Column::new("DEFECT", 16),
        Column::new("REPAIR", 12),
        Column::new("COMMENT", 40),
    ]);
    let selected = ctl.selected_index();
    for (i, p) in ctl.points().iter().enumerate() {
        let marker = if selected == Some(i) { "*" } else { "" };
        table.add_row(vec![
            format!("{}{}", p.ordinal, marker),
            p.x.to_string(),
            p.y.to_string(),
            p.detail.reference.clone(),
            p.detail.defect.clone(),
            p.detail.repaired.code().to_string(),
            p.detail.comment.clone(),
        ]);
    }
    print!("{}", table.render());
}

fn print_summary<S: EventSink>(ctl: &AnnotationController<S>) {
    let Some(summary) = ctl.board_summary() else {
        messages::info("No lot open");
        return;
    };
    let state = ctl.undo_redo_state();
    println!(
        "board {} of {:?} | points {} | undo {} | redo {} | file {}",
        summary.current,
        summary.list,
        ctl.points().len(),
        state.can_undo,
        state.can_redo,
        ctl.bound_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unsaved)".into())
    );
}

/// Apply one command line. Returns false when the session should end.
/// Controller failures have already reached the sink, so they are not
/// propagated; only malformed input is.
pub fn execute<S: EventSink>(ctl: &mut AnnotationController<S>, line: &str) -> AppResult<bool> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(true);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();
    let verb = verb.to_lowercase();

    match verb.as_str() {
        "click" => {
            let (x, y) = parse_xy(&args)?;
            if let Ok(Some(n)) = ctl.on_click(x, y)
                && let Some(p) = ctl.selected_point()
            {
                println!("point {} at ({}, {})", n, p.x, p.y);
            }
        }
        "select" => {
            let (x, y) = parse_xy(&args)?;
            match ctl.on_select(x, y) {
                Some(i) => println!("selected point {}", i + 1),
                None => messages::info("No point within range"),
            }
        }
        "pick" => {
            let n: usize = rest
                .parse()
                .map_err(|_| AppError::Validation(format!("invalid point number '{}'", rest)))?;
            ctl.select_index(n.checked_sub(1));
        }
        "move" => {
            let (x, y) = parse_xy(&args)?;
            let _ = ctl.on_move_selected(x, y);
        }
        "remove" => {
            let _ = ctl.on_remove_selected();
        }
        "detail" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = DetailField::from_name(name)
                .ok_or_else(|| AppError::Validation(format!("unknown detail field '{}'", name)))?;
            let _ = ctl.on_detail_change(field, value.trim_start());
        }
        "commit" => {
            let _ = ctl.on_detail_commit();
        }
        "clear" => {
            let _ = ctl.on_clear();
        }
        "undo" => {
            if let Ok(false) = ctl.on_undo() {
                messages::info("Nothing to undo");
            }
        }
        "redo" => {
            if let Ok(false) = ctl.on_redo() {
                messages::info("Nothing to redo");
            }
        }
        "save" => {
            let _ = ctl.on_save();
        }
        "prev" | "next" | "new" => {
            let switched = match verb.as_str() {
                "prev" => ctl.on_prev_board(),
                "next" => ctl.on_next_board(),
                _ => ctl.on_new_board(),
            };
            if let Ok(Some(n)) = switched {
                println!("board {} ({} points)", n, ctl.points().len());
            }
        }
        "delete" => {
            if let Ok(n) = ctl.on_delete_board() {
                println!("board {} ({} points)", n, ctl.points().len());
            }
        }
        "load" => {
            let _ = ctl.on_load(Path::new(rest));
        }
        "points" => print_points(ctl),
        "summary" => print_summary(ctl),
        "defects" => println!("{}", ctl.defects().names().join(", ")),
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Ok(false),
        other => {
            return Err(AppError::Validation(format!(
                "unknown command '{}' (try 'help')",
                other
            )));
        }
    }
    Ok(true)
}

/// Run commands from `reader` until it ends or `quit`.
pub fn run_script<S: EventSink, R: BufRead>(
    ctl: &mut AnnotationController<S>,
    reader: R,
) -> AppResult<()> {
    for line in reader.lines() {
        let line = line?;
        match execute(ctl, &line) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => messages::error(e),
        }
    }
    ctl.close_lot()
}

/// History backup and retention cleanup run before every session.
/// Failures are reported but never prevent the session from starting.
fn startup_maintenance(files: &LotFileManager) {
    match files.backup_all_history() {
        Ok(0) => {}
        Ok(n) => messages::info(format!("{} history file(s) backed up", n)),
        Err(e) => messages::warning(format!("History backup failed: {}", e)),
    }
    match files.gc_old_history() {
        Ok(0) => {}
        Ok(n) => messages::info(format!("{} expired history file(s) removed", n)),
        Err(e) => messages::warning(format!("History cleanup failed: {}", e)),
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Session {
        lot,
        model,
        date,
        image,
        image_size,
        canvas,
        scale,
    } = cmd
    {
        let date = parse_session_date(date.as_deref())?;
        let mut ctl = AnnotationController::new(cfg, ConsoleSink::new())?;
        startup_maintenance(ctl.files());

        match (image_size, canvas) {
            (Some(size), Some(canvas)) => {
                let (ow, oh) = parse_size(size)?;
                let (cw, ch) = parse_size(canvas)?;
                ctl.set_image(image.as_deref().unwrap_or(""), ow, oh, cw, ch)?;
            }
            (Some(size), None) => {
                let (ow, oh) = parse_size(size)?;
                let mut viewport = Viewport::with_scale(*scale);
                viewport.original_w = ow;
                viewport.original_h = oh;
                viewport.display_w = (ow as f64 * scale).floor() as u32;
                viewport.display_h = (oh as f64 * scale).floor() as u32;
                ctl.set_viewport(viewport)?;
            }
            _ => ctl.set_viewport(Viewport::with_scale(*scale))?,
        }
        if let Some(image) = image {
            ctl.set_image_path(image);
        }

        ctl.open_lot(lot, model, Some(date))?;
        messages::info(format!(
            "Lot {} model {}: composing board {}",
            lot,
            model,
            ctl.board_summary().map(|s| s.current).unwrap_or(1)
        ));

        let stdin = io::stdin();
        run_script(&mut ctl, stdin.lock())?;

        let sink = ctl.sink();
        messages::info(format!(
            "Session ended: {} save(s), {} error(s)",
            sink.saves.len(),
            sink.errors
        ));
    }
    Ok(())
}
