//! Coloured one-line console messages.

use crate::errors::ErrorKind;
use ansi_term::Colour;
use std::fmt;

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", Colour::Blue.bold().paint(ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", Colour::Green.bold().paint(ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", Colour::Yellow.bold().paint(ICON_WARN), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", Colour::Red.bold().paint(ICON_ERR), msg);
}

/// Error tagged with its category. Navigation stops and integrity
/// warnings are not failures, so they print as warnings.
pub fn kind_error<T: fmt::Display>(kind: ErrorKind, msg: T) {
    let tag = Colour::Fixed(244).paint(format!("[{}]", kind));
    match kind {
        ErrorKind::IntegrityWarning | ErrorKind::NoSuchBoard => warning(format!("{} {}", tag, msg)),
        _ => error(format!("{} {}", tag, msg)),
    }
}

pub fn header<T: fmt::Display>(msg: T) {
    println!(
        "{}\n",
        Colour::Blue.bold().paint(format!("====================== {}", msg))
    );
}
