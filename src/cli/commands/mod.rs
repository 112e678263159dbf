pub mod config;
pub mod del;
pub mod history;
pub mod init;
pub mod list;
pub mod log;
pub mod maintain;
pub mod manifest;
pub mod restore;
pub mod search;
pub mod session;

use crate::files::FileEntry;
use crate::utils::date::short_stamp;
use crate::utils::table::{Column, Table};

/// Shared rendering of document listings.
pub(crate) fn entries_table(entries: &[FileEntry]) -> Table {
    let mut table = Table::new(vec![
        Column::new("FILE", 32),
        Column::new("LOT", 10),
        Column::new("BOARD", 5),
        Column::new("MODIFIED", 19),
        Column::new("PATH", 80),
    ]);
    for e in entries {
        table.add_row(vec![
            e.filename.clone(),
            e.lot_number.clone().unwrap_or_else(|| "-".into()),
            e.sequence.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
            short_stamp(&e.modified),
            e.file_path.display().to_string(),
        ]);
    }
    table
}
