//! Directory layout and file-name conventions of a lot directory.
//!
//! ```text
//! <root>/
//!   <lot>/
//!     NNNN.json
//!     lotInfo.json
//!     history/
//!       NNNN_YYYYMMDDTHHMMSS.json
//!       backup/
//!   operation_log.csv
//! ```

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

pub const MANIFEST_FILE: &str = "lotInfo.json";
pub const HISTORY_DIR: &str = "history";
pub const BACKUP_DIR: &str = "backup";
pub const AUDIT_FILE: &str = "operation_log.csv";
pub const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

static CURRENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4,})\.json$").expect("valid current-name regex"));
static LEGACY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{7}-(?:10|20))_([0-9]+)\.json$").expect("valid legacy-name regex")
});
static HISTORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)_([0-9]{8}T[0-9]{6})\.json$").expect("valid history-name regex")
});

/// Classification of a file name found in a lot directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileName {
    /// `NNNN.json`
    Current(u32),
    /// `<lot>_NNN.json`, recognised but never produced.
    Legacy { lot: String, sequence: u32 },
    /// `<stem>_YYYYMMDDTHHMMSS.json`
    History {
        stem: String,
        sequence: Option<u32>,
        stamp: NaiveDateTime,
    },
    Other,
}

impl FileName {
    pub fn sequence(&self) -> Option<u32> {
        match self {
            FileName::Current(n) => Some(*n),
            FileName::Legacy { sequence, .. } => Some(*sequence),
            FileName::History { sequence, .. } => *sequence,
            FileName::Other => None,
        }
    }

    pub fn is_board_document(&self) -> bool {
        matches!(self, FileName::Current(_) | FileName::Legacy { .. })
    }
}

pub fn parse_file_name(name: &str) -> FileName {
    if let Some(c) = CURRENT_RE.captures(name)
        && let Ok(n) = c[1].parse::<u32>()
    {
        return FileName::Current(n);
    }

    if let Some(c) = LEGACY_RE.captures(name)
        && let Ok(n) = c[2].parse::<u32>()
    {
        return FileName::Legacy {
            lot: c[1].to_string(),
            sequence: n,
        };
    }

    if let Some(c) = HISTORY_RE.captures(name)
        && let Ok(stamp) = NaiveDateTime::parse_from_str(&c[2], STAMP_FORMAT)
    {
        let stem = c[1].to_string();
        let sequence = stem
            .parse::<u32>()
            .ok()
            .or_else(|| match parse_file_name(&format!("{stem}.json")) {
                FileName::Legacy { sequence, .. } => Some(sequence),
                _ => None,
            });
        return FileName::History {
            stem,
            sequence,
            stamp,
        };
    }

    FileName::Other
}

/// `NNNN.json`, zero-padded to four digits.
pub fn board_file_name(n: u32) -> String {
    format!("{:04}.json", n)
}

pub fn history_file_name(stem: &str, stamp: &NaiveDateTime) -> String {
    format!("{}_{}.json", stem, stamp.format(STAMP_FORMAT))
}
