//! Best-effort hidden-file attribute. Writes never depend on it and reads
//! never look at it.

use std::path::Path;

#[cfg(windows)]
pub fn set_hidden(path: &Path, hidden: bool) {
    use std::process::Command;

    let flag = if hidden { "+H" } else { "-H" };
    match Command::new("attrib").arg(flag).arg(path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => tracing::debug!(path = %path.display(), status = %s, "attrib failed"),
        Err(e) => tracing::debug!(path = %path.display(), error = %e, "attrib unavailable"),
    }
}

#[cfg(not(windows))]
pub fn set_hidden(path: &Path, hidden: bool) {
    tracing::trace!(path = %path.display(), hidden, "hidden attribute not supported here");
}

/// Clear the attribute on an existing file before overwriting it.
pub fn unhide_if_exists(path: &Path) {
    if path.exists() {
        set_hidden(path, false);
    }
}
