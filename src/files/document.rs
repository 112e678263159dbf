//! Reading and writing `NNNN.json` annotation documents.

use super::LotFileManager;
use super::attrs;
use super::audit::action;
use super::encoding::{self, SourceEncoding};
use crate::errors::{AppError, AppResult};
use crate::models::board::BoardDocument;
use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A decoded document and the encoding it was stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct Opened {
    pub document: BoardDocument,
    pub encoding: SourceEncoding,
}

/// Parse raw document bytes, trying UTF-8 with BOM, UTF-8, then CP932.
pub fn decode_document(bytes: &[u8]) -> AppResult<Opened> {
    let mut last_error: Option<String> = None;

    for (enc, text) in encoding::candidates(bytes) {
        match serde_json::from_str::<BoardDocument>(&text) {
            Ok(doc) => {
                return Ok(Opened {
                    document: doc.normalized(),
                    encoding: enc,
                });
            }
            Err(e) => last_error = Some(format!("{} ({})", e, enc.as_str())),
        }
    }

    Err(AppError::Decode(
        last_error.unwrap_or_else(|| "not valid UTF-8 or CP932 text".to_string()),
    ))
}

/// Pretty-printed UTF-8 JSON (no BOM) with a trailing newline.
pub fn encode_document(doc: &BoardDocument) -> AppResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(doc)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write through a sibling temp file and rename it over the target.
pub(crate) fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = temp_path_for(path);
    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

impl LotFileManager {
    /// Write `document` to `path`. `total_coordinates` and the detail list
    /// are normalized, and an empty `created_at` is stamped with now.
    pub fn save(&self, path: &Path, document: &BoardDocument) -> AppResult<()> {
        let _guard = self
            .locks()
            .guard(path)
            .ok_or_else(|| AppError::Locked(path.display().to_string()))?;

        let mut doc = document.clone().normalized();
        if doc.created_at.is_empty() {
            doc.created_at = Local::now().to_rfc3339();
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::WriteFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        attrs::unhide_if_exists(path);

        let bytes = encode_document(&doc)?;
        write_replacing(path, &bytes).map_err(|e| AppError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), points = doc.total_coordinates, "document saved");
        self.audit_quiet(self.user(), action::SAVE_FILE, path);
        Ok(())
    }

    pub fn open(&self, path: &Path) -> AppResult<BoardDocument> {
        Ok(self.open_with_encoding(path)?.document)
    }

    /// Like [`LotFileManager::open`], also reporting the source encoding.
    pub fn open_with_encoding(&self, path: &Path) -> AppResult<Opened> {
        if !path.is_file() {
            return Err(AppError::NotFound(path.display().to_string()));
        }

        let bytes = fs::read(path)?;
        let opened = decode_document(&bytes).map_err(|e| match e {
            AppError::Decode(msg) => AppError::Decode(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        if opened.encoding == SourceEncoding::ShiftJis {
            tracing::info!(path = %path.display(), "document decoded from legacy CP932");
        }

        self.audit_quiet(self.user(), action::OPEN_FILE, path);
        Ok(opened)
    }
}
