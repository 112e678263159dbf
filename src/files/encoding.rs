//! Text decoding for annotation documents.
//!
//! Readers accept UTF-8 with or without BOM and fall back to CP932
//! (Shift-JIS) written by older Windows tools. Writers always emit UTF-8.

use encoding_rs::SHIFT_JIS;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8Bom,
    Utf8,
    ShiftJis,
}

impl SourceEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8Bom => "utf-8-sig",
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::ShiftJis => "cp932",
        }
    }
}

/// Candidate decodings of `bytes`, in the order they must be tried.
pub fn candidates(bytes: &[u8]) -> Vec<(SourceEncoding, String)> {
    let mut out = Vec::new();

    if let Some(rest) = bytes.strip_prefix(UTF8_BOM)
        && let Ok(s) = std::str::from_utf8(rest)
    {
        out.push((SourceEncoding::Utf8Bom, s.to_string()));
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        out.push((SourceEncoding::Utf8, s.to_string()));
    }

    if let Some(s) = SHIFT_JIS.decode_without_bom_handling_and_without_replacement(bytes) {
        out.push((SourceEncoding::ShiftJis, s.into_owned()));
    }

    out
}
