//! Configurable defect enumeration.

use std::fs;
use std::path::Path;

/// Categories used when no defect list file is configured or readable.
pub const DEFAULT_DEFECTS: [&str; 10] = [
    "shift",
    "flipped",
    "skip",
    "scratch",
    "stain",
    "chip",
    "discolouration",
    "dimensional",
    "shape",
    "other",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectCatalog {
    names: Vec<String>,
}

impl Default for DefectCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DefectCatalog {
    pub fn builtin() -> Self {
        Self {
            names: DEFAULT_DEFECTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a newline-delimited list. Blank lines and `#` comments are
    /// skipped, duplicates keep their first position.
    pub fn from_text(text: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for line in text.lines() {
            let name = line.trim().trim_start_matches('\u{feff}');
            if name.is_empty() || name.starts_with('#') {
                continue;
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Self { names }
    }

    /// Load from `path`; a missing, unreadable or empty file falls back to the built-in list.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };

        match fs::read_to_string(path) {
            Ok(text) => {
                let catalog = Self::from_text(&text);
                if catalog.names.is_empty() {
                    tracing::warn!(path = %path.display(), "defect list is empty, using defaults");
                    Self::builtin()
                } else {
                    catalog
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read defect list, using defaults");
                Self::builtin()
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Canonical spelling of `name` (case-insensitive lookup).
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.names
            .iter()
            .find(|n| n.to_lowercase() == wanted)
            .map(|n| n.as_str())
    }
}
