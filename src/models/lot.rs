use crate::errors::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static LOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{7}-(10|20)$").expect("valid lot regex"));

/// True when `s` has the `NNNNNNN-10` / `NNNNNNN-20` lot shape.
pub fn is_valid_lot(s: &str) -> bool {
    LOT_RE.is_match(s)
}

/// Production lot code, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotNumber(String);

impl LotNumber {
    pub fn parse(s: &str) -> AppResult<Self> {
        let trimmed = s.trim();
        if is_valid_lot(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(AppError::InvalidLotNumber(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LotNumber {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LotNumber::parse(&value)
    }
}

impl From<LotNumber> for String {
    fn from(value: LotNumber) -> Self {
        value.0
    }
}

impl AsRef<str> for LotNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
