use serde::{Deserialize, Serialize};

/// Repair flag of a defect point: stored on disk as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum RepairState {
    #[default]
    Unset,
    Repaired,
    NotRepaired,
}

impl RepairState {
    pub fn code(&self) -> &'static str {
        match self {
            RepairState::Unset => "unset",
            RepairState::Repaired => "repaired",
            RepairState::NotRepaired => "not_repaired",
        }
    }

    /// Convert user input (case-insensitive) → enum
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "" | "unset" | "none" | "-" => Some(RepairState::Unset),
            "repaired" | "yes" | "y" | "true" | "1" => Some(RepairState::Repaired),
            "not_repaired" | "not-repaired" | "no" | "n" | "false" | "0" => {
                Some(RepairState::NotRepaired)
            }
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, RepairState::Unset)
    }
}

impl From<Option<bool>> for RepairState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => RepairState::Repaired,
            Some(false) => RepairState::NotRepaired,
            None => RepairState::Unset,
        }
    }
}

impl From<RepairState> for Option<bool> {
    fn from(value: RepairState) -> Self {
        match value {
            RepairState::Repaired => Some(true),
            RepairState::NotRepaired => Some(false),
            RepairState::Unset => None,
        }
    }
}
