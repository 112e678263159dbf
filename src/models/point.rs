use super::repair::RepairState;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for name-based point ids. Never change it: ids stored by other
/// processes must stay reproducible.
const POINT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93b7_5d08_a1e4_7c2b_90f3_d615);

/// Deterministic id of the `ordinal`-th point of `board` in `lot`.
pub fn point_id(lot: &str, board: u32, ordinal: usize) -> Uuid {
    let name = format!("{lot}/{board}/{ordinal}");
    Uuid::new_v5(&POINT_NAMESPACE, name.as_bytes())
}

/// Operator-entered metadata of a point (`coordinate_details[i]` on disk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointDetail {
    pub reference: String,
    pub defect: String,
    pub comment: String,
    pub repaired: RepairState,
}

impl PointDetail {
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
            && self.defect.is_empty()
            && self.comment.is_empty()
            && !self.repaired.is_set()
    }

    pub fn merge(&mut self, patch: &DetailPatch) {
        if let Some(r) = &patch.reference {
            self.reference = r.clone();
        }
        if let Some(d) = &patch.defect {
            self.defect = d.clone();
        }
        if let Some(c) = &patch.comment {
            self.comment = c.clone();
        }
        if let Some(rep) = patch.repaired {
            self.repaired = rep;
        }
    }
}

/// Editable detail fields, as named by the detail form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Reference,
    Defect,
    Comment,
    Repair,
}

impl DetailField {
    pub fn name(&self) -> &'static str {
        match self {
            DetailField::Reference => "reference",
            DetailField::Defect => "defect",
            DetailField::Comment => "comment",
            DetailField::Repair => "repair",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reference" | "ref" => Some(DetailField::Reference),
            "defect" => Some(DetailField::Defect),
            "comment" => Some(DetailField::Comment),
            "repair" | "repaired" => Some(DetailField::Repair),
            _ => None,
        }
    }
}

/// Partial update of a [`PointDetail`]; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPatch {
    pub reference: Option<String>,
    pub defect: Option<String>,
    pub comment: Option<String>,
    pub repaired: Option<RepairState>,
}

impl DetailPatch {
    /// Build a single-field patch from raw form input.
    pub fn field(field: DetailField, value: &str) -> AppResult<Self> {
        let mut patch = DetailPatch::default();
        match field {
            DetailField::Reference => patch.reference = Some(value.trim().to_string()),
            DetailField::Defect => patch.defect = Some(value.trim().to_string()),
            DetailField::Comment => patch.comment = Some(value.to_string()),
            DetailField::Repair => {
                let state = RepairState::from_code(value).ok_or_else(|| {
                    AppError::Validation(format!(
                        "Invalid repair flag '{}'. Use repaired, not_repaired or unset.",
                        value
                    ))
                })?;
                patch.repaired = Some(state);
            }
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_none()
            && self.defect.is_none()
            && self.comment.is_none()
            && self.repaired.is_none()
    }
}

/// One defect annotation in original-image pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub id: Uuid,
    pub x: u32,
    pub y: u32,
    pub detail: PointDetail,
    /// 1-based display number inside its board.
    pub ordinal: usize,
}

impl Point {
    pub fn new(x: u32, y: u32, detail: PointDetail) -> Self {
        Self {
            id: Uuid::nil(),
            x,
            y,
            detail,
            ordinal: 0,
        }
    }
}

/// Restore the dense `1..=N` ordinals and the ids derived from them.
pub fn renumber(points: &mut [Point], lot: &str, board: u32) {
    for (i, p) in points.iter_mut().enumerate() {
        p.ordinal = i + 1;
        p.id = point_id(lot, board, p.ordinal);
    }
}
