use super::point::{Point, PointDetail, renumber};
use crate::errors::{AppError, AppResult};
use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};

/// On-disk annotation document (`NNNN.json`). Key order is part of the format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDocument {
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "de_coordinates")]
    pub coordinates: Vec<[u32; 2]>,
    #[serde(default)]
    pub image_path: String,
    #[serde(default, deserialize_with = "de_details")]
    pub coordinate_details: Vec<PointDetail>,
    #[serde(default)]
    pub lot_number: String,
    #[serde(default)]
    pub worker_no: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub total_coordinates: usize,
    #[serde(default)]
    pub board_number: u32,
}

impl BoardDocument {
    /// Make `coordinate_details` parallel to `coordinates` and recompute the total.
    pub fn normalize(&mut self) {
        let n = self.coordinates.len();
        self.coordinate_details.resize_with(n, PointDetail::default);
        self.total_coordinates = n;
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

/// Accept integer or floating coordinates (older writers emitted floats).
fn de_coordinates<'de, D>(deserializer: D) -> Result<Vec<[u32; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<Vec<(serde_json::Number, serde_json::Number)>> =
        Option::deserialize(deserializer)?;

    let to_pixel = |n: &serde_json::Number| -> Result<u32, D::Error> {
        let v = if let Some(i) = n.as_u64() {
            i as f64
        } else {
            n.as_f64()
                .ok_or_else(|| D::Error::custom(format!("invalid coordinate {n}")))?
        };
        if v < 0.0 || v > u32::MAX as f64 {
            return Err(D::Error::custom(format!("coordinate out of range: {n}")));
        }
        Ok(v.floor() as u32)
    };

    raw.unwrap_or_default()
        .iter()
        .map(|(x, y)| Ok([to_pixel(x)?, to_pixel(y)?]))
        .collect()
}

/// `null` entries read as empty details.
fn de_details<'de, D>(deserializer: D) -> Result<Vec<PointDetail>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<PointDetail>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// One physical board's annotations, as held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub number: u32,
    pub points: Vec<Point>,
    pub image_path: String,
    pub model: String,
    pub lot: String,
    pub worker: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Board {
    pub fn new(number: u32, lot: &str, model: &str, worker: &str, image_path: &str) -> Self {
        let now = Local::now().to_rfc3339();
        Self {
            number,
            points: Vec::new(),
            image_path: image_path.to_string(),
            model: model.to_string(),
            lot: lot.to_string(),
            worker: worker.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn total_points(&self) -> usize {
        self.points.len()
    }

    pub fn to_document(&self) -> BoardDocument {
        BoardDocument {
            model: self.model.clone(),
            coordinates: self.points.iter().map(|p| [p.x, p.y]).collect(),
            image_path: self.image_path.clone(),
            coordinate_details: self.points.iter().map(|p| p.detail.clone()).collect(),
            lot_number: self.lot.clone(),
            worker_no: self.worker.clone(),
            created_at: self.created_at.clone(),
            total_coordinates: self.points.len(),
            board_number: self.number,
        }
    }

    /// Rebuild a board from its document. `fallback_number` is used when the
    /// document predates the `board_number` key.
    pub fn from_document(doc: &BoardDocument, fallback_number: Option<u32>) -> AppResult<Self> {
        let number = match doc.board_number {
            0 => fallback_number.ok_or_else(|| {
                AppError::Decode("document has no board_number".to_string())
            })?,
            n => n,
        };

        let mut details = doc.coordinate_details.clone();
        details.resize_with(doc.coordinates.len(), PointDetail::default);

        let mut points: Vec<Point> = doc
            .coordinates
            .iter()
            .zip(details)
            .map(|([x, y], d)| Point::new(*x, *y, d))
            .collect();
        renumber(&mut points, &doc.lot_number, number);

        Ok(Self {
            number,
            points,
            image_path: doc.image_path.clone(),
            model: doc.model.clone(),
            lot: doc.lot_number.clone(),
            worker: doc.worker_no.clone(),
            created_at: doc.created_at.clone(),
            updated_at: doc.created_at.clone(),
        })
    }
}
