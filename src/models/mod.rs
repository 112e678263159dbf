pub mod board;
pub mod defect;
pub mod lot;
pub mod point;
pub mod repair;

pub use board::{Board, BoardDocument};
pub use defect::DefectCatalog;
pub use lot::LotNumber;
pub use point::{DetailField, DetailPatch, Point, PointDetail};
pub use repair::RepairState;
