pub mod controller;
pub mod geometry;
pub mod log;
pub mod session;
pub mod store;

pub use controller::{AnnotationController, EventSink, NullSink, UndoRedoState};
pub use geometry::Viewport;
pub use session::{BoardSession, SessionSummary};
pub use store::AnnotationStore;
