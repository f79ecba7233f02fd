//! Editing core for radiograph annotations: bounding boxes and polygon masks
//! drawn over an X-ray image, with pan/zoom, selection, vertex editing and a
//! save path back to the prediction record format.

pub mod annotation;
pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod guard;
pub mod record;
pub mod render;
pub mod save;
pub mod serializer;
pub mod session;
pub mod store;
pub mod tool;
pub mod viewport;

pub use annotation::{Annotation, AnnotationId, Geometry};
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use record::{HistoryRecord, SavePayload};
pub use tool::{Editor, Tool};
