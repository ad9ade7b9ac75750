pub mod drag;
pub mod models;
pub mod types;

pub use drag::{DragPayload, DropZone};
pub use models::*;
pub use types::*;
