pub mod etl;
pub mod markers;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{MapMarker, RenderedMap, RunOutcome, SupplierRecord};
pub use crate::domain::ports::{Pipeline, Storage, SupplierSource};
pub use crate::utils::error::Result;
