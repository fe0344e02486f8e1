pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{LocalStorage, SupabaseClient};
pub use config::{MapSettings, SupabaseConfig};
pub use crate::core::{etl::EtlEngine, pipeline::MapPipeline};
pub use domain::model::{RunOutcome, ServiceOffering, SupplierRecord};
pub use utils::error::{MapError, Result};
