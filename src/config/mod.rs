#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod settings;

pub use env::SupabaseConfig;
pub use settings::MapSettings;
