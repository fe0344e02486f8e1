// Adapters layer: concrete implementations for external systems.

pub mod storage;
pub mod supabase;

pub use storage::LocalStorage;
pub use supabase::SupabaseClient;
