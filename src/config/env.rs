use crate::utils::error::{MapError, Result};
use crate::utils::validation::{validate_url, Validate};
use std::fmt;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_KEY";

/// Connection parameters for the supplier database.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Absent and blank
    /// values are both treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| MapError::MissingConfigError {
                    field: name.to_string(),
                })
        };

        Ok(Self {
            url: required(SUPABASE_URL_VAR)?,
            key: required(SUPABASE_KEY_VAR)?,
        })
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Validate for SupabaseConfig {
    fn validate(&self) -> Result<()> {
        validate_url(SUPABASE_URL_VAR, &self.url)
    }
}
