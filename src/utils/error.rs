use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Settings file error: {message}")]
    ConfigFileError { message: String },

    #[error("Supplier fetch failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Supplier query rejected (HTTP {status}): {message}")]
    QueryError { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Fetch,
    Render,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::MissingConfigError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::ConfigFileError { .. }
            | MapError::UrlError(_) => ErrorCategory::Configuration,
            MapError::HttpError(_) | MapError::QueryError { .. } => ErrorCategory::Fetch,
            MapError::SerializationError(_) => ErrorCategory::Render,
            MapError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Fetch => ErrorSeverity::Medium,
            ErrorCategory::Render | ErrorCategory::Storage => ErrorSeverity::High,
        }
    }

    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High | ErrorSeverity::Critical => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MapError::MissingConfigError { field } => {
                format!("{} is not set; the map cannot be generated.", field)
            }
            MapError::InvalidConfigValueError { field, reason, .. } => {
                format!("{} is invalid: {}", field, reason)
            }
            MapError::ConfigFileError { message } => {
                format!("Could not read the settings file: {}", message)
            }
            MapError::HttpError(e) if e.is_connect() => {
                "Could not connect to the supplier database.".to_string()
            }
            MapError::HttpError(e) if e.is_decode() => {
                "The supplier database returned a response that could not be read.".to_string()
            }
            MapError::HttpError(_) => "Fetching suppliers failed.".to_string(),
            MapError::QueryError { status, message } => {
                format!("The supplier query was rejected ({}): {}", status, message)
            }
            MapError::UrlError(e) => format!("The database URL is malformed: {}", e),
            MapError::IoError(e) => format!("Writing the map failed: {}", e),
            MapError::SerializationError(e) => format!("Encoding supplier data failed: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MapError::MissingConfigError { .. } => {
                "Export SUPABASE_URL and SUPABASE_KEY before running."
            }
            MapError::InvalidConfigValueError { .. } | MapError::UrlError(_) => {
                "Check the value against the project settings (URLs need http:// or https://)."
            }
            MapError::ConfigFileError { .. } => "Check the TOML syntax of the --config file.",
            MapError::HttpError(_) => "Check network access and that the project is online.",
            MapError::QueryError { status, .. } if *status == 401 || *status == 403 => {
                "Check that SUPABASE_KEY is valid and can read the view."
            }
            MapError::QueryError { .. } => "Check that the view and its columns exist.",
            MapError::IoError(_) => "Check that the output directory is writable.",
            MapError::SerializationError(_) => "Inspect the fetched rows for unexpected values.",
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
