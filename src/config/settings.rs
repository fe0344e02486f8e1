use crate::utils::error::{MapError, Result};
use crate::utils::validation::{
    validate_file_name, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything about a run that is not a credential. All sections are
/// optional in the TOML file; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub map: MapViewSettings,
    pub source: SourceSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewSettings {
    pub title: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub marker_radius: u32,
}

impl Default for MapViewSettings {
    fn default() -> Self {
        Self {
            title: "Mapa Fornecedores Brasil".to_string(),
            center_lat: -14.2350,
            center_lng: -51.9253,
            zoom: 4,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap".to_string(),
            marker_radius: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub view: String,
    pub no_coordinates_sentinel: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            view: "view_fornecedores_servicos_ativos".to_string(),
            no_coordinates_sentinel: "NO_COORDS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: String,
    pub file_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: "docs".to_string(),
            file_name: "index.html".to_string(),
        }
    }
}

impl MapSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| MapError::ConfigFileError {
            message: format!("{}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content, |name| std::env::var(name).ok());
        toml::from_str(&processed).map_err(|e| MapError::ConfigFileError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn output_file_path(&self) -> PathBuf {
        Path::new(&self.output.directory).join(&self.output.file_name)
    }
}

/// Replaces `${NAME}` with the value `lookup` returns. Unknown names are left
/// in place so the validation error points at them.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid");
    re.replace_all(content, |caps: &Captures| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

impl Validate for MapSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("map.title", &self.map.title)?;
        validate_range("map.center_lat", self.map.center_lat, -90.0, 90.0)?;
        validate_range("map.center_lng", self.map.center_lng, -180.0, 180.0)?;
        validate_range("map.zoom", self.map.zoom, 0, 19)?;
        validate_range("map.marker_radius", self.map.marker_radius, 1, 50)?;

        // Leaflet placeholders are not valid URL host syntax, swap them for
        // concrete values before parsing.
        let sample_url = self
            .map
            .tile_url
            .replace("{s}", "a")
            .replace("{z}", "0")
            .replace("{x}", "0")
            .replace("{y}", "0")
            .replace("{r}", "");
        validate_url("map.tile_url", &sample_url)?;

        validate_non_empty_string("source.view", &self.source.view)?;
        validate_non_empty_string(
            "source.no_coordinates_sentinel",
            &self.source.no_coordinates_sentinel,
        )?;
        validate_path("output.directory", &self.output.directory)?;
        validate_file_name("output.file_name", &self.output.file_name)?;
        Ok(())
    }
}
