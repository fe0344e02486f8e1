use crate::config::settings::MapSettings;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "supplier-map")]
#[command(about = "Generate a static map page of supplier locations")]
pub struct CliArgs {
    /// Optional TOML file with map, source and output settings
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the page is written to (overrides output.directory)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log memory and timing after each stage
    #[arg(long)]
    pub monitor: bool,

    /// Validate configuration and show the planned run without fetching
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn load_settings(&self) -> crate::Result<MapSettings> {
        let mut settings = match &self.config {
            Some(path) => MapSettings::from_file(path)?,
            None => MapSettings::default(),
        };
        if let Some(dir) = &self.output_dir {
            settings.output.directory = dir.clone();
        }
        Ok(settings)
    }
}
