use clap::Parser;
use supplier_map::utils::{logger, validation::Validate};
use supplier_map::{
    CliArgs, EtlEngine, LocalStorage, MapError, MapPipeline, MapSettings, RunOutcome,
    SupabaseClient, SupabaseConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting supplier-map");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // Credentials come first so a missing variable aborts before any I/O.
    let credentials = SupabaseConfig::from_env()
        .and_then(|config| config.validate().map(|_| config))
        .unwrap_or_else(|e| abort_on_config_error(&e));

    let settings = args
        .load_settings()
        .and_then(|settings| settings.validate().map(|_| settings))
        .unwrap_or_else(|e| abort_on_config_error(&e));

    tracing::info!("✅ Configuration loaded and validated");

    let source = SupabaseClient::new(credentials.clone(), &settings.source)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        display_plan(&credentials, &settings, &source)?;
        return Ok(());
    }

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(settings.output.directory.clone());
    let pipeline = MapPipeline::new(storage, source, settings);
    let engine = EtlEngine::new_with_monitoring(pipeline, args.monitor);

    match engine.run().await {
        Ok(RunOutcome::Written { path, markers }) => {
            tracing::info!("🗺️ Map generated: {} ({} markers)", path, markers);
            println!("🗺️ Map generated: {}", path);
        }
        Ok(RunOutcome::NoData) => {
            println!("No suppliers with coordinates.");
        }
        Err(e) => {
            tracing::error!(
                "❌ Map generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn abort_on_config_error(e: &MapError) -> ! {
    tracing::error!("❌ Configuration validation failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

fn display_plan(
    credentials: &SupabaseConfig,
    settings: &MapSettings,
    source: &SupabaseClient,
) -> anyhow::Result<()> {
    println!();
    println!("📋 Planned run:");
    println!("  Database: {}", credentials.url);
    println!("  Query: {}", source.query_url()?);
    println!("  Output: {}", settings.output_file_path().display());
    println!("  Title: {}", settings.map.title);
    println!(
        "  Initial view: ({}, {}) zoom {}",
        settings.map.center_lat, settings.map.center_lng, settings.map.zoom
    );
    println!();
    println!("✅ Dry run complete.");
    Ok(())
}
