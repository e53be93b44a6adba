use anyhow::Context;
use clap::Parser;
use plotkit::cli::Cli;
use plotkit::output::{default_gcode_path, write_atomic};
use plotkit::{init_logging, Config, PlotSession, RunOutcome};
use plotkit_core::ProgressUpdate;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    init_logging(&config.logging.level, config.logging.json)?;
    tracing::info!("PlotKit {} (built {})", plotkit::VERSION, plotkit::BUILD_DATE);

    if let Some(path) = &cli.save_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
        tracing::info!("Saved configuration to {}", path.display());
    }

    let markup = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let session = PlotSession::new(config.plot.clone())
        .with_timeout(config.processing.timeout())
        .with_debounce(config.processing.debounce())
        .with_progress_observer(Arc::new(|update: &ProgressUpdate| {
            tracing::debug!("{:>5.1}% {}", update.percent, update.message);
        }));

    let result = match session.submit(&markup).await {
        RunOutcome::Completed(result) => result,
        outcome => {
            let message = outcome
                .user_message()
                .unwrap_or_else(|| "Processing was cancelled.".to_string());
            anyhow::bail!("{}", message);
        }
    };

    let gcode_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_gcode_path(&cli.input));
    write_atomic(&gcode_path, &result.gcode)?;
    tracing::info!("G-code written to {}", gcode_path.display());

    if let Some(path) = &cli.preview {
        write_atomic(path, &result.preview_svg)?;
        tracing::info!("Preview written to {}", path.display());
    }

    if let Some(path) = &cli.events {
        let json = result.events_json().context("Failed to serialize toolpath events")?;
        write_atomic(path, &json)?;
        tracing::info!("Toolpath events written to {}", path.display());
    }

    println!("{}", result.statistics);
    Ok(())
}
