use anyhow::Context;
use clap::Parser;
use field_detection::cli::commands::{
    cmd_board, cmd_detect, cmd_registry_list, cmd_registry_validate,
};
use field_detection::cli::config::{
    Cli, Commands, RegistryAction, build_detect_settings, load_config, resolve_log_level,
    try_load_config,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > -v count > config level. The level is read before the
    // subscriber exists; the config proper is loaded after so a malformed
    // file gets its warning.
    let early = try_load_config(cli.config.as_deref()).unwrap_or_default();
    let level = resolve_log_level(cli.verbose, &early);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Detect {
            snapshots,
            board,
            registry,
            format,
            output,
            trace,
        } => {
            let settings = build_detect_settings(
                board.as_deref(),
                registry.as_deref(),
                format.as_deref(),
                trace.as_deref(),
                &config,
            )?;
            cmd_detect(&snapshots, &settings, output.as_deref(), cli.verbose)?;
        }
        Commands::Board { url } => {
            print!("{}", cmd_board(&url));
        }
        Commands::Registry { action } => {
            let out = match action {
                RegistryAction::Validate { registry } => {
                    cmd_registry_validate(registry.as_deref().or(config.detect.registry.as_deref()))
                }
                RegistryAction::List { registry, board } => cmd_registry_list(
                    registry.as_deref().or(config.detect.registry.as_deref()),
                    board.as_deref().or(config.detect.board.as_deref()),
                ),
            }
            .context("registry command failed")?;
            print!("{}", out);
        }
    }

    Ok(())
}
