//! hostcompat CLI - drive the compatibility layer against a simulated host

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::GlobalContext;
use hostcompat::compat::CompatError;
use hostcompat::dispatch::DispatchError;
use hostcompat::util::config::{self, load_config, Config};
use hostcompat::util::diagnostic::{emit, suggestions, Diagnostic};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    let config = resolve_config(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_filter(cli.verbose)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let ctx = GlobalContext { config, color };

    match cli.command {
        Commands::Shims(args) => commands::shims::execute(args, &ctx),
        Commands::Resolve => commands::resolve::execute(&ctx),
        Commands::Data(args) => commands::data::execute(args, &ctx),
        Commands::Model(args) => commands::model::execute(args, &ctx),
        Commands::Text(args) => commands::text::execute(args, &ctx),
        Commands::Boot(args) => commands::boot::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Global config, then the project file, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let project_path = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            path.clone()
        }
        None => config::project_config_path(&std::env::current_dir()?),
    };
    let global_path = config::global_config_path().unwrap_or_else(|| PathBuf::from(""));

    let mut config = load_config(&global_path, &project_path);
    if let Some(version) = &cli.host_version {
        config.host.version = Some(version.clone());
    }
    if let Some(state) = &cli.state {
        config.host.state = Some(state.clone());
    }
    Ok(config)
}

fn report(err: &anyhow::Error, color: bool) {
    if let Some(dispatch) = err.downcast_ref::<DispatchError>() {
        let mut diag = dispatch.to_diagnostic();
        if matches!(dispatch, DispatchError::UnsupportedVersion { .. }) {
            diag = diag
                .with_suggestion(suggestions::LIST_SHIMS)
                .with_suggestion(suggestions::HOST_VERSION);
        }
        emit(&diag, color);
        return;
    }

    if let Some(CompatError::WrongHolder { operation, .. }) = err.downcast_ref::<CompatError>() {
        let diag = Diagnostic::error(format!("{:#}", err))
            .with_context(format!("`{}` only applies to items", operation))
            .with_suggestion(suggestions::HOLDER_FORMAT);
        emit(&diag, color);
        return;
    }

    emit(&Diagnostic::error(format!("{:#}", err)), color);
}
