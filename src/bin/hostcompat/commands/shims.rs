//! `hostcompat shims` command
//!
//! List the registry and preview selection without constructing anything.

use anyhow::Result;

use crate::cli::{ShimsArgs, ShimsCommands};
use crate::commands::GlobalContext;
use hostcompat::core::HostVersion;
use hostcompat::dispatch::{DispatchError, ShimRegistry};

pub fn execute(args: ShimsArgs, ctx: &GlobalContext) -> Result<()> {
    let registry = ctx.config.registry()?;
    match args.command {
        ShimsCommands::List => list_shims(&registry),
        ShimsCommands::Match(match_args) => match_version(&registry, &match_args.version),
    }
}

fn list_shims(registry: &ShimRegistry) -> Result<()> {
    if registry.is_empty() {
        println!("No shims registered.");
        return Ok(());
    }

    println!("Registered shims (match order):");
    println!();

    for entry in registry.entries() {
        println!("  {} - {}", entry.name(), entry.description());
        println!("    Targets:  {}", entry.predicate());
        println!();
    }

    Ok(())
}

fn match_version(registry: &ShimRegistry, reported: &str) -> Result<()> {
    let unsupported = |parsed| DispatchError::UnsupportedVersion {
        reported: reported.to_string(),
        parsed,
        registered: registry.describe(),
    };

    let version = HostVersion::parse(reported).map_err(|_| unsupported(None))?;
    let mut matching = registry.matching(&version);

    let selected = matching
        .next()
        .ok_or_else(|| unsupported(Some(version.clone())))?;
    println!("{} -> {}", version, selected.name());

    let shadowed: Vec<_> = matching.map(|e| e.name()).collect();
    if !shadowed.is_empty() {
        println!("  also matched (shadowed): {}", shadowed.join(", "));
    }

    Ok(())
}
