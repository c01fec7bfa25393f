//! `hostcompat boot` command

use anyhow::Result;

use crate::cli::BootArgs;
use crate::commands::GlobalContext;
use hostcompat::core::format_duration;
use hostcompat::ops::{self, BootOptions};
use hostcompat::profiler::{self, ConsoleRenderer, ProfilerRenderer};

pub fn execute(args: BootArgs, ctx: &GlobalContext) -> Result<()> {
    let opts = BootOptions::from_config(&ctx.config)?;
    let session = ctx.session()?;

    profiler::reset();
    let report = ops::boot(session.handle(), &opts)?;
    let timings = profiler::take();
    session.save()?;

    println!("Booted on {}", report.shim);
    println!("  Modules:  {}", report.modules.join(", "));
    println!("  Visits:   {}", report.visits);
    if !report.counted {
        println!(
            "  (not counted, last visit was within {})",
            format_duration(opts.visit_cooldown)
        );
    }

    if args.profile {
        println!();
        ConsoleRenderer.render(&timings, &mut std::io::stdout().lock())?;
    }
    if let Some(path) = &args.profile_json {
        timings.write_json(path)?;
        tracing::info!("profiler report written to {}", path.display());
    }

    Ok(())
}
