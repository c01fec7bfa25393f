//! `hostcompat text` command

use anyhow::Result;

use crate::cli::{TextArgs, TextCommands};
use crate::commands::GlobalContext;
use hostcompat::core::text::TextComponent;
use hostcompat::dispatch::CapabilityHandle;
use hostcompat::ops;
use hostcompat::util::diagnostic::{emit, Diagnostic};

pub fn execute(args: TextArgs, ctx: &GlobalContext) -> Result<()> {
    let session = ctx.session()?;
    let handle = session.handle();

    match args.command {
        TextCommands::Render { markup, plain } => {
            if !plain {
                warn_dropped_shadow(handle, &markup, ctx.color);
            }
            println!("{}", ops::text_render(handle, &markup, plain)?);
        }

        TextCommands::Name { item, markup } => {
            warn_dropped_shadow(handle, &markup, ctx.color);
            let json = ops::text_name(handle, &item, &markup)?;
            println!("Display name of {} = {}", item, json);
            session.save()?;
        }
    }

    Ok(())
}

/// Shadows in the markup are silently dropped by hosts that cannot render them.
fn warn_dropped_shadow(handle: &CapabilityHandle, markup: &str, color: bool) {
    if handle.capabilities().text_shadow || !TextComponent::from_markup(markup).has_shadow() {
        return;
    }
    let diag = Diagnostic::warning("text shadow dropped")
        .with_context(format!(
            "shim {} for host {} cannot render shadows",
            handle.shim_name(),
            handle.version()
        ));
    emit(&diag, color);
}
