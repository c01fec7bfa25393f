//! Text rendering operations.

use anyhow::{Context, Result};

use crate::core::text::TextComponent;
use crate::dispatch::CapabilityHandle;
use crate::host::HolderId;

/// Render markup as host JSON, or as plain text when `plain` is set.
pub fn text_render(handle: &CapabilityHandle, markup: &str, plain: bool) -> Result<String> {
    let text = TextComponent::from_markup(markup);
    if plain {
        return Ok(text.plain_text());
    }
    handle
        .render_text(&text)
        .context("failed to render text for this host")
}

/// Set an item's display name from markup. Returns the host JSON written.
pub fn text_name(handle: &CapabilityHandle, item: &HolderId, markup: &str) -> Result<String> {
    let text = TextComponent::from_markup(markup);
    handle
        .set_display_name(item, &text)
        .with_context(|| format!("failed to set display name of {}", item))?;
    text_render(handle, markup, false)
}
