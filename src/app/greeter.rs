//! Greets whoever picks up the MOTD item.

use crate::app::module::{AppError, AppModule, ModuleContext};
use crate::core::text::TextComponent;
use crate::host::HolderId;

/// Renders the message of the day and stores it as an item's display name.
pub struct GreeterModule {
    holder: HolderId,
    motd: String,
    ctx: Option<ModuleContext>,
    rendered: Option<String>,
}

impl GreeterModule {
    pub const NAME: &'static str = "greeter";

    pub fn new(holder: HolderId, motd: impl Into<String>) -> Self {
        GreeterModule {
            holder,
            motd: motd.into(),
            ctx: None,
            rendered: None,
        }
    }

    /// Host JSON written on start.
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }
}

impl AppModule for GreeterModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, ctx: &ModuleContext) -> Result<(), AppError> {
        self.ctx = Some(ctx.clone());
        Ok(())
    }

    fn start(&mut self) -> Result<(), AppError> {
        let ctx = self
            .ctx
            .as_ref()
            .ok_or_else(|| AppError::NotInitialized(Self::NAME.to_string()))?;

        let text = TextComponent::from_markup(&self.motd);
        let handle = ctx.handle();
        handle.set_display_name(&self.holder, &text)?;
        let json = handle.render_text(&text)?;

        tracing::info!("motd on {}: {}", self.holder, text.plain_text());
        self.rendered = Some(json);
        Ok(())
    }
}
