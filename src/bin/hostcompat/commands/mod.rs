//! Command implementations

pub mod boot;
pub mod completions;
pub mod data;
pub mod model;
pub mod resolve;
pub mod shims;
pub mod text;

use anyhow::Result;
use hostcompat::ops::Session;
use hostcompat::util::config::Config;
use hostcompat::util::diagnostic::{emit, Diagnostic};

/// State shared by every command.
pub struct GlobalContext {
    pub config: Config,
    pub color: bool,
}

impl GlobalContext {
    /// Resolve the configured host and publish the process-wide handle.
    pub fn session(&self) -> Result<Session> {
        let session = Session::open(&self.config)?;
        if let (Some(from), Some(path)) = (session.upgraded_from(), session.state_path()) {
            let diag = Diagnostic::note(format!(
                "host state was saved by {}, now running {}",
                from,
                session.handle().version()
            ))
            .with_location(path)
            .with_context("stored data carries over; custom model data is migrated when read");
            emit(&diag, self.color);
        }
        Ok(session)
    }
}
