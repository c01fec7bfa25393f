//! Counts application starts on a server-wide holder.
//!
//! The count lives in an `int` value; the time of the last counted start
//! lives next to it as a `long` of unix seconds. Starts within the
//! configured cooldown of the last counted one are not counted.

use std::time::Duration;

use crate::app::module::{AppError, AppModule, ModuleContext};
use crate::app::services::Clock;
use crate::core::data::DataValue;
use crate::core::duration::format_duration;
use crate::core::key::NamespacedKey;
use crate::host::HolderId;

/// How visits are counted. Read from the module's services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitPolicy {
    /// Minimum time between counted visits; zero counts every start
    pub cooldown: Duration,
}

struct Bound {
    ctx: ModuleContext,
    count_key: NamespacedKey,
    last_key: NamespacedKey,
}

/// Counts how often the application has started, in an `int` data value.
pub struct VisitCounterModule {
    holder: HolderId,
    key_name: String,
    bound: Option<Bound>,
    count: Option<i32>,
    counted: bool,
}

impl VisitCounterModule {
    pub const NAME: &'static str = "visit-counter";

    pub fn new(holder: HolderId, key_name: impl Into<String>) -> Self {
        VisitCounterModule {
            holder,
            key_name: key_name.into(),
            bound: None,
            count: None,
            counted: false,
        }
    }

    /// Count after the last start.
    pub fn count(&self) -> Option<i32> {
        self.count
    }

    /// Whether the last start was counted.
    pub fn counted(&self) -> bool {
        self.counted
    }
}

fn unexpected(key: &NamespacedKey, expected: &'static str, found: &DataValue) -> AppError {
    AppError::UnexpectedValue {
        key: key.clone(),
        expected,
        found: found.type_name(),
    }
}

impl AppModule for VisitCounterModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, ctx: &ModuleContext) -> Result<(), AppError> {
        let count_key = ctx.key(&self.key_name)?;
        let last_key = ctx.key(&format!("{}.last", self.key_name))?;
        self.bound = Some(Bound {
            ctx: ctx.clone(),
            count_key,
            last_key,
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), AppError> {
        let Bound {
            ctx,
            count_key,
            last_key,
        } = self
            .bound
            .as_ref()
            .ok_or_else(|| AppError::NotInitialized(Self::NAME.to_string()))?;
        let handle = ctx.handle();
        let policy = ctx.service::<VisitPolicy>().map(|p| *p).unwrap_or_default();
        let now = ctx.service::<Clock>().map(|c| *c).unwrap_or_default().now();

        let previous = match handle.read_data(&self.holder, count_key)? {
            None => 0,
            Some(DataValue::Int(n)) => n,
            Some(other) => return Err(unexpected(count_key, "int", &other)),
        };
        let last = match handle.read_data(&self.holder, last_key)? {
            None => None,
            Some(DataValue::Long(at)) => Some(at),
            Some(other) => return Err(unexpected(last_key, "long", &other)),
        };

        let since_last = last.and_then(|at| u64::try_from(now.timestamp() - at).ok());
        if let Some(since) = since_last {
            if since < policy.cooldown.as_secs() {
                tracing::info!(
                    "{} stays {}: last visit {} ago, cooldown {}",
                    count_key,
                    previous,
                    format_duration(Duration::from_secs(since)),
                    format_duration(policy.cooldown)
                );
                self.count = Some(previous);
                self.counted = false;
                return Ok(());
            }
        }

        let count = previous.saturating_add(1);
        handle.write_data(&self.holder, count_key, &DataValue::Int(count))?;
        handle.write_data(&self.holder, last_key, &DataValue::Long(now.timestamp()))?;
        tracing::info!("{} = {}", count_key, count);
        self.count = Some(count);
        self.counted = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AppError> {
        if let Some(count) = self.count {
            tracing::debug!("visit counter stopping at {}", count);
        }
        Ok(())
    }
}
