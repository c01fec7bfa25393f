//! Full application lifecycle against a resolved handle.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::{
    Clock, GreeterModule, ModuleContext, ModuleManager, Services, VisitCounterModule, VisitPolicy,
};
use crate::core::data::DataValue;
use crate::core::key::NamespacedKey;
use crate::dispatch::CapabilityHandle;
use crate::host::HolderId;
use crate::profiler;
use crate::util::config::Config;

/// Item that carries the message of the day.
pub const MOTD_HOLDER: &str = "motd";
/// Entity that carries server-wide counters.
pub const SERVER_HOLDER: &str = "server";
/// Key name of the start counter.
pub const VISITS_KEY: &str = "visits";

/// Options for `boot`.
#[derive(Debug, Clone)]
pub struct BootOptions {
    /// Namespace for keys the modules write
    pub namespace: String,
    /// Markup for the greeter
    pub motd: String,
    /// Minimum time between counted visits
    pub visit_cooldown: Duration,
    /// Time source handed to the modules
    pub clock: Clock,
}

impl BootOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(BootOptions {
            namespace: config.namespace().to_string(),
            motd: config.motd().to_string(),
            visit_cooldown: config.visit_cooldown()?,
            clock: Clock::system(),
        })
    }
}

/// What a boot did.
#[derive(Debug, Clone, PartialEq)]
pub struct BootReport {
    pub shim: String,
    pub modules: Vec<String>,
    pub visits: i32,
    /// Whether this boot counted as a visit
    pub counted: bool,
}

fn read_visits(handle: &CapabilityHandle, key: &NamespacedKey) -> Result<i32> {
    Ok(match handle.read_data(&HolderId::entity(SERVER_HOLDER), key)? {
        Some(DataValue::Int(n)) => n,
        _ => 0,
    })
}

/// Register the built-in modules, then init, start and stop them.
///
/// Each phase is recorded as a profiler section under `boot`.
pub fn boot(handle: &CapabilityHandle, opts: &BootOptions) -> Result<BootReport> {
    let _boot = profiler::section("boot");
    let services = Services::new().provide(opts.clock).provide(VisitPolicy {
        cooldown: opts.visit_cooldown,
    });
    let ctx = ModuleContext::new(handle.clone(), opts.namespace.clone()).with_services(services);
    let visits_key = ctx.key(VISITS_KEY)?;
    let before = read_visits(handle, &visits_key)?;

    let mut manager = ModuleManager::new(ctx);
    manager.register(GreeterModule::new(HolderId::item(MOTD_HOLDER), opts.motd.clone()));
    manager.register(VisitCounterModule::new(
        HolderId::entity(SERVER_HOLDER),
        VISITS_KEY,
    ));
    let modules = manager.names().into_iter().map(String::from).collect();

    {
        let _init = profiler::section("init");
        manager.init_all().context("failed to initialize modules")?;
    }
    let started = {
        let _start = profiler::section("start");
        manager.start_all().context("failed to start modules")
    };
    // Modules that did start are stopped either way
    let stopped = {
        let _stop = profiler::section("stop");
        manager.stop_all().context("failed to stop modules")
    };
    started?;
    stopped?;

    let visits = read_visits(handle, &visits_key)?;
    Ok(BootReport {
        shim: handle.shim_name().to_string(),
        modules,
        visits,
        counted: visits != before,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::DateTime;

    use super::*;
    use crate::dispatch::{Dispatcher, ShimRegistry};
    use crate::host::MemoryHost;

    fn handle(version: &str) -> CapabilityHandle {
        Dispatcher::new(ShimRegistry::builtin())
            .resolve(Arc::new(MemoryHost::new(version)))
            .unwrap()
    }

    #[test]
    fn test_boot_runs_every_module() {
        let handle = handle("1.21.1");
        let opts = BootOptions::from_config(&Config::default()).unwrap();

        let first = boot(&handle, &opts).unwrap();
        assert_eq!(first.shim, "v1_21_1");
        assert_eq!(first.modules, vec!["greeter", "visit-counter"]);
        assert_eq!((first.visits, first.counted), (1, true));
        assert_eq!(boot(&handle, &opts).unwrap().visits, 2);

        let name = handle.display_name(&HolderId::item(MOTD_HOLDER)).unwrap().unwrap();
        assert_eq!(name.plain_text(), "Welcome back!");
    }

    #[test]
    fn test_boot_rejects_bad_namespace() {
        let opts = BootOptions {
            namespace: "Not Valid".into(),
            motd: "hi".into(),
            visit_cooldown: Duration::ZERO,
            clock: Clock::system(),
        };
        assert!(boot(&handle("1.21.4"), &opts).is_err());
    }

    #[test]
    fn test_boot_honours_cooldown() {
        let handle = handle("1.21.4");
        let mut config = Config::default();
        config.app.visit_cooldown = Some("10m".into());
        let mut opts = BootOptions::from_config(&config).unwrap();
        opts.clock = Clock::fixed(DateTime::from_timestamp(1_700_000_000, 0).unwrap());

        assert!(boot(&handle, &opts).unwrap().counted);
        let again = boot(&handle, &opts).unwrap();
        assert_eq!((again.visits, again.counted), (1, false));

        opts.clock = Clock::fixed(DateTime::from_timestamp(1_700_000_600, 0).unwrap());
        let later = boot(&handle, &opts).unwrap();
        assert_eq!((later.visits, later.counted), (2, true));
    }

    #[test]
    fn test_boot_is_profiled() {
        profiler::reset();
        let opts = BootOptions::from_config(&Config::default()).unwrap();
        boot(&handle("1.21.4"), &opts).unwrap();

        let report = profiler::take();
        let root = report.find(&["boot"]).unwrap();
        let phases: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(phases, vec!["init", "start", "stop"]);
        assert!(report.find(&["boot", "start"]).unwrap().elapsed() <= root.elapsed());
    }

    #[test]
    fn test_options_reject_bad_cooldown() {
        let mut config = Config::default();
        config.app.visit_cooldown = Some("forever".into());
        assert!(BootOptions::from_config(&config).is_err());
    }
}
