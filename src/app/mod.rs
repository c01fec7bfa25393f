//! Application code built on the capability handle.
//!
//! Nothing in here knows which host version it runs on; the same modules
//! behave identically on every supported host.

pub mod counter;
pub mod greeter;
pub mod module;
pub mod services;

pub use counter::{VisitCounterModule, VisitPolicy};
pub use greeter::GreeterModule;
pub use module::{AppError, AppModule, ModuleContext, ModuleManager, Phase};
pub use services::{Clock, Services};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::DateTime;

    use super::*;
    use crate::core::data::DataValue;
    use crate::core::key::NamespacedKey;
    use crate::dispatch::{CapabilityHandle, Dispatcher, ShimRegistry};
    use crate::host::{HolderId, MemoryHost};

    fn handle(version: &str) -> CapabilityHandle {
        Dispatcher::new(ShimRegistry::builtin())
            .resolve(Arc::new(MemoryHost::new(version)))
            .unwrap()
    }

    #[test]
    fn test_greeter_sets_display_name_on_every_host() {
        for version in ["1.21.1", "1.21.4"] {
            let handle = handle(version);
            let item = HolderId::item("motd");
            let mut greeter = GreeterModule::new(item.clone(), "<green>Hello <bold>there");

            greeter.init(&ModuleContext::new(handle.clone(), "demo")).unwrap();
            greeter.start().unwrap();

            let name = handle.display_name(&item).unwrap().unwrap();
            assert_eq!(name.plain_text(), "Hello there");
            assert!(greeter.rendered().unwrap().contains("\"green\""));
        }
    }

    #[test]
    fn test_greeter_needs_init() {
        let mut greeter = GreeterModule::new(HolderId::item("motd"), "hi");
        assert!(matches!(greeter.start(), Err(AppError::NotInitialized(_))));
    }

    #[test]
    fn test_counter_increments_across_restarts() {
        let handle = handle("1.21.1");
        let server = HolderId::entity("server");
        let key = NamespacedKey::parse("demo:visits").unwrap();

        for expected in 1..=3 {
            let mut manager = ModuleManager::new(ModuleContext::new(handle.clone(), "demo"));
            manager.register(VisitCounterModule::new(server.clone(), "visits"));
            manager.init_all().unwrap();
            manager.start_all().unwrap();
            manager.stop_all().unwrap();

            assert_eq!(
                handle.read_data(&server, &key).unwrap(),
                Some(DataValue::Int(expected))
            );
        }
    }

    #[test]
    fn test_counter_rejects_foreign_value() {
        let handle = handle("1.21.4");
        let server = HolderId::entity("server");
        let key = NamespacedKey::parse("demo:visits").unwrap();
        handle
            .write_data(&server, &key, &DataValue::String("lots".into()))
            .unwrap();

        let mut counter = VisitCounterModule::new(server, "visits");
        counter.init(&ModuleContext::new(handle, "demo")).unwrap();
        let err = counter.start().unwrap_err();
        assert_eq!(err.to_string(), "`demo:visits` holds a string, expected int");
        assert_eq!(counter.count(), None);
    }

    #[test]
    fn test_counter_rejects_bad_key_at_init() {
        let mut counter = VisitCounterModule::new(HolderId::entity("server"), "Visits!");
        let err = counter
            .init(&ModuleContext::new(handle("1.21.4"), "demo"))
            .unwrap_err();
        assert!(matches!(err, AppError::Key(_)));
    }

    fn counter_run(handle: &CapabilityHandle, at: i64, cooldown: Duration) -> VisitCounterModule {
        let services = Services::new()
            .provide(Clock::fixed(DateTime::from_timestamp(at, 0).unwrap()))
            .provide(VisitPolicy { cooldown });
        let ctx = ModuleContext::new(handle.clone(), "demo").with_services(services);
        let mut counter = VisitCounterModule::new(HolderId::entity("server"), "visits");
        counter.init(&ctx).unwrap();
        counter.start().unwrap();
        counter
    }

    #[test]
    fn test_counter_cooldown() {
        for version in ["1.21.1", "1.21.4"] {
            let handle = handle(version);
            let hour = Duration::from_secs(3600);
            let last = NamespacedKey::parse("demo:visits.last").unwrap();

            let first = counter_run(&handle, 1_000_000, hour);
            assert_eq!((first.count(), first.counted()), (Some(1), true));
            assert_eq!(
                handle.read_data(&HolderId::entity("server"), &last).unwrap(),
                Some(DataValue::Long(1_000_000))
            );

            let soon = counter_run(&handle, 1_000_000 + 1800, hour);
            assert_eq!((soon.count(), soon.counted()), (Some(1), false));

            // The window runs from the last counted visit
            let later = counter_run(&handle, 1_000_000 + 3600, hour);
            assert_eq!((later.count(), later.counted()), (Some(2), true));

            let no_cooldown = counter_run(&handle, 1_000_000 + 3601, Duration::ZERO);
            assert_eq!(no_cooldown.count(), Some(3));
        }
    }

    #[test]
    fn test_counter_counts_when_clock_went_backwards() {
        let handle = handle("1.21.4");
        let hour = Duration::from_secs(3600);
        counter_run(&handle, 1_000_000, hour);
        let earlier = counter_run(&handle, 999_000, hour);
        assert_eq!((earlier.count(), earlier.counted()), (Some(2), true));
    }
}
