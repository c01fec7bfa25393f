//! Typed services handed to application modules.
//!
//! Modules ask their context for a service by type instead of building it
//! themselves. A service is a shared instance (given up front or built on
//! first request) or built fresh for every request. Factories receive the
//! service set, so one service can be assembled from others; they must not
//! ask for their own type.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use crate::app::module::AppError;

type AnyService = Arc<dyn Any + Send + Sync>;
type Factory = Box<dyn Fn(&Services) -> Result<AnyService, AppError> + Send + Sync>;

enum Provider {
    Shared(AnyService),
    Lazy { cell: OnceLock<AnyService>, build: Factory },
    Fresh(Factory),
}

impl Provider {
    fn kind(&self) -> &'static str {
        match self {
            Provider::Shared(_) => "shared",
            Provider::Lazy { .. } => "lazy",
            Provider::Fresh(_) => "fresh",
        }
    }

    fn get(&self, services: &Services) -> Result<AnyService, AppError> {
        match self {
            Provider::Shared(value) => Ok(value.clone()),
            Provider::Lazy { cell, build } => match cell.get() {
                Some(value) => Ok(value.clone()),
                None => {
                    let built = build(services)?;
                    // A concurrent first request may have won; everyone gets its value.
                    Ok(cell.get_or_init(|| built).clone())
                }
            },
            Provider::Fresh(build) => build(services),
        }
    }
}

struct Registered {
    type_name: &'static str,
    provider: Provider,
}

/// Services available to modules, keyed by type.
#[derive(Default)]
pub struct Services {
    providers: HashMap<TypeId, Registered>,
}

impl Services {
    pub fn new() -> Self {
        Services::default()
    }

    fn insert<T: Any>(mut self, provider: Provider) -> Self {
        let replaced = self.providers.insert(
            TypeId::of::<T>(),
            Registered {
                type_name: type_name::<T>(),
                provider,
            },
        );
        if replaced.is_some() {
            tracing::debug!("service {} replaced", type_name::<T>());
        }
        self
    }

    /// Share `value` with every module.
    pub fn provide<T: Any + Send + Sync>(self, value: T) -> Self {
        self.insert::<T>(Provider::Shared(Arc::new(value)))
    }

    /// Share one instance built by `build` on the first request.
    pub fn provide_lazy<T, F>(self, build: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Services) -> Result<T, AppError> + Send + Sync + 'static,
    {
        self.insert::<T>(Provider::Lazy {
            cell: OnceLock::new(),
            build: boxed(build),
        })
    }

    /// Build a new instance with `build` for every request.
    pub fn provide_fresh<T, F>(self, build: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Services) -> Result<T, AppError> + Send + Sync + 'static,
    {
        self.insert::<T>(Provider::Fresh(boxed(build)))
    }

    /// The service of type `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, AppError> {
        let missing = || AppError::MissingService(type_name::<T>());
        let registered = self.providers.get(&TypeId::of::<T>()).ok_or_else(missing)?;
        registered
            .provider
            .get(self)?
            .downcast::<T>()
            .map_err(|_| missing())
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.providers.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn boxed<T, F>(build: F) -> Factory
where
    T: Any + Send + Sync,
    F: Fn(&Services) -> Result<T, AppError> + Send + Sync + 'static,
{
    Box::new(move |services| build(services).map(|value| Arc::new(value) as AnyService))
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self
            .providers
            .values()
            .map(|r| format!("{} ({})", r.type_name, r.provider.kind()))
            .collect();
        entries.sort();
        f.debug_tuple("Services").field(&entries).finish()
    }
}

/// Source of the current time for modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    fixed: Option<DateTime<Utc>>,
}

impl Clock {
    /// The system clock.
    pub fn system() -> Self {
        Clock { fixed: None }
    }

    /// A clock stopped at `at`.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Clock { fixed: Some(at) }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Greeting(String);

    #[derive(Debug)]
    struct Ticket(usize);

    #[test]
    fn test_shared_service() {
        let services = Services::new().provide(Greeting("hi".into()));
        let a = services.get::<Greeting>().unwrap();
        let b = services.get::<Greeting>().unwrap();
        assert_eq!(*a, Greeting("hi".into()));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(services.contains::<Greeting>());
    }

    #[test]
    fn test_missing_service() {
        let err = Services::new().get::<Greeting>().unwrap_err();
        assert!(matches!(err, AppError::MissingService(name) if name.ends_with("Greeting")));
    }

    #[test]
    fn test_lazy_service_is_built_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let services = Services::new().provide_lazy(move |_| {
            Ok(Ticket(counter.fetch_add(1, Ordering::SeqCst)))
        });
        assert_eq!(built.load(Ordering::SeqCst), 0);

        let a = services.get::<Ticket>().unwrap();
        let b = services.get::<Ticket>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fresh_service_per_request() {
        let next = Arc::new(AtomicUsize::new(0));
        let services = Services::new().provide_fresh(move |_| {
            Ok(Ticket(next.fetch_add(1, Ordering::SeqCst)))
        });
        assert_eq!(services.get::<Ticket>().unwrap().0, 0);
        assert_eq!(services.get::<Ticket>().unwrap().0, 1);
    }

    #[test]
    fn test_factories_resolve_dependencies() {
        let services = Services::new()
            .provide(Greeting("hello".into()))
            .provide_lazy(|s: &Services| Ok(Ticket(s.get::<Greeting>()?.0.len())));
        assert_eq!(services.get::<Ticket>().unwrap().0, 5);

        let broken = Services::new().provide_lazy(|s: &Services| Ok(Ticket(s.get::<Greeting>()?.0.len())));
        assert!(matches!(broken.get::<Ticket>(), Err(AppError::MissingService(_))));
        // A failed build leaves the service unbuilt.
        assert!(broken.get::<Ticket>().is_err());
    }

    #[test]
    fn test_clock() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(Clock::fixed(at).now(), at);
        assert!(Clock::system().now() > at);
    }
}
