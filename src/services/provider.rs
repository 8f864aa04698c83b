use super::{short_type_name, ResolutionScope, ServiceResolver, ServiceScope, SharedService};
use crate::error::ActivationError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub(crate) type ScopedFactory =
    Arc<dyn Fn(&ServiceScope) -> Result<SharedService, ActivationError> + Send + Sync>;

/// Registrations collected before the container is built.
#[derive(Default)]
pub struct ServiceCollection {
    singletons: HashMap<TypeId, SharedService>,
    scoped: HashMap<TypeId, ScopedFactory>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value shared by every scope for the life of the process.
    pub fn add_singleton<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.singletons.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// Register a factory run at most once per request scope.
    pub fn add_scoped<T, F>(mut self, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceScope) -> Result<T, ActivationError> + Send + Sync + 'static,
    {
        let factory: ScopedFactory =
            Arc::new(move |scope: &ServiceScope| factory(scope).map(|value| Arc::new(value) as SharedService));
        self.scoped.insert(TypeId::of::<T>(), factory);
        self
    }

    pub fn build(self) -> Arc<ServiceProvider> {
        debug!(
            "Built service provider with {} singletons and {} scoped services",
            self.singletons.len(),
            self.scoped.len()
        );

        Arc::new(ServiceProvider {
            singletons: self.singletons,
            scoped: self.scoped,
        })
    }
}

/// The process-wide container.
pub struct ServiceProvider {
    singletons: HashMap<TypeId, SharedService>,
    scoped: HashMap<TypeId, ScopedFactory>,
}

impl ServiceProvider {
    pub fn create_scope(self: &Arc<Self>) -> ServiceScope {
        ServiceScope::new(self.clone())
    }

    pub fn contains<T: Any>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.singletons.contains_key(&id) || self.scoped.contains_key(&id)
    }

    pub(crate) fn scoped_factory(&self, id: TypeId) -> Option<ScopedFactory> {
        self.scoped.get(&id).cloned()
    }

    pub(crate) fn singleton(&self, id: TypeId) -> Option<SharedService> {
        self.singletons.get(&id).cloned()
    }
}

impl ServiceResolver for ServiceProvider {
    fn scope(&self) -> ResolutionScope {
        ResolutionScope::Process
    }

    fn resolve_raw(&self, id: TypeId) -> Option<SharedService> {
        self.singleton(id)
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(short_type_name::<Self>())
            .field("singletons", &self.singletons.len())
            .field("scoped", &self.scoped.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ResolverExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Greeting(&'static str);

    struct Ticket(usize);

    #[test]
    fn provider_resolves_singletons() {
        let provider = ServiceCollection::new().add_singleton(Greeting("hello")).build();

        let greeting = provider.resolve::<Greeting>().unwrap();
        assert_eq!(*greeting, Greeting("hello"));
        assert_eq!(provider.scope(), ResolutionScope::Process);
    }

    #[test]
    fn provider_does_not_build_scoped_services() {
        let provider = ServiceCollection::new()
            .add_scoped(|_| Ok(Ticket(1)))
            .build();

        assert!(provider.contains::<Ticket>());
        assert!(provider.resolve::<Ticket>().is_none());
    }

    #[test]
    fn require_reports_missing_service_and_scope() {
        let provider = ServiceCollection::new().build();

        let err = provider.require::<Greeting>().err().unwrap();
        assert_eq!(
            err,
            ActivationError::MissingService {
                service: "Greeting",
                scope: ResolutionScope::Process,
            }
        );
    }

    #[test]
    fn scoped_factory_runs_once_per_scope() {
        let counter = Arc::new(AtomicUsize::new(0));
        let issued = counter.clone();
        let provider = ServiceCollection::new()
            .add_scoped(move |_| Ok(Ticket(issued.fetch_add(1, Ordering::SeqCst))))
            .build();

        let first = provider.create_scope();
        let a = first.resolve::<Ticket>().unwrap();
        let b = first.resolve::<Ticket>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let second = provider.create_scope();
        let c = second.resolve::<Ticket>().unwrap();
        assert_eq!(a.0, 0);
        assert_eq!(c.0, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
