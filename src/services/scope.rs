use super::{short_type_name, ResolutionScope, ServiceProvider, ServiceResolver, SharedService};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Per-request container. Values inserted into the scope win over scoped
/// factories, which win over the root singletons.
pub struct ServiceScope {
    root: Arc<ServiceProvider>,
    instances: Mutex<HashMap<TypeId, SharedService>>,
    disposed: AtomicBool,
}

impl ServiceScope {
    pub(crate) fn new(root: Arc<ServiceProvider>) -> Self {
        Self {
            root,
            instances: Mutex::new(HashMap::new()),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Arc<ServiceProvider> {
        &self.root
    }

    /// Make a request-local value available to everything resolved from
    /// this scope.
    pub fn insert<T: Any + Send + Sync>(&self, value: T) {
        self.lock_instances().insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Drop every instance owned by the scope. Later lookups resolve nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let released = {
            let mut instances = self.lock_instances();
            std::mem::take(&mut *instances)
        };
        debug!("Disposed request scope ({} instances)", released.len());
    }

    fn lock_instances(&self) -> MutexGuard<'_, HashMap<TypeId, SharedService>> {
        self.instances.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ServiceResolver for ServiceScope {
    fn scope(&self) -> ResolutionScope {
        ResolutionScope::Request
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn resolve_raw(&self, id: TypeId) -> Option<SharedService> {
        if self.is_disposed() {
            return None;
        }

        if let Some(existing) = self.lock_instances().get(&id) {
            return Some(existing.clone());
        }

        if let Some(factory) = self.root.scoped_factory(id) {
            // The lock is released here: factories resolve their own dependencies.
            return match factory(self) {
                Ok(instance) => {
                    let mut instances = self.lock_instances();
                    Some(instances.entry(id).or_insert(instance).clone())
                }
                Err(e) => {
                    debug!("Scoped factory failed: {}", e);
                    None
                }
            };
        }

        self.root.singleton(id)
    }
}

impl std::fmt::Debug for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(short_type_name::<Self>())
            .field("instances", &self.lock_instances().len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActivationError;
    use crate::services::{ResolverExt, ServiceCollection};

    struct Config(u16);
    struct RequestId(&'static str);

    struct Session {
        owner: Arc<RequestId>,
    }

    #[test]
    fn scope_falls_through_to_root_singletons() {
        let provider = ServiceCollection::new().add_singleton(Config(8900)).build();
        let scope = provider.create_scope();

        assert_eq!(scope.resolve::<Config>().unwrap().0, 8900);
        assert_eq!(scope.scope(), ResolutionScope::Request);
    }

    #[test]
    fn inserted_values_are_scope_local() {
        let provider = ServiceCollection::new().build();
        let scope = provider.create_scope();
        scope.insert(RequestId("abc"));

        assert_eq!(scope.resolve::<RequestId>().unwrap().0, "abc");
        assert!(provider.resolve::<RequestId>().is_none());
        assert!(provider.create_scope().resolve::<RequestId>().is_none());
    }

    #[test]
    fn scoped_factories_can_depend_on_scope_values() {
        let provider = ServiceCollection::new()
            .add_scoped(|scope| {
                Ok(Session {
                    owner: scope.require::<RequestId>()?,
                })
            })
            .build();

        let scope = provider.create_scope();
        assert!(scope.resolve::<Session>().is_none());

        scope.insert(RequestId("r-1"));
        let session = scope.resolve::<Session>().unwrap();
        assert_eq!(session.owner.0, "r-1");
    }

    #[test]
    fn failing_factory_resolves_nothing() {
        let provider = ServiceCollection::new()
            .add_scoped::<Session, _>(|_| {
                Err(ActivationError::Constructor {
                    type_name: "Session",
                    reason: "boom".into(),
                })
            })
            .build();

        assert!(provider.create_scope().resolve::<Session>().is_none());
    }

    #[test]
    fn disposed_scope_resolves_nothing() {
        let provider = ServiceCollection::new().add_singleton(Config(1)).build();
        let scope = provider.create_scope();
        scope.insert(RequestId("gone"));

        scope.dispose();
        scope.dispose();

        assert!(scope.is_disposed());
        assert!(scope.resolve::<RequestId>().is_none());
        assert!(scope.resolve::<Config>().is_none());
        assert!(provider.resolve::<Config>().is_some());
    }

    #[test]
    fn require_on_disposed_scope_reports_disposal() {
        let provider = ServiceCollection::new().add_singleton(Config(1)).build();
        let scope = provider.create_scope();
        assert!(scope.require::<Config>().is_ok());

        scope.dispose();

        assert_eq!(
            scope.require::<Config>().err().unwrap(),
            ActivationError::ScopeDisposed {
                scope: ResolutionScope::Request,
            }
        );
        assert!(matches!(
            provider.require::<RequestId>(),
            Err(ActivationError::MissingService { .. })
        ));
    }
}
