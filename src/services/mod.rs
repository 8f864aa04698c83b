mod provider;
mod scope;

pub use provider::{ServiceCollection, ServiceProvider};
pub use scope::ServiceScope;

use crate::error::ActivationError;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

pub type SharedService = Arc<dyn Any + Send + Sync>;

/// Lifetime of the container a service was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionScope {
    Request,
    Process,
}

impl fmt::Display for ResolutionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionScope::Request => write!(f, "request"),
            ResolutionScope::Process => write!(f, "process"),
        }
    }
}

/// Object-safe lookup into a service container.
pub trait ServiceResolver: Send + Sync {
    fn scope(&self) -> ResolutionScope;

    fn resolve_raw(&self, id: TypeId) -> Option<SharedService>;

    /// A disposed resolver resolves nothing.
    fn is_disposed(&self) -> bool {
        false
    }
}

/// Typed access on top of [`ServiceResolver`].
pub trait ResolverExt {
    fn resolve<T: Any + Send + Sync>(&self) -> Option<Arc<T>>;

    fn require<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ActivationError>;
}

impl<R: ServiceResolver + ?Sized> ResolverExt for R {
    fn resolve<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.resolve_raw(TypeId::of::<T>())
            .and_then(|service| service.downcast::<T>().ok())
    }

    fn require<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ActivationError> {
        if self.is_disposed() {
            return Err(ActivationError::ScopeDisposed { scope: self.scope() });
        }
        self.resolve::<T>().ok_or(ActivationError::MissingService {
            service: short_type_name::<T>(),
            scope: self.scope(),
        })
    }
}

/// Constructor injection: build `Self` from whatever a resolver can supply.
pub trait Activate: Sized {
    fn activate(services: &dyn ServiceResolver) -> Result<Self, ActivationError>;
}

/// `core::any::type_name` without the module path.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    #[test]
    fn short_type_name_strips_module_path() {
        assert_eq!(short_type_name::<Widget>(), "Widget");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn short_type_name_keeps_generic_arguments() {
        assert_eq!(short_type_name::<Option<Widget>>(), "Option<realtime_fusion::services::tests::Widget>");
    }
}
