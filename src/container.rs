//! Hierarchical dependency-injection scopes.
//!
//! A [`Container`] holds constant and self-bound bindings and falls back to
//! its parent chain when a token is not bound locally. Every factory in a
//! resolution pipeline runs inside its own child scope, so bindings made for
//! one step never leak into its siblings.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::error::{DecorError, DecorResult};
use crate::providers::{bind_providers, Provider};
use crate::target::{Constructor, Target};
use crate::token::{Token, CONTAINER};

/// Type-erased Arc for stored values
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// A type that a container can construct, resolving its own dependencies.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{Container, DecorResult, Injectable};
/// use std::sync::Arc;
///
/// struct Config {
///     url: Arc<String>,
/// }
///
/// impl Injectable for Config {
///     fn inject(container: &Container) -> DecorResult<Self> {
///         Ok(Config { url: container.get::<String>("url")? })
///     }
/// }
///
/// let scope = Container::new();
/// scope.bind_constant("url", "postgres://localhost".to_string());
/// scope.bind_self::<Config>();
///
/// let config = scope.get_self::<Config>().unwrap();
/// assert_eq!(config.url.as_str(), "postgres://localhost");
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Builds an instance from the given scope.
    fn inject(container: &Container) -> DecorResult<Self>;
}

#[derive(Clone)]
enum Binding {
    Constant(AnyArc),
    SelfBound(Constructor),
}

pub(crate) fn construct_erased<T: Injectable>(container: &Container) -> DecorResult<AnyArc> {
    Ok(Arc::new(T::inject(container)?))
}

/// Dependency-injection scope with parent fallback.
///
/// Cloning is cheap and yields a handle to the same scope.
///
/// # Lifetime Behavior
///
/// - **Constant**: the bound value is returned as-is
/// - **Self-bound**: constructed on first resolution and memoized in the
///   scope that owns the binding
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::Container;
///
/// let root = Container::new();
/// root.bind_constant("greeting", "hello".to_string());
///
/// let child = root.create_child();
/// child.bind_constant("name", "world".to_string());
///
/// assert_eq!(*child.get::<String>("greeting").unwrap(), "hello");
/// assert!(root.get::<String>("name").is_err());
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    parent: Option<Container>,
    bindings: RwLock<HashMap<Token, Binding>>,
    instances: Mutex<HashMap<Token, AnyArc>>,
    depth: usize,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates a root scope with no bindings.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Container>) -> Self {
        let depth = parent.as_ref().map_or(0, |p| p.depth() + 1);
        Self {
            inner: Arc::new(ContainerInner {
                parent,
                bindings: RwLock::new(HashMap::new()),
                instances: Mutex::new(HashMap::new()),
                depth,
            }),
        }
    }

    /// Creates a child scope that falls back to this one.
    pub fn create_child(&self) -> Self {
        trace!(depth = self.depth() + 1, "creating child scope");
        Self::with_parent(Some(self.clone()))
    }

    /// Creates a scope under `parent` (or a fresh root) and applies `providers` in order.
    pub async fn create_scope(
        providers: &[Provider],
        parent: Option<&Container>,
    ) -> DecorResult<Self> {
        let scope = match parent {
            Some(parent) => parent.create_child(),
            None => Container::new(),
        };
        bind_providers(providers, &scope).await?;
        Ok(scope)
    }

    /// The parent scope, if any.
    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    /// Number of ancestors above this scope.
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// Whether two handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Binds a constant value to `token`, replacing any local binding.
    pub fn bind_constant<T>(&self, token: impl Into<Token>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.bind_constant_any(token, Arc::new(value));
    }

    /// Binds an already type-erased value to `token`.
    pub fn bind_constant_any(&self, token: impl Into<Token>, value: AnyArc) {
        self.bind(token.into(), Binding::Constant(value));
    }

    /// Binds `T` to itself; resolutions in this scope share one instance.
    pub fn bind_self<T: Injectable>(&self) {
        self.bind(Token::of::<T>(), Binding::SelfBound(construct_erased::<T>));
    }

    /// Binds an injectable target class to itself.
    pub fn bind_target(&self, target: &Target) -> DecorResult<()> {
        let ctor = target
            .constructor()
            .ok_or(DecorError::NotInjectable(target.name()))?;
        self.bind(target.token(), Binding::SelfBound(ctor));
        Ok(())
    }

    /// Binds `token` to a type-erased constructor, memoized in this scope.
    pub fn bind_constructor(&self, token: impl Into<Token>, ctor: Constructor) {
        self.bind(token.into(), Binding::SelfBound(ctor));
    }

    fn bind(&self, token: Token, binding: Binding) {
        trace!(%token, depth = self.depth(), "binding");
        self.inner.instances.lock().remove(&token);
        self.inner.bindings.write().insert(token, binding);
    }

    /// Whether this scope itself has a binding for `token`.
    pub fn is_bound_locally(&self, token: &Token) -> bool {
        self.inner.bindings.read().contains_key(token)
    }

    /// Whether any scope in the chain has a binding for `token`.
    pub fn is_bound(&self, token: &Token) -> bool {
        *token == CONTAINER || self.chain().any(|scope| scope.is_bound_locally(token))
    }

    fn chain(&self) -> impl Iterator<Item = &Container> {
        std::iter::successors(Some(self), |scope| scope.parent())
    }

    /// Resolves `token` here or in the nearest ancestor that binds it.
    ///
    /// Resolving [`CONTAINER`] yields this scope.
    pub fn resolve(&self, token: &Token) -> DecorResult<AnyArc> {
        if *token == CONTAINER {
            return Ok(Arc::new(self.clone()));
        }
        for scope in self.chain() {
            if let Some(value) = scope.resolve_local(token)? {
                return Ok(value);
            }
        }
        Err(DecorError::UnresolvedToken(token.clone()))
    }

    fn resolve_local(&self, token: &Token) -> DecorResult<Option<AnyArc>> {
        // Clone the binding out so constructors may resolve through this scope.
        let binding = match self.inner.bindings.read().get(token) {
            Some(binding) => binding.clone(),
            None => return Ok(None),
        };
        match binding {
            Binding::Constant(value) => Ok(Some(value)),
            Binding::SelfBound(ctor) => {
                if let Some(cached) = self.inner.instances.lock().get(token) {
                    return Ok(Some(cached.clone()));
                }
                let value = ctor(self)?;
                let mut instances = self.inner.instances.lock();
                let stored = instances.entry(token.clone()).or_insert(value).clone();
                Ok(Some(stored))
            }
        }
    }

    /// Resolves `token` and downcasts it to `T`.
    pub fn get<T>(&self, token: impl Into<Token>) -> DecorResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.resolve(&token.into())?
            .downcast::<T>()
            .map_err(|_| DecorError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a self-bound type.
    pub fn get_self<T: Injectable>(&self) -> DecorResult<Arc<T>> {
        self.get::<T>(Token::of::<T>())
    }

    /// Constructs a fresh, unbound instance of `T` against this scope.
    pub fn construct<T: Injectable>(&self) -> DecorResult<Arc<T>> {
        Ok(Arc::new(T::inject(self)?))
    }

    /// Constructs a fresh instance of an injectable target against this scope.
    pub fn construct_target(&self, target: &Target) -> DecorResult<AnyArc> {
        let ctor = target
            .constructor()
            .ok_or(DecorError::NotInjectable(target.name()))?;
        self.construct_with(ctor)
    }

    pub(crate) fn construct_with(&self, ctor: Constructor) -> DecorResult<AnyArc> {
        ctor(self)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("depth", &self.depth())
            .field("bindings", &self.inner.bindings.read().len())
            .finish()
    }
}
