//! Factory configurations: deferred, dependency-declaring computations.
//!
//! A [`FactoryConfig`] is what a decorator callback produces and what the
//! metadata registry stores. It is immutable once built; the registry holds
//! it behind an `Arc` so base and derived classes can share it safely.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::container::AnyArc;
use crate::error::{DecorError, DecorResult};
use crate::token::Token;

/// Neutral value bound to [`RESULT`](crate::RESULT) before any factory has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Absent;

/// Whether a resolved value is the [`Absent`] marker.
pub fn is_absent(value: &AnyArc) -> bool {
    value.is::<Absent>()
}

/// Compute step of a factory configuration.
///
/// Receives the declared dependencies, already resolved, in declaration
/// order. Any closure `Fn(Dependencies) -> impl Future<Output = DecorResult<AnyArc>>`
/// implements this trait.
///
/// # Examples
///
/// ```
/// use ferrous_decor::{AnyArc, DecorResult, Dependencies, Factory, FactoryConfig};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct Greeting;
///
/// #[async_trait]
/// impl Factory for Greeting {
///     async fn compute(&self, deps: Dependencies) -> DecorResult<AnyArc> {
///         let name = deps.get::<String>(0)?;
///         Ok(Arc::new(format!("hello {}", name)))
///     }
/// }
///
/// let config = FactoryConfig::new(|| vec!["name".into()], Greeting);
/// assert_eq!(config.dependencies().len(), 1);
/// ```
#[async_trait]
pub trait Factory: Send + Sync {
    /// Produces the value for this factory.
    async fn compute(&self, deps: Dependencies) -> DecorResult<AnyArc>;
}

#[async_trait]
impl<F, Fut> Factory for F
where
    F: Fn(Dependencies) -> Fut + Send + Sync,
    Fut: Future<Output = DecorResult<AnyArc>> + Send,
{
    async fn compute(&self, deps: Dependencies) -> DecorResult<AnyArc> {
        self(deps).await
    }
}

type DependencyFn = dyn Fn() -> Vec<Token> + Send + Sync;

/// A deferred computation, optionally declaring dependency tokens.
///
/// # Examples
///
/// ```
/// use ferrous_decor::{FactoryConfig, RESULT};
///
/// // No dependencies
/// let first = FactoryConfig::from_fn(|| "a".to_string());
///
/// // Depends on the previous factory's value
/// let second = FactoryConfig::with_deps(
///     || vec![RESULT],
///     |deps| Ok(format!("{}b", deps.get::<String>(0)?)),
/// );
///
/// assert!(first.dependencies().is_empty());
/// assert_eq!(second.dependencies(), vec![RESULT]);
/// ```
pub struct FactoryConfig {
    dependencies: Box<DependencyFn>,
    factory: Box<dyn Factory>,
}

impl FactoryConfig {
    /// Builds a configuration from a dependency thunk and a compute step.
    pub fn new<D, F>(dependencies: D, factory: F) -> Self
    where
        D: Fn() -> Vec<Token> + Send + Sync + 'static,
        F: Factory + 'static,
    {
        Self {
            dependencies: Box::new(dependencies),
            factory: Box::new(factory),
        }
    }

    /// Synchronous factory without dependencies.
    pub fn from_fn<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(Vec::new, move |_deps: Dependencies| {
            let value: AnyArc = Arc::new(f());
            std::future::ready(Ok::<_, DecorError>(value))
        })
    }

    /// Asynchronous factory without dependencies.
    pub fn from_async<T, F, Fut>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::new(Vec::new, move |_deps: Dependencies| {
            let fut = f();
            async move { Ok::<_, DecorError>(Arc::new(fut.await) as AnyArc) }
        })
    }

    /// Synchronous factory over resolved dependencies.
    pub fn with_deps<T, D, F>(dependencies: D, compute: F) -> Self
    where
        T: Any + Send + Sync,
        D: Fn() -> Vec<Token> + Send + Sync + 'static,
        F: Fn(Dependencies) -> DecorResult<T> + Send + Sync + 'static,
    {
        Self::new(dependencies, move |deps: Dependencies| {
            std::future::ready(compute(deps).map(|value| Arc::new(value) as AnyArc))
        })
    }

    /// Asynchronous factory over resolved dependencies.
    pub fn with_deps_async<T, D, F, Fut>(dependencies: D, compute: F) -> Self
    where
        T: Any + Send + Sync,
        D: Fn() -> Vec<Token> + Send + Sync + 'static,
        F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DecorResult<T>> + Send + 'static,
    {
        Self::new(dependencies, move |deps: Dependencies| {
            let fut = compute(deps);
            async move { fut.await.map(|value| Arc::new(value) as AnyArc) }
        })
    }

    /// Evaluates the dependency thunk.
    pub fn dependencies(&self) -> Vec<Token> {
        (self.dependencies)()
    }

    /// Runs the compute step.
    pub async fn compute(&self, deps: Dependencies) -> DecorResult<AnyArc> {
        self.factory.compute(deps).await
    }
}

impl fmt::Debug for FactoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryConfig")
            .field("dependencies", &self.dependencies())
            .finish()
    }
}

/// Resolved dependency values, positionally matching the declared tokens.
pub struct Dependencies {
    tokens: Vec<Token>,
    values: Vec<AnyArc>,
}

impl Dependencies {
    pub(crate) fn new(tokens: Vec<Token>, values: Vec<AnyArc>) -> Self {
        debug_assert_eq!(tokens.len(), values.len());
        Self { tokens, values }
    }

    /// Number of resolved dependencies.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no dependencies were declared.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The declared tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The value at `index`, type-erased.
    pub fn get_any(&self, index: usize) -> DecorResult<AnyArc> {
        self.values
            .get(index)
            .cloned()
            .ok_or(DecorError::MissingDependency(index))
    }

    /// The value at `index`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DecorResult<Arc<T>> {
        self.get_any(index)?
            .downcast::<T>()
            .map_err(|_| DecorError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`get`](Self::get), but an [`Absent`] value reads as `None`.
    pub fn optional<T: Any + Send + Sync>(&self, index: usize) -> DecorResult<Option<Arc<T>>> {
        let value = self.get_any(index)?;
        if is_absent(&value) {
            return Ok(None);
        }
        value
            .downcast::<T>()
            .map(Some)
            .map_err(|_| DecorError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// All values in declaration order.
    pub fn into_values(self) -> Vec<AnyArc> {
        self.values
    }
}
