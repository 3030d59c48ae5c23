//! Declarative provider lists applied to a container scope.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::container::{construct_erased, AnyArc, Container, Injectable};
use crate::error::DecorResult;
use crate::factory::FactoryConfig;
use crate::pipeline::resolve_factory;
use crate::target::Constructor;
use crate::token::Token;

/// One binding in a provider list.
///
/// # Examples
///
/// ```
/// use ferrous_decor::{
///     bind_providers, Container, DecorResult, FactoryConfig, Injectable, Provider,
/// };
///
/// struct ClassA;
/// impl Injectable for ClassA {
///     fn inject(_container: &Container) -> DecorResult<Self> {
///         Ok(ClassA)
///     }
/// }
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let providers = vec![
///     Provider::class::<ClassA>(),
///     Provider::value("t", "v".to_string()),
///     Provider::factory("u", FactoryConfig::with_deps(
///         || vec!["t".into()],
///         |deps| Ok(format!("{}!", deps.get::<String>(0)?)),
///     )),
/// ];
///
/// let scope = Container::new();
/// bind_providers(&providers, &scope).await.unwrap();
/// assert_eq!(*scope.get::<String>("u").unwrap(), "v!");
/// # });
/// ```
#[derive(Clone)]
pub enum Provider {
    /// A constructible type bound to itself, memoized per scope
    Class {
        /// Token of the type
        token: Token,
        /// Type-erased constructor
        construct: Constructor,
    },
    /// A constant bound to a token
    Value {
        /// Binding token
        token: Token,
        /// Bound value
        value: AnyArc,
    },
    /// A factory resolved once at bind time; its value is bound as a constant
    Factory {
        /// Binding token
        token: Token,
        /// Factory to resolve
        factory: Arc<FactoryConfig>,
    },
}

impl Provider {
    /// Binds `T` to itself.
    pub fn class<T: Injectable>() -> Self {
        Provider::Class {
            token: Token::of::<T>(),
            construct: construct_erased::<T>,
        }
    }

    /// Binds a constant value.
    pub fn value<T: Any + Send + Sync>(token: impl Into<Token>, value: T) -> Self {
        Provider::Value {
            token: token.into(),
            value: Arc::new(value),
        }
    }

    /// Binds the value of a factory.
    pub fn factory(token: impl Into<Token>, factory: impl Into<Arc<FactoryConfig>>) -> Self {
        Provider::Factory {
            token: token.into(),
            factory: factory.into(),
        }
    }

    /// The token this provider binds.
    pub fn token(&self) -> &Token {
        match self {
            Provider::Class { token, .. } => token,
            Provider::Value { token, .. } => token,
            Provider::Factory { token, .. } => token,
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Provider::Class { .. } => "Class",
            Provider::Value { .. } => "Value",
            Provider::Factory { .. } => "Factory",
        };
        f.debug_struct("Provider")
            .field("kind", &kind)
            .field("token", self.token())
            .finish()
    }
}

/// Applies `providers` to `scope` in list order.
///
/// Factory providers are resolved eagerly against `scope` as it stands at
/// that point, so they may depend on tokens bound earlier in the list. The
/// list is not reordered; a failing factory stops the binding.
pub async fn bind_providers(providers: &[Provider], scope: &Container) -> DecorResult<()> {
    for provider in providers {
        match provider {
            Provider::Class { token, construct } => {
                scope.bind_constructor(token.clone(), *construct);
            }
            Provider::Value { token, value } => {
                scope.bind_constant_any(token.clone(), value.clone());
            }
            Provider::Factory { token, factory } => {
                let value = resolve_factory(scope, factory).await?;
                scope.bind_constant_any(token.clone(), value);
            }
        }
    }
    debug!(count = providers.len(), depth = scope.depth(), "bound providers");
    Ok(())
}
