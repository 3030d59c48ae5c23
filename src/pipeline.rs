//! Sequential factory resolution.
//!
//! Factories in a list run strictly one after another. Each runs in a fresh
//! child scope where [`PREVIOUS_DATA`] holds every value produced so far and
//! [`RESULT`] holds the last one ([`Absent`] before the first), so entry *i*
//! observes entries `0..i` and nothing after it.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::container::{AnyArc, Container};
use crate::error::DecorResult;
use crate::factory::{Absent, Dependencies, FactoryConfig};
use crate::token::{PREVIOUS_DATA, RESULT};

/// Values produced by a factory list, in order.
pub type Data = Vec<AnyArc>;

/// Per-member value lists, keyed by member name in declaration order.
pub type SubData = IndexMap<String, Data>;

/// Last value per member, keyed by member name in declaration order.
pub type SubResult = IndexMap<String, AnyArc>;

/// Outcome of resolving a factory list.
#[derive(Clone, Default)]
pub struct Resolved {
    /// Last produced value, `None` for an empty list
    pub result: Option<AnyArc>,
    /// Every produced value in order
    pub data: Data,
}

impl Resolved {
    /// The last value downcast to `T`.
    pub fn result_as<T: std::any::Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.result.clone()?.downcast::<T>().ok()
    }

    /// All values downcast to `T`; `None` if any has another type.
    pub fn data_as<T: std::any::Any + Send + Sync>(&self) -> Option<Vec<Arc<T>>> {
        self.data
            .iter()
            .map(|value| value.clone().downcast::<T>().ok())
            .collect()
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("result", &self.result.is_some())
            .field("data", &self.data.len())
            .finish()
    }
}

/// Resolves one factory configuration against `scope`.
///
/// Each declared token is resolved through the scope's parent chain, then the
/// compute step receives the values positionally.
///
/// # Examples
///
/// ```
/// use ferrous_decor::{resolve_factory, Container, FactoryConfig};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let scope = Container::new();
/// scope.bind_constant("prefix", "me".to_string());
/// scope.bind_constant("message", "hello world".to_string());
///
/// let config = FactoryConfig::with_deps(
///     || vec!["prefix".into(), "message".into()],
///     |deps| Ok(format!("{}: {}", deps.get::<String>(0)?, deps.get::<String>(1)?)),
/// );
///
/// let value = resolve_factory(&scope, &config).await.unwrap();
/// assert_eq!(*value.downcast::<String>().unwrap(), "me: hello world");
/// # });
/// ```
pub async fn resolve_factory(scope: &Container, config: &FactoryConfig) -> DecorResult<AnyArc> {
    let tokens = config.dependencies();
    let values = tokens
        .iter()
        .map(|token| scope.resolve(token))
        .collect::<DecorResult<Vec<_>>>()?;
    trace!(dependencies = tokens.len(), "resolved factory dependencies");
    config.compute(Dependencies::new(tokens, values)).await
}

/// Resolves a factory list in order, threading results forward.
///
/// Without a scope, a fresh root scope is used. The first failing factory
/// aborts the rest of the list.
///
/// # Examples
///
/// ```
/// use ferrous_decor::{resolve_factories, FactoryConfig, RESULT};
/// use std::sync::Arc;
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let factories = vec![
///     Arc::new(FactoryConfig::from_fn(|| "a".to_string())),
///     Arc::new(FactoryConfig::with_deps(
///         || vec![RESULT],
///         |deps| Ok(format!("{}b", deps.get::<String>(0)?)),
///     )),
/// ];
///
/// let resolved = resolve_factories(&factories, None).await.unwrap();
/// assert_eq!(*resolved.result_as::<String>().unwrap(), "ab");
/// assert_eq!(resolved.data.len(), 2);
/// # });
/// ```
pub async fn resolve_factories(
    configs: &[Arc<FactoryConfig>],
    scope: Option<&Container>,
) -> DecorResult<Resolved> {
    let owned;
    let scope = match scope {
        Some(scope) => scope,
        None => {
            owned = Container::new();
            &owned
        }
    };

    let mut data: Data = Vec::with_capacity(configs.len());
    let mut result: Option<AnyArc> = None;

    for (index, config) in configs.iter().enumerate() {
        let step = scope.create_child();
        step.bind_constant(PREVIOUS_DATA, data.clone());
        step.bind_constant_any(
            RESULT,
            result.clone().unwrap_or_else(|| Arc::new(Absent) as AnyArc),
        );

        trace!(index, "resolving factory");
        let value = resolve_factory(&step, config).await?;

        data.push(value.clone());
        result = Some(value);
    }

    debug!(count = data.len(), "resolved factory list");
    Ok(Resolved { result, data })
}
