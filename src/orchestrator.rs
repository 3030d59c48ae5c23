//! Resolves every decorator on a class into a structured result.
//!
//! Member groups run first, in the order members were first decorated. Their
//! aggregated output is bound into the class scope before the class-level
//! list runs, so root factories can build on what members produced.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::container::{AnyArc, Container};
use crate::error::{DecorError, DecorResult};
use crate::options::ResolveOptions;
use crate::pipeline::{resolve_factories, Data, SubData, SubResult};
use crate::registry::{MetadataKeys, MetadataRegistry};
use crate::target::Target;
use crate::token::{SUB_DATA, SUB_RESULT, TARGET, TARGET_INSTANCE};

/// Values produced for a class.
#[derive(Clone, Default)]
pub struct DecoratorData {
    /// Class-level values in declaration order
    pub root: Data,
    /// Member-level values keyed by member name
    pub sub: SubData,
}

/// Outcome of [`resolve_decorators`].
#[derive(Clone, Default)]
pub struct Resolution {
    /// Last class-level value, `None` without class-level decorators
    pub result: Option<AnyArc>,
    /// Every produced value
    pub data: DecoratorData,
}

impl Resolution {
    /// The last class-level value downcast to `T`.
    pub fn result_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.result.clone()?.downcast::<T>().ok()
    }

    /// Class-level values downcast to `T`; `None` if any has another type.
    pub fn root_as<T: Any + Send + Sync>(&self) -> Option<Vec<Arc<T>>> {
        downcast_all(&self.data.root)
    }

    /// Values of one member downcast to `T`.
    pub fn sub_as<T: Any + Send + Sync>(&self, member: &str) -> Option<Vec<Arc<T>>> {
        downcast_all(self.data.sub.get(member)?)
    }
}

fn downcast_all<T: Any + Send + Sync>(values: &[AnyArc]) -> Option<Vec<Arc<T>>> {
    values
        .iter()
        .map(|value| value.clone().downcast::<T>().ok())
        .collect()
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sub: Vec<(&String, usize)> = self
            .data
            .sub
            .iter()
            .map(|(member, values)| (member, values.len()))
            .collect();
        f.debug_struct("Resolution")
            .field("result", &self.result.is_some())
            .field("root", &self.data.root.len())
            .field("sub", &sub)
            .finish()
    }
}

/// Resolves the metadata stored on `target` under `keys`.
///
/// The class scope is a child of `parent` (or a fresh root) with
/// [`TARGET`] bound to the target. With
/// [`make_instance`](ResolveOptions::make_instance), the target is
/// constructed in that scope and bound to [`TARGET_INSTANCE`]; this requires
/// the target to have been marked injectable. Each member group is then
/// resolved, [`SUB_DATA`] and [`SUB_RESULT`] are bound, and the root list
/// runs last. Any failure aborts the whole call.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{
///     resolve_decorators, Class, FactoryConfig, MetadataKeys, MetadataRegistry,
///     ResolveOptions, SubData, Symbol, Target, SUB_DATA,
/// };
///
/// struct Form;
/// impl Class for Form {}
///
/// let keys = MetadataKeys::new().with_root(Symbol::new("form")).with_sub(Symbol::new("fields"));
/// let registry = MetadataRegistry::new();
/// let form = Target::of::<Form>();
///
/// registry.append_sub(&form, "email", keys.sub.unwrap(), FactoryConfig::from_fn(|| "required"));
/// registry.append_root(&form, keys.root.unwrap(), FactoryConfig::with_deps(
///     || vec![SUB_DATA],
///     |deps| Ok(deps.get::<SubData>(0)?.len()),
/// ));
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let resolution = resolve_decorators(&registry, &form, &keys, None, ResolveOptions::new())
///     .await
///     .unwrap();
/// assert_eq!(*resolution.result_as::<usize>().unwrap(), 1);
/// assert_eq!(*resolution.sub_as::<&'static str>("email").unwrap()[0], "required");
/// # });
/// ```
#[instrument(level = "debug", skip_all, fields(class = target.name()))]
pub async fn resolve_decorators(
    registry: &MetadataRegistry,
    target: &Target,
    keys: &MetadataKeys,
    parent: Option<&Container>,
    options: ResolveOptions,
) -> DecorResult<Resolution> {
    let metadata = registry.read(target, keys);

    let scope = match parent {
        Some(parent) => parent.create_child(),
        None => Container::new(),
    };
    scope.bind_constant(TARGET, *target);

    if options.make_instance {
        let ctor = registry
            .constructor(target)
            .ok_or(DecorError::NotInjectable(target.name()))?;
        let instance = scope.construct_with(ctor)?;
        scope.bind_constant_any(TARGET_INSTANCE, instance);
        debug!("constructed target instance");
    }

    let mut sub_data = SubData::new();
    let mut sub_result = SubResult::new();
    for (member, configs) in &metadata.sub {
        let resolved = resolve_factories(configs, Some(&scope)).await?;
        if !resolved.data.is_empty() {
            sub_data.insert(member.clone(), resolved.data);
        }
        if let Some(result) = resolved.result {
            sub_result.insert(member.clone(), result);
        }
    }
    debug!(members = sub_data.len(), "resolved member groups");

    scope.bind_constant(SUB_DATA, sub_data.clone());
    scope.bind_constant(SUB_RESULT, sub_result);

    let root = resolve_factories(&metadata.root, Some(&scope)).await?;
    debug!(root = root.data.len(), "resolved class factories");

    Ok(Resolution {
        result: root.result,
        data: DecoratorData {
            root: root.data,
            sub: sub_data,
        },
    })
}
