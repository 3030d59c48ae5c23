//! Decorator makers.
//!
//! A [`Decorator`] bundles an applicability set, the metadata keys its
//! configurations are stored under, and a callback that turns each
//! application into a [`FactoryConfig`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{DecorError, DecorResult};
use crate::factory::FactoryConfig;
use crate::info::{extract, Application, DecoratorInfo, ElementKind, TypeHintSource};
use crate::registry::{MetadataKeys, MetadataRegistry};

type Callback = dyn Fn(&DecoratorInfo) -> FactoryConfig + Send + Sync;

/// A user-defined decorator.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{
///     Application, Class, Decorator, ElementKind, FactoryConfig, MetadataKeys,
///     MetadataRegistry, NoTypeHints, Symbol, Target,
/// };
///
/// struct Controller;
/// impl Class for Controller {}
///
/// let routes = Symbol::new("routes");
/// let keys = MetadataKeys::new().with_sub(routes);
///
/// let route = Decorator::new([ElementKind::Method], keys, |info| {
///     let path = format!("/{}", info.member.as_deref().unwrap_or_default());
///     FactoryConfig::from_fn(move || path.clone())
/// });
///
/// let registry = MetadataRegistry::new();
/// let target = Target::of::<Controller>();
/// route.apply(&registry, &Application::method(target, "index"), &NoTypeHints).unwrap();
///
/// // Properties are outside the applicability set and are skipped.
/// let name = Application::property(target, "name");
/// let skipped = route.apply(&registry, &name, &NoTypeHints).unwrap();
/// assert!(skipped.is_none());
///
/// assert_eq!(registry.read(&target, &keys).sub["index"].len(), 1);
/// ```
#[derive(Clone)]
pub struct Decorator {
    on: Vec<ElementKind>,
    keys: MetadataKeys,
    callback: Arc<Callback>,
}

impl Decorator {
    /// Creates a decorator applicable to the kinds in `on`.
    pub fn new<F>(
        on: impl IntoIterator<Item = ElementKind>,
        keys: MetadataKeys,
        callback: F,
    ) -> Self
    where
        F: Fn(&DecoratorInfo) -> FactoryConfig + Send + Sync + 'static,
    {
        let mut kinds = Vec::new();
        for kind in on {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Self {
            on: kinds,
            keys,
            callback: Arc::new(callback),
        }
    }

    /// The element kinds this decorator handles.
    pub fn kinds(&self) -> &[ElementKind] {
        &self.on
    }

    /// The metadata keys configurations are stored under.
    pub fn keys(&self) -> &MetadataKeys {
        &self.keys
    }

    /// Whether the decorator handles `kind`.
    pub fn supports(&self, kind: ElementKind) -> bool {
        self.on.contains(&kind)
    }

    /// Applies the decorator to one element.
    ///
    /// Applications of an unsupported kind are ignored and return `None`
    /// without invoking the callback. Class applications store under the
    /// root key and mark the target injectable; member applications store
    /// under the sub key, grouped by member name.
    ///
    /// # Errors
    ///
    /// [`DecorError::MissingMetadataKey`] when the key for the kind was not
    /// configured, and [`DecorError::InvalidApplication`] when the record is
    /// malformed.
    pub fn apply(
        &self,
        registry: &MetadataRegistry,
        application: &Application,
        hints: &dyn TypeHintSource,
    ) -> DecorResult<Option<Arc<FactoryConfig>>> {
        let info = match extract(application, &self.on, hints) {
            Ok(info) => info,
            Err(DecorError::UnsupportedElementKind(kind)) => {
                trace!(%kind, class = application.target.name(), "decorator skipped");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let key = match info.kind {
            ElementKind::Class => self.keys.root,
            _ => self.keys.sub,
        }
        .ok_or(DecorError::MissingMetadataKey(info.kind))?;

        let config = (self.callback)(&info);
        let stored = match info.member.as_deref() {
            None => {
                let stored = registry.append_root(&info.target, key, config);
                registry.mark_injectable(&info.target);
                stored
            }
            Some(member) => registry.append_sub(&info.target, member, key, config),
        };

        debug!(kind = %info.kind, class = info.target.name(), "decorator applied");
        Ok(Some(stored))
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("on", &self.on)
            .field("keys", &self.keys)
            .finish()
    }
}
